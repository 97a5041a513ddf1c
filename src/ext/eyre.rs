use std::{fmt::Display, panic::Location};

pub(crate) mod reexports {
    //! re-exports

    pub use super::{AnyhowCompatWrapErr as _, CustomWrapErr as _};
    pub use eyre::{bail, ensure, eyre, Report as Error, Result};
}
use reexports::*;

/// Like `eyre::WrapErr` but every message carries the location of the caller.
pub trait CustomWrapErr<T, E> {
    fn wrap_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    fn wrap_err_with<C, F>(self, context: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;

    /// like google map red dot, only record the location info without any context message.
    fn dot(self) -> Result<T>;
}

/// swc reports its failures as `anyhow::Error`, which is not a `std::error::Error`.
pub trait AnyhowCompatWrapErr<T> {
    fn wrap_anyhow_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// like google map red dot, only record the location info without any context message.
    fn dot_anyhow(self) -> Result<T>;
}

/// https://github.com/dtolnay/anyhow/issues/356#issuecomment-2053956844
struct AnyhowNewType(anyhow::Error);

impl std::fmt::Debug for AnyhowNewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", &self.0)
    }
}
impl std::fmt::Display for AnyhowNewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        anyhow::Error::fmt(&self.0, f)
    }
}
impl core::error::Error for AnyhowNewType {}

fn located(context: Option<&dyn Display>, caller: &Location<'_>) -> String {
    let at = format!("`{}:{}:{}`", caller.file(), caller.line(), caller.column());
    match context {
        Some(context) => format!("{context} at {at}"),
        None => format!("at {at}"),
    }
}

impl<T> AnyhowCompatWrapErr<T> for anyhow::Result<T> {
    #[inline]
    #[track_caller]
    fn wrap_anyhow_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        let msg = located(Some(&context), Location::caller());
        eyre::WrapErr::wrap_err(self.map_err(AnyhowNewType), msg)
    }

    #[inline]
    #[track_caller]
    fn dot_anyhow(self) -> Result<T> {
        let msg = located(None, Location::caller());
        eyre::WrapErr::wrap_err(self.map_err(AnyhowNewType), msg)
    }
}

impl<T, E> CustomWrapErr<T, E> for Result<T, E>
where
    E: Display,
    Result<T, E>: eyre::WrapErr<T, E>,
{
    #[inline]
    #[track_caller]
    fn wrap_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        let msg = located(Some(&context), Location::caller());
        eyre::WrapErr::wrap_err(self, msg)
    }

    #[inline]
    #[track_caller]
    fn wrap_err_with<C, F>(self, context: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        let caller = Location::caller();
        eyre::WrapErr::wrap_err_with(self, || located(Some(&context()), caller))
    }

    #[inline]
    #[track_caller]
    fn dot(self) -> Result<T> {
        let msg = located(None, Location::caller());
        eyre::WrapErr::wrap_err(self, msg)
    }
}
