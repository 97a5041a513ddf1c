pub mod eyre;
pub mod fs;
pub mod path;
pub mod sync;
pub mod util;

pub use path::{PathBufExt, PathExt};
pub use util::StrAdditions;

use clap::builder::styling::{Color, Style};
use std::fmt::Display;

pub trait Paint {
    fn paint(&self, text: impl Display) -> String;
}

impl Paint for Color {
    fn paint(&self, text: impl Display) -> String {
        let style = Style::new().fg_color(Some(*self));
        format!("{style}{text}{style:#}")
    }
}
