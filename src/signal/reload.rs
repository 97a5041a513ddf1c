use crate::internal_prelude::*;
use std::sync::LazyLock;
use tokio::sync::broadcast;

static RELOAD_CHANNEL: LazyLock<broadcast::Sender<ReloadType>> =
    LazyLock::new(|| broadcast::channel::<ReloadType>(1).0);

#[derive(Debug, Clone, PartialEq)]
pub enum ReloadType {
    Full,
    /// site paths of the stylesheets that changed
    Style(Vec<String>),
}

pub struct ReloadSignal {}

impl ReloadSignal {
    pub fn send_full() {
        if let Err(e) = RELOAD_CHANNEL.send(ReloadType::Full) {
            debug!(r#"Reload "Full" not sent, no browser connected: {e}"#);
        }
    }

    pub fn send_style(sheets: Vec<String>) {
        if let Err(e) = RELOAD_CHANNEL.send(ReloadType::Style(sheets)) {
            debug!(r#"Reload "Style" not sent, no browser connected: {e}"#);
        }
    }

    pub fn subscribe() -> broadcast::Receiver<ReloadType> {
        RELOAD_CHANNEL.subscribe()
    }
}
