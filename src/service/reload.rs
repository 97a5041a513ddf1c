use crate::internal_prelude::*;
use crate::signal::{Interrupt, ReloadSignal, ReloadType};
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::SinkExt;
use serde::Serialize;
use std::fmt::Display;
use tokio::select;

pub const RELOAD_PATH: &str = "/live_reload";

/// Injected into every html page served by the dev server.
const RELOAD_SCRIPT: &str = r#"<script>
(function () {
  var proto = location.protocol === "https:" ? "wss://" : "ws://";
  var ws = new WebSocket(proto + location.host + "/live_reload");
  ws.onmessage = function (ev) {
    var msg = JSON.parse(ev.data);
    if (msg.all) {
      location.reload();
      return;
    }
    document.querySelectorAll('link[rel="stylesheet"]').forEach(function (link) {
      if (msg.css && link.href.indexOf(msg.css) !== -1) {
        var url = new URL(link.href);
        url.searchParams.set("reload", Date.now());
        link.href = url.toString();
      }
    });
  };
})();
</script>
"#;

/// Puts the reload script before the last `</body>`, or at the end when there is none.
pub fn inject_reload(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    match lower.rfind("</body>") {
        Some(at) => format!("{}{RELOAD_SCRIPT}{}", &html[..at], &html[at..]),
        None => format!("{html}{RELOAD_SCRIPT}"),
    }
}

pub async fn websocket_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(websocket)
}

async fn websocket(mut stream: WebSocket) {
    let mut rx = ReloadSignal::subscribe();
    let mut int = Interrupt::subscribe_shutdown();

    trace!("Reload websocket connected");
    loop {
        select! {
            res = rx.recv() => {
                match res {
                    Ok(ReloadType::Full) => {
                        send_and_close(stream, BrowserMessage::all()).await;
                        return
                    }
                    Ok(ReloadType::Style(sheets)) => {
                        for sheet in sheets {
                            send(&mut stream, BrowserMessage::css(sheet)).await;
                        }
                    },
                    Err(e) => debug!("Reload receive error {e}")
                }
            }
            _ = int.recv() => {
                trace!("Reload websocket closed");
                return
            },
        }
    }
}

async fn send(stream: &mut WebSocket, msg: BrowserMessage) {
    let text = match serde_json::to_string(&msg) {
        Ok(text) => text,
        Err(e) => {
            error!("Reload could not serialize {msg}: {e}");
            return;
        }
    };
    match stream.send(Message::Text(text.into())).await {
        Err(e) => debug!("Reload could not send {msg} due to {e}"),
        Ok(_) => debug!(r#"Reload sent "{msg}" to browser"#),
    }
}

async fn send_and_close(mut stream: WebSocket, msg: BrowserMessage) {
    send(&mut stream, msg).await;
    let _ = stream.close().await;
    trace!("Reload websocket closed");
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BrowserMessage {
    css: Option<String>,
    all: bool,
}

impl BrowserMessage {
    pub fn css(site_path: String) -> Self {
        Self {
            css: Some(site_path),
            all: false,
        }
    }

    pub fn all() -> Self {
        Self {
            css: None,
            all: true,
        }
    }
}

impl Display for BrowserMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(css) = &self.css {
            write!(f, "reload {css}")
        } else {
            write!(f, "reload all")
        }
    }
}
