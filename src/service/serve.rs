use super::reload::{inject_reload, websocket_handler, RELOAD_PATH};
use crate::{config::Config, internal_prelude::*, logger::GRAY, signal::Interrupt};
use axum::{
    body::{to_bytes, Body},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use camino::Utf8Path;
use std::net::SocketAddr;
use tokio::{
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};
use tower_http::services::ServeDir;

/// Serves the build path with live reload until shutdown is requested.
pub async fn spawn(conf: &Config) -> JoinHandle<Result<()>> {
    let root = conf.build_dir.clone();
    let addr = SocketAddr::new([127, 0, 0, 1].into(), conf.port);
    let mut int = Interrupt::subscribe_shutdown();

    tokio::spawn(async move {
        if TcpStream::connect(&addr).await.is_ok() {
            error!("Serve port {addr} already in use. You can set another port in forge.toml or with FORGE_PORT");
            Interrupt::request_shutdown().await;
            return Ok(());
        }

        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Serve could not bind {addr}: {e}");
                Interrupt::request_shutdown().await;
                return Ok(());
            }
        };
        info!("Serve {} on http://{addr}", GRAY.paint(root.as_str()));

        axum::serve(listener, router(&root))
            .with_graceful_shutdown(async move {
                let _ = int.recv().await;
            })
            .await
            .wrap_err("Serve")?;
        debug!("Serve stopped");
        Ok(())
    })
}

fn router(root: &Utf8Path) -> Router {
    Router::new()
        .route(RELOAD_PATH, get(websocket_handler))
        .fallback_service(ServeDir::new(root))
        .layer(middleware::map_response(inject_into_html))
}

/// Adds the live reload script to html pages served from the build.
async fn inject_into_html(res: Response) -> Response {
    let is_html = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if res.status() != StatusCode::OK || !is_html {
        return res;
    }

    let (mut parts, body) = res.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Serve could not read page: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    parts.headers.remove(header::CONTENT_LENGTH);
    let html = inject_reload(&String::from_utf8_lossy(&bytes));
    Response::from_parts(parts, Body::from(html))
}
