//! Keep-alive HTTP endpoint.
//!
//! Hosting platforms probe the process over HTTP; every request on every
//! path gets a `200 OK` with a static body. The server is started
//! explicitly from the entry sequence and lives for the whole process — no
//! graceful shutdown.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Serve the always-200 responder on an already-bound listener.
///
/// # Errors
///
/// Returns an `std::io::Error` if serving fails.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    let app = Router::new().fallback(|| async { "Bot is running" });
    axum::serve(listener, app).await
}

/// Bind the liveness endpoint on `0.0.0.0:port` and run it as a background
/// task. Bind or serve failures are logged, never fatal: the bot keeps
/// working without its health check.
pub fn spawn_liveness(port: u16) -> JoinHandle<()> {
    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                info!("liveness endpoint listening on {addr}");
                if let Err(e) = serve(listener).await {
                    error!("liveness endpoint stopped: {e}");
                }
            }
            Err(e) => error!("failed to bind liveness endpoint on {addr}: {e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::serve;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn answers_200_on_any_path() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = serve(listener).await;
        });

        for path in ["/", "/healthz", "/anything/else"] {
            let response = reqwest::get(format!("http://{addr}{path}"))
                .await
                .expect("request");
            assert_eq!(response.status(), 200);
        }
        let body = reqwest::get(format!("http://{addr}/"))
            .await
            .expect("request")
            .text()
            .await
            .expect("body");
        assert_eq!(body, "Bot is running");
    }
}
