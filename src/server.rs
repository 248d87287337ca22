//! Ephemeral static-file server
//!
//! Serves the validated content root over loopback for the duration of one
//! run. The port is picked uniformly at random from a configured range,
//! retrying on collision; a random pick avoids thundering-herd collisions
//! when multiple instances run on the same host.

use crate::{CaptureConfig, CaptureError};
use axum::Router;
use rand::Rng;
use std::path::Path;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};
use url::Url;

/// A running local HTTP server exposing one directory as static content.
///
/// Shutdown is explicit and must happen on every exit path of the run;
/// teardown errors are logged, never propagated.
#[derive(Debug)]
pub struct StaticServer {
    port: u16,
    base_url: Url,
    shutdown_tx: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl StaticServer {
    /// Binds a listener within the configured port range and starts serving
    /// `root`. Directory index fallback is disabled; only explicit file
    /// paths are served.
    pub async fn start(root: &Path, config: &CaptureConfig) -> Result<Self, CaptureError> {
        let listener = bind_with_retry(
            &config.host,
            config.port_min,
            config.port_max,
            config.bind_attempts,
        )
        .await?;
        let port = listener
            .local_addr()
            .map_err(|e| CaptureError::Bind(e.to_string()))?
            .port();
        let base_url = Url::parse(&format!("http://{}:{}/", config.host, port))?;

        let serve_dir = ServeDir::new(root).append_index_html_on_directories(false);
        let app = Router::new()
            .fallback_service(serve_dir)
            .layer(TraceLayer::new_for_http());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                warn!("Static server error: {e}");
            }
        });

        Ok(Self {
            port,
            base_url,
            shutdown_tx,
            task,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Signals the serve task and waits for it to drain. Best-effort; errors
    /// do not change the run's reported outcome.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            warn!("Static server task error: {e}");
        }
    }
}

async fn bind_with_retry(
    host: &str,
    port_min: u16,
    port_max: u16,
    max_attempts: u32,
) -> Result<TcpListener, CaptureError> {
    for _ in 0..max_attempts {
        let port = {
            let mut rng = rand::rng();
            rng.random_range(port_min..=port_max)
        };
        match TcpListener::bind((host, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                debug!("Port {port} is in use, retrying...");
            }
            Err(e) => return Err(CaptureError::Bind(e.to_string())),
        }
    }
    Err(CaptureError::PortExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for_range(port_min: u16, port_max: u16, bind_attempts: u32) -> CaptureConfig {
        CaptureConfig {
            port_min,
            port_max,
            bind_attempts,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_serves_static_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>home</html>").unwrap();
        std::fs::write(dir.path().join("sub/page.html"), "<html>sub</html>").unwrap();

        let config = config_for_range(18000, 19000, 10);
        let server = StaticServer::start(dir.path(), &config).await.unwrap();

        let body = reqwest::get(server.base_url().join("index.html").unwrap())
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "<html>home</html>");

        let body = reqwest::get(server.base_url().join("sub/page.html").unwrap())
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "<html>sub</html>");

        let missing = reqwest::get(server.base_url().join("nope.html").unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_retries_past_occupied_port() {
        // Occupy an OS-assigned port, then hand the launcher a small range
        // starting at it. With 50 attempts over 11 ports the launcher finds a
        // free one.
        let blocker = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let taken = blocker.local_addr().unwrap().port();

        let dir = TempDir::new().unwrap();
        let config = config_for_range(taken, taken.saturating_add(10), 50);
        let server = StaticServer::start(dir.path(), &config).await.unwrap();
        assert_ne!(server.port(), taken);
        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_port_exhaustion() {
        let blocker = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let taken = blocker.local_addr().unwrap().port();

        let dir = TempDir::new().unwrap();
        let config = config_for_range(taken, taken, 3);
        let err = StaticServer::start(dir.path(), &config).await.unwrap_err();
        assert!(matches!(err, CaptureError::PortExhausted { attempts: 3 }));
        assert!(err.is_fatal());
    }
}
