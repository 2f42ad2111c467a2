//! HTTP server lifecycle.

use crate::gateway::Gateway;
use crate::http::handlers::{router, AppState};
use crate::types::ServerConfig;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// HTTP server wrapping the gateway.
#[derive(Debug)]
pub struct GatewayServer {
    gateway: Arc<Gateway>,
    config: ServerConfig,
    cancel: CancellationToken,
}

impl GatewayServer {
    pub fn new(gateway: Arc<Gateway>, config: ServerConfig) -> Self {
        Self {
            gateway,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Bind `listen_addr` and serve until [`GatewayServer::shutdown`] is called.
    pub async fn serve(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr).await?;
        self.serve_on(listener).await
    }

    /// Serve on an already bound listener.
    ///
    /// After shutdown is requested, in-flight requests get `shutdown_grace`
    /// to finish before the server stops waiting for them.
    pub async fn serve_on(&self, listener: TcpListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        let app = router(AppState::new(Arc::clone(&self.gateway)), &self.config);
        tracing::info!(
            "gateway listening on {} (tools={})",
            addr,
            self.gateway.registry().len(),
        );

        let cancel = self.cancel.clone();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(async move { cancel.cancelled().await });

        let grace = self.config.shutdown_grace;
        let cancel = self.cancel.clone();
        tokio::select! {
            result = server.into_future() => result?,
            _ = async {
                cancel.cancelled().await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!("shutdown grace of {:?} elapsed; dropping open connections", grace);
            }
        }

        tracing::info!("gateway shut down");
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Token that triggers shutdown when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
