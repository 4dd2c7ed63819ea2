//! Gateway service - HTTP server hosting the webhook route.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::gateway::MessageGateway;
use crate::middleware::MessageGatewayLayer;
use crate::ports::inbound::MessageHandler;
use crate::ports::outbound::{SystemTimeSource, TimeSource};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::{Json, Router};
use std::future::Future;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Webhook gateway service state
pub struct GatewayService {
    config: GatewayConfig,
    gateway: Arc<MessageGateway>,
}

impl GatewayService {
    /// Create a new gateway service
    pub fn new(
        config: GatewayConfig,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self, GatewayError> {
        Self::with_clock(config, handler, Arc::new(SystemTimeSource))
    }

    /// Create with an explicit reply clock
    pub fn with_clock(
        config: GatewayConfig,
        handler: Arc<dyn MessageHandler>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, GatewayError> {
        // Validate configuration
        config.validate()?;
        let account = config.account_config()?;

        let gateway = Arc::new(MessageGateway::new(
            &account,
            handler,
            clock,
            config.timeouts.handler,
        )?);

        Ok(Self { config, gateway })
    }

    /// Build the HTTP router.
    ///
    /// Unauthenticated calls to the webhook path fall through to a plain
    /// 404 with no body.
    pub fn router(&self) -> Router {
        let webhook = any(not_for_me).layer(MessageGatewayLayer::new(
            Arc::clone(&self.gateway),
            &self.config.limits,
            &self.config.timeouts,
        ));

        Router::new()
            .route(&self.config.http.path, webhook)
            .route("/health", get(health_check))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(
        &self,
        listener: tokio::net::TcpListener,
        shutdown: F,
    ) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(
            addr = ?listener.local_addr().ok(),
            path = %self.config.http.path,
            safe_mode = self.config.account.safe_mode,
            "Webhook gateway listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        info!("Webhook gateway stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayService")
            .field("config", &self.config)
            .field("gateway", &self.gateway)
            .finish()
    }
}

async fn not_for_me() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
