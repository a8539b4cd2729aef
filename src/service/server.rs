use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;

use super::api::{self, AppState};
use super::github::is_valid_github_token;
use super::jobs::JobRegistry;
use super::pipeline::{PipelineDeps, PipelineRunner};

/// Configuration for the webhook server.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Build the full application router with request tracing.
pub fn build_router(state: Arc<AppState>) -> Router {
    api::api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Wire the production pipeline from `app` and serve until Ctrl-C.
pub async fn start_server(config: ServerConfig, app: AppConfig) -> Result<()> {
    if !is_valid_github_token(&app.github_token) {
        tracing::warn!("GITHUB_TOKEN does not look like a GitHub token");
    }
    if app.openai_api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set; every round will publish fallback content");
    }

    let runner = PipelineRunner::new(PipelineDeps::from_config(&app), JobRegistry::new());
    let state = Arc::new(AppState {
        runner,
        user_secret: app.user_secret.clone(),
    });
    let router = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    tracing::info!(
        addr = %local_addr,
        processed_log = %app.processed_path.display(),
        model = %app.openai_model,
        "pagesmith listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
