//! Webhook server command — `pagesmith serve`.

use anyhow::{Context, Result};

use pagesmith::config::AppConfig;
use pagesmith::service::server::{ServerConfig, start_server};

pub async fn cmd_serve(host: String, port: u16) -> Result<()> {
    let app = AppConfig::from_env().context("Failed to load configuration")?;
    start_server(ServerConfig { host, port }, app).await
}
