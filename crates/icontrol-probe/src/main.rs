//! iControl Probe
//!
//! Logs in to a BIG-IP and lists its LTM virtual servers.
//!
//! Configuration comes from environment variables:
//! - `ICONTROL_HOST` (required), `ICONTROL_PORT`, `ICONTROL_SCHEME`
//! - `ICONTROL_USERNAME`, `ICONTROL_PASSWORD` (required)
//! - `ICONTROL_INSECURE=true` to skip certificate verification
//! - `ICONTROL_TIMEOUT_SECS`, `ICONTROL_LOGIN_PROVIDER`

use anyhow::{Context, Result};
use icontrol_client::{ClientConfig, IControlApi, IControlSession, TlsMode, VirtualServerCollection};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env()?;
    let username = env::var("ICONTROL_USERNAME").context("ICONTROL_USERNAME environment variable is required")?;
    let password = env::var("ICONTROL_PASSWORD").context("ICONTROL_PASSWORD environment variable is required")?;

    info!("Configuration:");
    info!("  Device: {}", config.base_url());
    info!("  User: {}", username);
    info!(
        "  Certificate verification: {}",
        if config.tls == TlsMode::Insecure { "disabled" } else { "enabled" }
    );

    let mut session = IControlSession::new(config)?;
    let collection = probe(&mut session, &username, &password).await?;

    info!("Found {} virtual servers", collection.items.len());
    for vs in &collection.items {
        info!(
            "  {} -> {} (pool: {})",
            vs.display_name(),
            vs.destination.as_deref().unwrap_or("-"),
            vs.pool.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

/// Authenticate and fetch the virtual server collection
async fn probe<C: IControlApi>(client: &mut C, username: &str, password: &str) -> Result<VirtualServerCollection> {
    client
        .login(username, password)
        .await
        .with_context(|| format!("Login to {} failed", client.base_url()))?;

    let body = client.list_virtual_servers().await?;
    let collection = serde_json::from_value(body).context("Unexpected virtual server collection shape")?;
    Ok(collection)
}
