/// Graylog mock server binary
use graylog_mock::{config::ServerConfig, context::AppContext, error::MockResult, server};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> MockResult<()> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    // Initialize logging
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| "graylog_mock=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Graylog mock server");

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
