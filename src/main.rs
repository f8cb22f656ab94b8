// src/main.rs
mod api;

use load_it_now::config::AppConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,load_it_now=debug,tower_http=info";

#[tokio::main]
async fn main() {
    // Load .env first so RUST_LOG from the file applies to the subscriber.
    let dotenv_result = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            tracing::warn!(error = %err, "could not load .env");
        }
    }

    let app_config = AppConfig::from_env();
    let api_config = app_config.api.clone();
    let optimizer_config = app_config.optimizer.clone();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        strategy = %optimizer_config.packing_config().strategy,
        "load planning service starting"
    );
    if let Err(err) = api::start_api_server(api_config, optimizer_config).await {
        tracing::error!(error = %err, "API server terminated with an error");
        std::process::exit(1);
    }
}
