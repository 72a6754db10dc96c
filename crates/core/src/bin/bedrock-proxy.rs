use bedrock_proxy::config::DEFAULT_CONFIG_PATH;
use bedrock_proxy::{Config, Proxy};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = match Config::load_or_create(DEFAULT_CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("bedrock-proxy: failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let default_level = if config.debug_logging { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "bedrock-proxy exited with an error");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), bedrock_proxy::ProxyError> {
    let mut proxy = Proxy::new(config).await?;

    tokio::select! {
        result = proxy.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    proxy.shutdown().await;
    Ok(())
}
