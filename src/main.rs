use anyhow::{Context, Result};
use parley::ParleyConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ParleyConfig::load().context("Failed to load configuration")?;
    info!("Starting Parley against {}", config.backend.base_url);

    parley::ui::run(config).map_err(|e| anyhow::anyhow!("UI error: {}", e))?;

    Ok(())
}
