pub mod config;
pub mod error;

pub use config::{
    CacheConfig, Config, LocationConfig, Units, ValidationResult, WeatherConfig, API_KEY_ENV,
};
pub use error::{AppError, ConfigError};

use anyhow::Result;

/// Initialize logging for the process
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("Weatherio core initialized");
    Ok(())
}
