use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use weatherio_core::{AppError, Config, Units};
use weatherio_weather::present::POLLUTANTS_PER_PAGE;
use weatherio_weather::{
    AirQualityView, Coordinates, CurrentConditions, FixedGeolocation, OpenWeatherClient,
    OpenWeatherConfig, RefreshCycle, RefreshOutcome, RefreshScheduler, SnapshotCache,
    SqliteStore, UnitSystem,
};

#[tokio::main]
async fn main() -> Result<()> {
    weatherio_core::init()?;

    let (config, _) = match Config::load_validated() {
        Ok(loaded) => loaded,
        Err(e) => {
            let err = AppError::from_anyhow(e);
            eprintln!("{}", err.user_message());
            return Err(err.into());
        }
    };
    let once = std::env::args().skip(1).any(|arg| arg == "--once");

    let client = Arc::new(OpenWeatherClient::new(
        OpenWeatherConfig::new(config.weather.api_key.clone())
            .with_base_url(config.weather.base_url.clone())
            .with_timeout(Duration::from_secs(config.weather.request_timeout_secs)),
    )?);
    let geolocation = Arc::new(FixedGeolocation::new(
        config
            .location
            .coordinates()
            .map(|(lat, lon)| Coordinates::new(lat, lon)),
    ));
    let store = Arc::new(SqliteStore::open(&config.cache.path)?);
    tracing::info!("Using cache at {}", config.cache.path.display());

    let cycle = Arc::new(RefreshCycle::new(
        geolocation,
        client.clone(),
        client,
        SnapshotCache::new(store),
    ));

    if once {
        return run_once(&cycle, &config).await;
    }

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
        }
        shutdown.cancel();
    });

    let period = Duration::from_secs(u64::from(config.weather.refresh_minutes) * 60);
    RefreshScheduler::new(cycle, period).run(cancel).await;

    Ok(())
}

async fn run_once(cycle: &RefreshCycle, config: &Config) -> Result<()> {
    match cycle.run().await {
        Ok(RefreshOutcome::Completed(summary)) => {
            println!("{}", summary.location.display_name());
        }
        Ok(RefreshOutcome::Skipped) => {}
        Err(e) => {
            let err = AppError::refresh(e.to_string(), e.user_message());
            eprintln!("{}", err.user_message());
            return Err(err.into());
        }
    }

    let Some(snapshot) = cycle.cache().read_pair()? else {
        return Ok(());
    };

    let units = UnitSystem::from_metric(config.weather.units == Units::Metric);
    let now = CurrentConditions::from_snapshot(&snapshot.weather, units);
    println!(
        "{} {} (feels like {})",
        now.temperature, now.summary, now.feels_like
    );
    println!(
        "Wind {} {} ({}), humidity {}, UV {} ({})",
        now.wind_speed,
        now.wind_direction,
        now.wind_description,
        now.humidity,
        now.uv_index,
        now.uv_description
    );

    let air = AirQualityView::from_snapshot(&snapshot.air_pollution, POLLUTANTS_PER_PAGE)?;
    println!("Air quality: {}", air.overall);
    for row in air.pages.iter().flatten() {
        println!("  {:<6} {:>9.2} {}", row.id, row.concentration, row.description);
    }

    Ok(())
}
