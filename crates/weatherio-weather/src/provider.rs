//! OpenWeatherMap client for telemetry and air pollution data.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use crate::types::{PollutantSnapshot, TelemetrySnapshot, WeatherError};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Weatherio/0.1.0";

/// Source of weather telemetry for a coordinate pair.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current conditions plus hourly/daily forecast, metric units.
    async fn fetch_current_and_forecast(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<TelemetrySnapshot, WeatherError>;

    /// Current air pollution reading.
    async fn fetch_pollutants(&self, lat: f64, lon: f64) -> Result<PollutantSnapshot, WeatherError>;
}

/// Connection settings for [`OpenWeatherClient`]
#[derive(Debug, Clone)]
pub struct OpenWeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl OpenWeatherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    pub(crate) client: Arc<Client>,
    pub(crate) config: OpenWeatherConfig,
}

impl OpenWeatherClient {
    /// Build a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(config: OpenWeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// GET `path` with the given query, appending the API key, and decode JSON.
    pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .query(&[("appid", self.config.api_key.as_str())])
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)))
        } else {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!("Weather provider returned status {}", status);
            Err(WeatherError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_current_and_forecast(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<TelemetrySnapshot, WeatherError> {
        self.get_json(
            "/data/2.5/onecall",
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".to_string()),
            ],
        )
        .await
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_pollutants(&self, lat: f64, lon: f64) -> Result<PollutantSnapshot, WeatherError> {
        self.get_json(
            "/data/2.5/air_pollution",
            &[("lat", lat.to_string()), ("lon", lon.to_string())],
        )
        .await
    }
}
