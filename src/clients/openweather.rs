use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{Span, debug, warn};
use url::Url;

use super::WeatherProvider;
use crate::config::ProviderConfig;
use crate::models::WeatherPayload;

pub const MISSING_KEY_MESSAGE: &str = "Missing OPENWEATHER_API_KEY";

const STATUS_UNAUTHORIZED: i64 = 401;
const STATUS_TRANSPORT_ERROR: i64 = 500;

/// OpenWeatherMap client for the `/weather` and `/forecast` endpoints.
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    units: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("weatherlog/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build OpenWeather HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            units: config.units.clone(),
            api_key: config.configured_key().map(str::to_string),
        })
    }

    fn endpoint_url(&self, endpoint: &str, location: &str, api_key: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{endpoint}", self.base_url))
            .with_context(|| format!("Invalid provider base URL: {}", self.base_url))?;

        url.query_pairs_mut()
            .append_pair("q", location)
            .append_pair("appid", api_key)
            .append_pair("units", &self.units);

        Ok(url)
    }

    async fn get_json(&self, endpoint: &str, location: &str, api_key: &str) -> Result<Value> {
        let url = self.endpoint_url(endpoint, location, api_key)?;

        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("OpenWeather {endpoint} request failed"))?
            .json::<Value>()
            .await
            .with_context(|| format!("OpenWeather {endpoint} returned an unreadable body"))?;

        Ok(body)
    }

    async fn fetch_both(&self, location: &str, api_key: &str) -> Result<WeatherPayload> {
        let (current, forecast) = tokio::try_join!(
            self.get_json("weather", location, api_key),
            self.get_json("forecast", location, api_key),
        )?;

        Ok(WeatherPayload::new(current, forecast))
    }
}

impl OpenWeatherClient {
    async fn lookup(&self, location: &str) -> (WeatherPayload, &'static str) {
        let Some(api_key) = self.api_key.as_deref() else {
            return (
                WeatherPayload::error(STATUS_UNAUTHORIZED, MISSING_KEY_MESSAGE),
                "missing_key",
            );
        };

        debug!("Fetching weather for {:?}", location);

        match self.fetch_both(location, api_key).await {
            Ok(payload) if payload.is_success() => (payload, "ok"),
            Ok(payload) => (payload, "provider_error"),
            Err(e) => {
                warn!("Weather fetch for {:?} failed: {:#}", location, e);
                (
                    WeatherPayload::error(STATUS_TRANSPORT_ERROR, format!("{e:#}")),
                    "transport_error",
                )
            }
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(&self, location: &str) -> WeatherPayload {
        let (payload, outcome) = self.lookup(location).await;

        metrics::counter!("weather_fetch_total", "outcome" => outcome).increment(1);
        Span::current().record("weather_fetch", outcome);

        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            base_url: base_url.to_string(),
            request_timeout_seconds: 2,
            api_key: api_key.map(str::to_string),
            ..ProviderConfig::default()
        }
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        // Unroutable base URL: any request would fail with a transport error instead.
        let client = OpenWeatherClient::new(&config("http://invalid.invalid", None)).unwrap();

        let payload = client.fetch("Boston").await;
        assert_eq!(payload.status_code(), 401);
        assert_eq!(payload.error_message(), MISSING_KEY_MESSAGE);
        assert_eq!(payload.forecast, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_empty_key_counts_as_missing() {
        let client = OpenWeatherClient::new(&config("http://invalid.invalid", Some(""))).unwrap();
        assert_eq!(client.fetch("Boston").await.status_code(), 401);
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_500_payload() {
        let client = OpenWeatherClient::new(&config("http://127.0.0.1:1", Some("key"))).unwrap();

        let payload = client.fetch("Boston").await;
        assert_eq!(payload.status_code(), 500);
        assert!(!payload.error_message().is_empty());
        assert_eq!(payload.forecast, serde_json::json!({}));
    }

    #[test]
    fn test_endpoint_url_query() {
        let client =
            OpenWeatherClient::new(&config("https://api.example.com/data/2.5/", Some("k"))).unwrap();

        let url = client.endpoint_url("forecast", "São Paulo", "k").unwrap();
        assert_eq!(url.path(), "/data/2.5/forecast");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "São Paulo".to_string()),
                ("appid".to_string(), "k".to_string()),
                ("units".to_string(), "metric".to_string()),
            ]
        );
    }
}
