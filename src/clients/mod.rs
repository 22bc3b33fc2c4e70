pub mod openweather;

use async_trait::async_trait;

use crate::models::WeatherPayload;

pub use openweather::OpenWeatherClient;

/// Source of current conditions and forecast for a free-text location.
///
/// Implementations never fail: transport problems and missing credentials are
/// reported through the payload's `cod` field like any provider-side error.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, location: &str) -> WeatherPayload;
}
