use crate::{Config, WeatherError, model::RawWeather, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of current-weather observations for a city.
///
/// Implementations make a single attempt per call; retries are the caller's concern.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> Result<RawWeather, WeatherError>;
}

/// Construct the OpenWeather provider from config.
///
/// A missing API key is not an error here; it surfaces on every fetch instead.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::from_config(config)?;
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_builds_without_api_key() {
        let cfg = Config::default();
        assert!(provider_from_config(&cfg).is_ok());
    }

    #[tokio::test]
    async fn provider_without_key_fails_on_fetch() {
        let provider = provider_from_config(&Config::default()).expect("provider");
        let err = provider.current("Lisboa").await.unwrap_err();
        assert!(matches!(err, WeatherError::Configuration));
    }
}
