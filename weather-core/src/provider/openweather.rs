use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::{Config, WeatherError, model::RawWeather};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: Option<String>, base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(config.api_key().map(str::to_owned), &config.base_url, config.timeout())
    }

    async fn fetch_current(&self, city: &str) -> Result<RawWeather, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::Configuration)?;
        let url = format!("{}/weather", self.base_url);

        tracing::debug!(city, "requesting current weather from OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        classify(status, &body)
    }
}

/// Turn a provider response into raw data or a classified failure.
///
/// The body is inspected whatever the HTTP status: OpenWeather reports an
/// unknown city as HTTP 404 carrying `{"cod": "404"}`. A non-2xx response
/// without a `cod` is a transport failure.
fn classify(status: StatusCode, body: &str) -> Result<RawWeather, WeatherError> {
    let parsed: RawWeather = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => {
            return Err(WeatherError::transport(format!(
                "status {}: {}",
                status,
                truncate_body(body)
            )));
        }
        Err(err) => return Err(WeatherError::transport(err)),
    };

    match &parsed.cod {
        Some(code) if code.is_not_found() => Err(WeatherError::NotFound),
        Some(code) if !code.is_success() => Err(WeatherError::Provider(
            parsed.message.clone().unwrap_or_else(|| "Erro desconhecido".to_string()),
        )),
        None if !status.is_success() => Err(WeatherError::transport(format!(
            "status {}: {}",
            status,
            truncate_body(body)
        ))),
        _ => Ok(parsed),
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<RawWeather, WeatherError> {
        self.fetch_current(city).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
