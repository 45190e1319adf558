use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Format used when rendering search timestamps to clients.
pub const SEARCH_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Status code embedded in provider bodies. OpenWeather sends it either as a
/// number (`200`) or as a string (`"404"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProviderCode {
    Number(i64),
    Text(String),
}

impl ProviderCode {
    fn is(&self, code: i64) -> bool {
        match self {
            ProviderCode::Number(n) => *n == code,
            ProviderCode::Text(s) => s.trim().parse::<i64>().is_ok_and(|n| n == code),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.is(404)
    }

    pub fn is_success(&self) -> bool {
        self.is(200)
    }
}

/// Current-weather body as returned by the provider. Every field is optional
/// and a value of the wrong type reads as absent; the normalizer fills in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawWeather {
    #[serde(deserialize_with = "lenient")]
    pub cod: Option<ProviderCode>,
    #[serde(deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub main: Option<RawMain>,
    #[serde(deserialize_with = "lenient")]
    pub wind: Option<RawWind>,
    #[serde(deserialize_with = "lenient")]
    pub sys: Option<RawSys>,
    #[serde(deserialize_with = "lenient_int")]
    pub visibility: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMain {
    #[serde(deserialize_with = "lenient")]
    pub temp: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub feels_like: Option<f64>,
    #[serde(deserialize_with = "lenient_int")]
    pub humidity: Option<i64>,
    #[serde(deserialize_with = "lenient_int")]
    pub pressure: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawWind {
    #[serde(deserialize_with = "lenient")]
    pub speed: Option<f64>,
    #[serde(deserialize_with = "lenient_int")]
    pub deg: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSys {
    #[serde(deserialize_with = "lenient")]
    pub country: Option<String>,
}

/// `None` for null or for any value that does not fit `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| T::deserialize(v).ok()))
}

/// Integers, with finite floats rounded to the nearest whole number.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| {
        v.as_i64().or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
    }))
}

/// Fixed-shape weather payload returned to clients.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedWeather {
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "pais")]
    pub country: String,
    #[serde(rename = "temperatura")]
    pub temperature: f64,
    #[serde(rename = "sensacao_termica")]
    pub feels_like: f64,
    #[serde(rename = "umidade")]
    pub humidity: i64,
    #[serde(rename = "pressao")]
    pub pressure: i64,
    #[serde(rename = "velocidade_vento")]
    pub wind_speed: f64,
    #[serde(rename = "direcao_vento")]
    pub wind_direction: i64,
    #[serde(rename = "visibilidade")]
    pub visibility: i64,
}

/// One successful, non-cached lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: u64,
    pub city: String,
    pub searched_at: DateTime<Utc>,
}

impl SearchRecord {
    pub fn search_time(&self) -> String {
        self.searched_at.format(SEARCH_TIME_FORMAT).to_string()
    }
}
