use async_trait::async_trait;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::model::NormalizedWeather;

const KEY_PREFIX: &str = "weather_";

/// Cache key for a city lookup; case-insensitive on the city name.
pub fn cache_key(city: &str) -> String {
    format!("{KEY_PREFIX}{}", city.to_lowercase())
}

/// Key-value store with per-entry expiry. Writes to the same key are last-write-wins.
#[async_trait]
pub trait WeatherCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<NormalizedWeather>;

    async fn set(&self, key: String, value: NormalizedWeather, ttl: Duration);
}

#[derive(Debug)]
struct Entry {
    value: NormalizedWeather,
    expires_at: Instant,
}

/// Process-local cache. Expired entries are dropped when read.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl WeatherCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<NormalizedWeather> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock: a fresh value may have landed in between.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.expires_at <= Instant::now()) {
            entries.remove(key);
        }
        entries.get(key).map(|e| e.value.clone())
    }

    async fn set(&self, key: String, value: NormalizedWeather, ttl: Duration) {
        let entry = Entry { value, expires_at: Instant::now() + ttl };
        self.entries.write().await.insert(key, entry);
    }
}
