//! Per-request lookup: cache check, then fetch, normalize, cache write and history append.

use std::{sync::Arc, time::Duration};

use crate::{
    Config, WeatherError,
    cache::{WeatherCache, cache_key},
    history::HistoryStore,
    model::{NormalizedWeather, SearchRecord},
    normalize::normalize,
    provider::WeatherProvider,
};

/// Where a successful lookup was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Provider,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub weather: NormalizedWeather,
    pub source: Source,
}

pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    cache: Arc<dyn WeatherCache>,
    history: Arc<dyn HistoryStore>,
    ttl: Duration,
    history_limit: usize,
}

impl WeatherService {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        cache: Arc<dyn WeatherCache>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        let defaults = Config::default();
        Self {
            provider,
            cache,
            history,
            ttl: defaults.cache_ttl(),
            history_limit: defaults.history_limit,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Current weather for `city`, from cache when fresh.
    ///
    /// A provider failure leaves cache and history untouched. On success both are
    /// written independently; there is no rollback if the history append fails
    /// after the cache write.
    pub async fn lookup(&self, city: &str) -> Result<Lookup, WeatherError> {
        let key = cache_key(city);

        if let Some(weather) = self.cache.get(&key).await {
            tracing::debug!(city, "cache hit");
            return Ok(Lookup { weather, source: Source::Cache });
        }

        tracing::debug!(city, "cache miss");

        let raw = self.provider.current(city).await?;
        let weather = normalize(&raw);

        self.cache.set(key, weather.clone(), self.ttl).await;

        if let Err(err) = self.history.record(city).await {
            tracing::error!(city, error = %err, "failed to record search history");
            return Err(err);
        }

        tracing::info!(city, temperature = weather.temperature, "fetched current weather");

        Ok(Lookup { weather, source: Source::Provider })
    }

    /// The most recent searches, newest first, bounded by the configured limit.
    pub async fn recent_searches(&self) -> Result<Vec<SearchRecord>, WeatherError> {
        self.history.recent(self.history_limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cache::MemoryCache, history::MemoryHistory, model::RawWeather};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    enum Reply {
        Ok(serde_json::Value),
        NotFound,
        MissingKey,
    }

    #[derive(Debug)]
    struct FakeProvider {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self { reply, calls: AtomicUsize::new(0) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current(&self, _city: &str) -> Result<RawWeather, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Ok(body) => Ok(serde_json::from_value(body.clone()).expect("fixture")),
                Reply::NotFound => Err(WeatherError::NotFound),
                Reply::MissingKey => Err(WeatherError::Configuration),
            }
        }
    }

    struct FailingHistory;

    #[async_trait]
    impl HistoryStore for FailingHistory {
        async fn record(&self, _city: &str) -> Result<SearchRecord, WeatherError> {
            Err(WeatherError::Internal("database is locked".into()))
        }

        async fn recent(&self, _n: usize) -> Result<Vec<SearchRecord>, WeatherError> {
            Ok(Vec::new())
        }
    }

    fn sao_paulo() -> serde_json::Value {
        serde_json::json!({
            "name": "São Paulo",
            "main": { "temp": 25.0, "feels_like": 26.0, "humidity": 65, "pressure": 1013 },
            "wind": { "speed": 3.0, "deg": 180 },
            "sys": { "country": "BR" },
            "visibility": 10000
        })
    }

    struct Harness {
        provider: Arc<FakeProvider>,
        cache: Arc<MemoryCache>,
        history: Arc<MemoryHistory>,
        service: WeatherService,
    }

    fn harness(reply: Reply) -> Harness {
        let provider = FakeProvider::new(reply);
        let cache = Arc::new(MemoryCache::new());
        let history = Arc::new(MemoryHistory::new());
        let service = WeatherService::new(provider.clone(), cache.clone(), history.clone());
        Harness { provider, cache, history, service }
    }

    #[tokio::test]
    async fn miss_fetches_caches_and_records() {
        let h = harness(Reply::Ok(sao_paulo()));

        let lookup = h.service.lookup("São Paulo").await.unwrap();
        assert_eq!(lookup.source, Source::Provider);
        assert_eq!(lookup.weather.city, "São Paulo");

        assert_eq!(h.provider.calls(), 1);
        assert!(h.cache.get("weather_são paulo").await.is_some());

        let recent = h.history.recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].city, "São Paulo");
    }

    #[tokio::test]
    async fn hit_is_case_insensitive_and_skips_provider_and_history() {
        let h = harness(Reply::Ok(sao_paulo()));

        let first = h.service.lookup("São Paulo").await.unwrap();
        let second = h.service.lookup("SÃO PAULO").await.unwrap();

        assert_eq!(second.source, Source::Cache);
        assert_eq!(
            serde_json::to_vec(&first.weather).unwrap(),
            serde_json::to_vec(&second.weather).unwrap()
        );
        assert_eq!(h.provider.calls(), 1);
        assert_eq!(h.history.len().await, 1);
    }

    #[tokio::test]
    async fn expired_entry_fetches_again() {
        let h = harness(Reply::Ok(sao_paulo()));
        let service = h.service.with_ttl(Duration::from_millis(20));

        service.lookup("Recife").await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        let again = service.lookup("Recife").await.unwrap();

        assert_eq!(again.source, Source::Provider);
        assert_eq!(h.provider.calls(), 2);
        assert_eq!(h.history.len().await, 2);
    }

    #[tokio::test]
    async fn provider_failure_writes_nothing() {
        let h = harness(Reply::NotFound);

        let err = h.service.lookup("CidadeInexistente").await.unwrap_err();
        assert_eq!(err.to_string(), "Cidade não encontrada");
        assert!(h.cache.is_empty().await);
        assert!(h.history.is_empty().await);
    }

    #[tokio::test]
    async fn missing_key_writes_nothing() {
        let h = harness(Reply::MissingKey);

        let err = h.service.lookup("São Paulo").await.unwrap_err();
        assert!(matches!(err, WeatherError::Configuration));
        assert!(h.cache.is_empty().await);
        assert!(h.history.is_empty().await);
    }

    #[tokio::test]
    async fn history_failure_surfaces_as_internal() {
        let provider = FakeProvider::new(Reply::Ok(sao_paulo()));
        let cache = Arc::new(MemoryCache::new());
        let service = WeatherService::new(provider, cache.clone(), Arc::new(FailingHistory));

        let err = service.lookup("São Paulo").await.unwrap_err();
        assert!(matches!(err, WeatherError::Internal(_)));
        // Cache write already happened; no rollback.
        assert!(!cache.is_empty().await);
    }

    #[tokio::test]
    async fn recent_searches_respects_limit() {
        let h = harness(Reply::Ok(sao_paulo()));
        let service = h.service.with_history_limit(3);
        for i in 0..5 {
            h.history.record(&format!("c{i}")).await.unwrap();
        }

        let recent = service.recent_searches().await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].city, "c4");
    }
}
