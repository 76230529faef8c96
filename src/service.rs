use crate::aggregator::Aggregator;
use crate::cache::{CacheEntry, CacheKey, ResponseCache};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::{FilterRequest, FilterSpec, KeywordPolicy};
use crate::news::{NewsItem, renumber};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct NewsRequest {
    /// Clamped into `1..=max_items_limit`; `None` means the configured default.
    pub max_items: Option<usize>,
    pub filter: FilterRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsResponse {
    pub total: usize,
    pub items: Vec<NewsItem>,
    pub from_cache: bool,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

impl NewsResponse {
    fn from_entry(entry: CacheEntry, from_cache: bool) -> Self {
        Self {
            total: entry.payload.len(),
            items: entry.payload,
            from_cache,
            cached_at: entry.cached_at,
            expires_at: entry.expires_at,
            fetched_at: Utc::now(),
        }
    }
}

/// Cache, aggregator and keyword policy wired together. Build one per
/// process and share it by reference.
pub struct NewsService {
    aggregator: Aggregator,
    cache: ResponseCache,
    policy: KeywordPolicy,
    default_items: usize,
    max_items_limit: usize,
    request_timeout: Duration,
    single_flight: bool,
    inflight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl NewsService {
    pub fn new(aggregator: Aggregator, config: &Config) -> Self {
        Self {
            aggregator,
            cache: ResponseCache::new(
                Duration::from_secs(config.cache.ttl_secs),
                config.cache.max_size,
            ),
            policy: KeywordPolicy::from(&config.filter),
            default_items: config.aggregator.default_items,
            max_items_limit: config.aggregator.max_items_limit.max(1),
            request_timeout: Duration::from_secs(config.aggregator.request_timeout_secs),
            single_flight: config.cache.single_flight,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Aggregator::from_config(config)?, config))
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn policy(&self) -> &KeywordPolicy {
        &self.policy
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn clamp(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_items)
            .clamp(1, self.max_items_limit)
    }

    /// Cached when possible, otherwise aggregate, filter, renumber, store.
    pub async fn fetch(&self, request: &NewsRequest) -> Result<NewsResponse> {
        let max_items = self.clamp(request.max_items);
        let spec = self.policy.resolve(&request.filter);

        if let Some(entry) = self.cache.get(max_items, &spec) {
            return Ok(NewsResponse::from_entry(entry, true));
        }
        if !self.single_flight {
            return self.refresh(max_items, &spec).await;
        }

        let key = CacheKey::new(max_items, &spec);
        let gate = {
            let mut inflight = self.inflight.lock().await;
            inflight.entry(key.clone()).or_default().clone()
        };
        let result = {
            let _turn = gate.lock().await;
            match self.cache.peek(&key) {
                Some(entry) => {
                    debug!(key = %key, "filled by a concurrent request");
                    Ok(NewsResponse::from_entry(entry, true))
                }
                None => self.refresh(max_items, &spec).await,
            }
        };
        {
            let mut inflight = self.inflight.lock().await;
            // One reference in the map, one here: nobody else is waiting.
            if Arc::strong_count(&gate) <= 2 {
                inflight.remove(&key);
            }
        }
        result
    }

    async fn refresh(&self, max_items: usize, spec: &FilterSpec) -> Result<NewsResponse> {
        let items = tokio::time::timeout(self.request_timeout, self.aggregator.aggregate(max_items))
            .await
            .map_err(|_| Error::Timeout {
                secs: self.request_timeout.as_secs(),
            })??;
        let items = renumber(spec.apply(items));
        info!(max_items, count = items.len(), "news refreshed");
        let entry = self.cache.set(max_items, items, spec);
        Ok(NewsResponse::from_entry(entry, false))
    }
}
