//! Fingerprinted TTL cache for aggregated responses.
//!
//! Entries are addressed by a hash of `(max_items, FilterSpec)`. Expired
//! entries are dropped lazily, on access and before capacity eviction.

use crate::filter::FilterSpec;
use crate::news::NewsItem;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hex SHA-256 of `news:<n>`, plus `:filters:<json>` when the filter
    /// has any keywords. The filter keyword sets are ordered, so keyword
    /// order in the request never changes the key.
    pub fn new(max_items: usize, spec: &FilterSpec) -> Self {
        let mut data = format!("news:{max_items}");
        if !spec.is_empty() {
            let filters = serde_json::to_string(spec).unwrap_or_else(|e| {
                warn!(error = %e, "filter spec serialization failed, keying on debug form");
                format!("{spec:?}")
            });
            data.push_str(":filters:");
            data.push_str(&filters);
        }
        Self(hex::encode(Sha256::digest(data.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: Vec<NewsItem>,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    stored: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored.elapsed() >= ttl
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    pub hit_rate_percentage: f64,
    pub size: usize,
    pub max_size: usize,
    pub ttl_secs: u64,
    pub current_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    pub key: CacheKey,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub remaining_secs: f64,
    pub items: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    pub total_entries: usize,
    pub entries: Vec<EntryInfo>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<CacheKey, CacheEntry>,
    hits: u64,
    misses: u64,
    total_requests: u64,
}

impl Inner {
    fn purge_expired(&mut self, ttl: Duration) {
        self.entries.retain(|_, e| !e.is_expired(ttl));
    }
}

/// Shared response cache. All access goes through one mutex; a poisoned
/// lock is recovered rather than surfaced.
#[derive(Debug)]
pub struct ResponseCache {
    inner: Mutex<Inner>,
    ttl: Duration,
    max_size: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        info!(ttl_secs = ttl.as_secs(), max_size, "cache initialised");
        Self {
            inner: Mutex::new(Inner::default()),
            ttl,
            max_size: max_size.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counted lookup: every call is a request and either a hit or a miss.
    pub fn get(&self, max_items: usize, spec: &FilterSpec) -> Option<CacheEntry> {
        let key = CacheKey::new(max_items, spec);
        let mut inner = self.lock();
        inner.total_requests += 1;
        let found = match inner.entries.get(&key) {
            Some(entry) if !entry.is_expired(self.ttl) => Some(entry.clone()),
            Some(_) => {
                inner.entries.remove(&key);
                None
            }
            None => None,
        };
        if found.is_some() {
            inner.hits += 1;
            info!(max_items, filtered = !spec.is_empty(), "cache hit");
        } else {
            inner.misses += 1;
            info!(max_items, filtered = !spec.is_empty(), "cache miss");
        }
        found
    }

    /// Lookup that leaves the counters alone.
    pub fn peek(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.lock()
            .entries
            .get(key)
            .filter(|e| !e.is_expired(self.ttl))
            .cloned()
    }

    /// Stores a payload, evicting the oldest entry when full.
    pub fn set(&self, max_items: usize, payload: Vec<NewsItem>, spec: &FilterSpec) -> CacheEntry {
        let key = CacheKey::new(max_items, spec);
        let now = Utc::now();
        let entry = CacheEntry {
            key: key.clone(),
            payload,
            cached_at: now,
            expires_at: chrono::Duration::from_std(self.ttl)
                .ok()
                .and_then(|ttl| now.checked_add_signed(ttl))
                .unwrap_or(now),
            stored: Instant::now(),
        };

        let mut inner = self.lock();
        inner.purge_expired(self.ttl);
        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.max_size {
            let oldest = inner
                .entries
                .values()
                .min_by_key(|e| e.stored)
                .map(|e| e.key.clone());
            if let Some(oldest) = oldest {
                debug!(key = %oldest, "evicting oldest cache entry");
                inner.entries.remove(&oldest);
            }
        }
        inner.entries.insert(key, entry.clone());
        info!(max_items, items = entry.payload.len(), "cache stored");
        entry
    }

    /// Drops every entry; returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut inner = self.lock();
        let removed = inner.entries.len();
        inner.entries.clear();
        info!(removed, "cache cleared");
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let mut inner = self.lock();
        inner.purge_expired(self.ttl);
        let hit_rate = if inner.total_requests > 0 {
            inner.hits as f64 / inner.total_requests as f64 * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            total_requests: inner.total_requests,
            hit_rate_percentage: (hit_rate * 100.0).round() / 100.0,
            size: inner.entries.len(),
            max_size: self.max_size,
            ttl_secs: self.ttl.as_secs(),
            current_time: Utc::now(),
        }
    }

    pub fn info(&self) -> CacheInfo {
        let mut inner = self.lock();
        inner.purge_expired(self.ttl);
        let mut entries: Vec<EntryInfo> = inner
            .entries
            .values()
            .map(|e| EntryInfo {
                key: e.key.clone(),
                cached_at: e.cached_at,
                expires_at: e.expires_at,
                remaining_secs: self.ttl.saturating_sub(e.stored.elapsed()).as_secs_f64(),
                items: e.payload.len(),
            })
            .collect();
        entries.sort_by(|a, b| a.cached_at.cmp(&b.cached_at));
        CacheInfo {
            total_entries: entries.len(),
            entries,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<NewsItem> {
        (1..=n)
            .map(|i| NewsItem {
                number: i,
                title: format!("Notícia {i}"),
                summary: "Resumo".into(),
                image_url: "Imagem não disponível".into(),
                link: format!("https://andes.org.br/conteudos/noticia/{i}"),
                category: "Nacional".into(),
                date_text: "1 de maio de 2025".into(),
            })
            .collect()
    }

    fn spec(include: &[&str]) -> FilterSpec {
        FilterSpec::from_lists(include, Vec::<String>::new(), false, false)
    }

    #[test]
    fn round_trip_before_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60), 10);
        let s = spec(&["greve"]);
        cache.set(5, items(3), &s);
        let entry = cache.get(5, &s).unwrap();
        assert_eq!(entry.payload, items(3));
        assert!(entry.expires_at > entry.cached_at);
        assert!(cache.get(5, &FilterSpec::default()).is_none());
        assert!(cache.get(6, &s).is_none());
    }

    #[test]
    fn entries_expire() {
        let cache = ResponseCache::new(Duration::from_millis(30), 10);
        cache.set(5, items(1), &FilterSpec::default());
        std::thread::sleep(Duration::from_millis(60));
        assert!(cache.get(5, &FilterSpec::default()).is_none());
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn key_ignores_keyword_order() {
        let a = spec(&["greve", "universidade"]);
        let b = spec(&["universidade", "Greve"]);
        assert_eq!(CacheKey::new(5, &a), CacheKey::new(5, &b));
        assert_ne!(CacheKey::new(5, &a), CacheKey::new(6, &a));
        assert_ne!(CacheKey::new(5, &a), CacheKey::new(5, &FilterSpec::default()));
        assert_eq!(CacheKey::new(5, &a).as_str().len(), 64);
    }

    #[test]
    fn full_cache_evicts_oldest() {
        let cache = ResponseCache::new(Duration::from_secs(60), 2);
        let none = FilterSpec::default();
        cache.set(1, items(1), &none);
        std::thread::sleep(Duration::from_millis(2));
        cache.set(2, items(2), &none);
        std::thread::sleep(Duration::from_millis(2));
        cache.set(3, items(3), &none);
        assert!(cache.get(1, &none).is_none());
        assert!(cache.get(2, &none).is_some());
        assert!(cache.get(3, &none).is_some());
        assert_eq!(cache.stats().size, 2);
    }

    #[test]
    fn stats_track_hits_and_misses() {
        let cache = ResponseCache::new(Duration::from_secs(60), 5);
        let none = FilterSpec::default();
        assert!(cache.get(5, &none).is_none());
        cache.set(5, items(2), &none);
        assert!(cache.get(5, &none).is_some());
        assert!(cache.get(5, &none).is_some());
        let stats = cache.stats();
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate_percentage, 66.67);
        assert_eq!(stats.max_size, 5);
        assert_eq!(stats.ttl_secs, 60);
    }

    #[test]
    fn peek_does_not_count() {
        let cache = ResponseCache::new(Duration::from_secs(60), 5);
        let none = FilterSpec::default();
        cache.set(5, items(1), &none);
        assert!(cache.peek(&CacheKey::new(5, &none)).is_some());
        assert_eq!(cache.stats().total_requests, 0);
    }

    #[test]
    fn clear_and_info() {
        let cache = ResponseCache::new(Duration::from_secs(60), 5);
        cache.set(5, items(2), &FilterSpec::default());
        cache.set(5, items(1), &spec(&["greve"]));
        let info = cache.info();
        assert_eq!(info.total_entries, 2);
        assert!(info.entries.iter().all(|e| e.remaining_secs > 0.0));
        assert_eq!(cache.clear(), 2);
        assert_eq!(cache.info().total_entries, 0);
    }
}
