use crate::config::{AggregatorConfig, Config};
use crate::discovery::{self, DiscoveryOptions};
use crate::error::{Error, Result};
use crate::extract::{extract_content, extract_meta};
use crate::http::{HttpClient, Timeouts};
use crate::news::{NewsItem, RankedItem, renumber};
use crate::sites::{SiteAdapter, SiteKind};
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// A configured source site.
#[derive(Clone)]
pub struct SiteEntry {
    pub name: String,
    pub adapter: Arc<dyn SiteAdapter>,
}

impl SiteEntry {
    pub fn new(adapter: Arc<dyn SiteAdapter>) -> Self {
        Self {
            name: adapter.name().to_string(),
            adapter,
        }
    }
}

/// Runs every site sequentially and merges their items by date.
pub struct Aggregator {
    http: HttpClient,
    sites: Vec<SiteEntry>,
    primary: SiteEntry,
    settings: AggregatorConfig,
    timeouts: Timeouts,
}

impl Aggregator {
    pub fn new(
        http: HttpClient,
        sites: Vec<SiteEntry>,
        primary: SiteEntry,
        settings: AggregatorConfig,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            http,
            sites,
            primary,
            settings,
            timeouts,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::new(&config.http)?;
        let sites = config
            .enabled_sites()
            .map(|s| Ok(SiteEntry::new(s.kind.build(s.base_url.as_deref())?)))
            .collect::<Result<Vec<_>>>()?;
        let primary_kind = config.aggregator.primary_site;
        let primary = match sites.iter().find(|s| s.adapter.kind() == primary_kind) {
            Some(entry) => entry.clone(),
            None => {
                let base_url = config
                    .sites
                    .iter()
                    .find(|s| s.kind == primary_kind)
                    .and_then(|s| s.base_url.as_deref());
                SiteEntry::new(primary_kind.build(base_url)?)
            }
        };
        Ok(Self::new(
            http,
            sites,
            primary,
            config.aggregator.clone(),
            Timeouts::from(&config.http),
        ))
    }

    /// Keeps only the listed kinds, in their configured order. Fails when
    /// none of them is an enabled site.
    pub fn restrict_to(&mut self, kinds: &[SiteKind]) -> Result<()> {
        if kinds.is_empty() {
            return Ok(());
        }
        self.sites.retain(|s| kinds.contains(&s.adapter.kind()));
        if self.sites.is_empty() {
            let requested = kinds
                .iter()
                .map(SiteKind::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Error::config(format!(
                "none of the requested sites ({requested}) is enabled"
            )));
        }
        Ok(())
    }

    pub fn sites(&self) -> &[SiteEntry] {
        &self.sites
    }

    /// Per-site item budget: an even share of `total`, never below the floor.
    pub fn quota(&self, total: usize) -> usize {
        let share = total / self.sites.len().max(1);
        share.max(self.settings.per_site_floor)
    }

    /// The newest `total` items across all sites, numbered 1..=k. Falls
    /// back to the primary site alone when every site comes back empty.
    pub async fn aggregate(&self, total: usize) -> Result<Vec<NewsItem>> {
        let quota = self.quota(total);
        info!(total, quota, sites = self.sites.len(), "aggregator: starting");

        let mut collected = Vec::new();
        for (i, site) in self.sites.iter().enumerate() {
            if i > 0 {
                self.pause().await;
            }
            let items = self.collect_site(site, quota).await;
            if items.is_empty() {
                warn!(site = %site.name, "site yielded no items");
            }
            collected.extend(items);
        }

        if collected.is_empty() {
            warn!(site = %self.primary.name, "all sites empty, retrying primary site alone");
            let quota = total.max(self.settings.per_site_floor);
            collected = self.collect_site(&self.primary, quota).await;
        }

        if collected.is_empty() {
            let sites = self
                .sites
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Error::NoItems { sites });
        }

        let ranked = rank(collected, total);
        info!(count = ranked.len(), "aggregator: done");
        Ok(ranked)
    }

    /// Discovery, metadata for every candidate, then full content for the
    /// newest `quota` of them.
    async fn collect_site(&self, site: &SiteEntry, quota: usize) -> Vec<RankedItem> {
        let adapter = site.adapter.as_ref();
        let opts = DiscoveryOptions {
            target: quota,
            max_pages: self.settings.max_pages,
            supplement_from_root: self.settings.supplement_from_root,
            timeout: self.timeouts.listing,
        };
        let candidates = discovery::discover(&self.http, adapter, &opts).await;
        info!(site = %site.name, candidates = candidates.len(), "links discovered");

        let today = Local::now().date_naive();
        let mut metas = Vec::with_capacity(candidates.len());
        for candidate in candidates.iter() {
            if let Some(meta) =
                extract_meta(&self.http, adapter, candidate, &self.timeouts, today).await
            {
                metas.push(meta);
            }
        }
        metas.sort_by(|a, b| b.sortable_date.cmp(&a.sortable_date));
        metas.truncate(quota);

        let count = metas.len();
        let mut items = Vec::with_capacity(count);
        for (i, meta) in metas.into_iter().enumerate() {
            let content =
                extract_content(&self.http, adapter, &meta.absolute_link, &self.timeouts).await;
            items.push(RankedItem::from_parts(meta, content));
            if i + 1 < count {
                self.pause().await;
            }
        }
        info!(site = %site.name, count = items.len(), "site collected");
        items
    }

    async fn pause(&self) {
        if self.settings.delay_ms > 0 {
            sleep(Duration::from_millis(self.settings.delay_ms)).await;
        }
    }
}

/// Newest first, truncated to `total`, renumbered. The sort is stable:
/// items with the same date keep their merge order (site order, then
/// per-site order).
pub fn rank(mut items: Vec<RankedItem>, total: usize) -> Vec<NewsItem> {
    items.sort_by(|a, b| b.sortable_date.cmp(&a.sortable_date));
    items.truncate(total);
    renumber(items.into_iter().map(|r| r.item).collect())
}
