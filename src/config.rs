use crate::error::{Error, Result};
use crate::sites::SiteKind;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default = "default_sites")]
    pub sites: Vec<SiteConfig>,
}

/// Outbound request settings shared by every site.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_listing_timeout")]
    pub listing_timeout_secs: u64,
    #[serde(default = "default_detail_timeout")]
    pub detail_timeout_secs: u64,
    /// Timeout for the detail fetch made while resolving a title.
    #[serde(default = "default_title_timeout")]
    pub title_timeout_secs: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    /// Extra attempts for image probes only. Page fetches always run once.
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_per_site_floor")]
    pub per_site_floor: usize,
    /// Courtesy pause between sites and between detail-page fetches.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_primary_site")]
    pub primary_site: SiteKind,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub supplement_from_root: bool,
    #[serde(default = "default_items")]
    pub default_items: usize,
    #[serde(default = "default_max_items_limit")]
    pub max_items_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_max_size")]
    pub max_size: usize,
    #[serde(default)]
    pub single_flight: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub default_include: Vec<String>,
    #[serde(default)]
    pub default_exclude: Vec<String>,
    #[serde(default)]
    pub apply_by_default: bool,
    #[serde(default = "default_true")]
    pub allow_external_keywords: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub kind: SiteKind,
    pub base_url: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            aggregator: AggregatorConfig::default(),
            cache: CacheConfig::default(),
            filter: FilterConfig::default(),
            sites: default_sites(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            listing_timeout_secs: default_listing_timeout(),
            detail_timeout_secs: default_detail_timeout(),
            title_timeout_secs: default_title_timeout(),
            probe_timeout_secs: default_probe_timeout(),
            max_retries: 0,
            retry_base_delay_ms: default_retry_base_delay(),
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            per_site_floor: default_per_site_floor(),
            delay_ms: default_delay_ms(),
            primary_site: default_primary_site(),
            request_timeout_secs: default_request_timeout(),
            supplement_from_root: true,
            default_items: default_items(),
            max_items_limit: default_max_items_limit(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            max_size: default_cache_max_size(),
            single_flight: false,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_include: Vec::new(),
            default_exclude: Vec::new(),
            apply_by_default: false,
            allow_external_keywords: true,
        }
    }
}

// Defaults
fn default_user_agent() -> String {
    std::env::var("ANDES_NEWS_USER_AGENT").unwrap_or_else(|_| {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
    })
}
fn default_listing_timeout() -> u64 {
    15
}
fn default_detail_timeout() -> u64 {
    15
}
fn default_title_timeout() -> u64 {
    10
}
fn default_probe_timeout() -> u64 {
    5
}
fn default_retry_base_delay() -> u64 {
    500
}
fn default_max_pages() -> usize {
    10
}
fn default_per_site_floor() -> usize {
    5
}
fn default_delay_ms() -> u64 {
    1000
}
fn default_primary_site() -> SiteKind {
    SiteKind::Andes
}
fn default_request_timeout() -> u64 {
    180
}
fn default_items() -> usize {
    5
}
fn default_max_items_limit() -> usize {
    20
}
fn default_cache_ttl() -> u64 {
    900
}
fn default_cache_max_size() -> usize {
    50
}
fn default_true() -> bool {
    true
}
fn default_sites() -> Vec<SiteConfig> {
    vec![
        SiteConfig {
            kind: SiteKind::Andes,
            base_url: None,
            enabled: true,
        },
        SiteConfig {
            kind: SiteKind::CspConlutas,
            base_url: None,
            enabled: true,
        },
    ]
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse config: {e}")))
    }

    pub fn enabled_sites(&self) -> impl Iterator<Item = &SiteConfig> {
        self.sites.iter().filter(|s| s.enabled)
    }

    pub fn validate(&self) -> Result<()> {
        if self.enabled_sites().next().is_none() {
            return Err(Error::config("no enabled sites in [[sites]]"));
        }
        if !self.sites.iter().any(|s| s.kind == self.aggregator.primary_site) {
            return Err(Error::config(format!(
                "primary_site '{}' is not listed in [[sites]]",
                self.aggregator.primary_site
            )));
        }
        if self.aggregator.max_items_limit == 0 {
            return Err(Error::config("aggregator.max_items_limit must be at least 1"));
        }
        if self.cache.max_size == 0 {
            return Err(Error::config("cache.max_size must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let toml = r#"
[http]
user_agent = "test-agent"
listing_timeout_secs = 3
max_retries = 2

[aggregator]
max_pages = 4
delay_ms = 0
primary_site = "csp-conlutas"

[cache]
ttl_secs = 60
max_size = 5
single_flight = true

[filter]
default_include = ["greve"]
apply_by_default = true

[[sites]]
kind = "csp-conlutas"
base_url = "http://localhost:9999"

[[sites]]
kind = "andes"
enabled = false
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.http.user_agent, "test-agent");
        assert_eq!(config.http.max_retries, 2);
        assert_eq!(config.http.probe_timeout_secs, 5);
        assert_eq!(config.aggregator.max_pages, 4);
        assert_eq!(config.aggregator.primary_site, SiteKind::CspConlutas);
        assert!(config.cache.single_flight);
        assert_eq!(config.filter.default_include, vec!["greve".to_string()]);
        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.enabled_sites().count(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.aggregator.max_pages, 10);
        assert_eq!(config.aggregator.per_site_floor, 5);
        assert_eq!(config.aggregator.primary_site, SiteKind::Andes);
        assert_eq!(config.cache.ttl_secs, 900);
        assert_eq!(config.cache.max_size, 50);
        assert!(!config.cache.single_flight);
        assert!(config.filter.allow_external_keywords);
        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.sites[0].kind, SiteKind::Andes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_all_sites_disabled() {
        let mut config = Config::default();
        for site in &mut config.sites {
            site.enabled = false;
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unlisted_primary() {
        let toml = r#"
[aggregator]
primary_site = "andes"

[[sites]]
kind = "csp-conlutas"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_site_kind_is_a_parse_error() {
        let toml = r#"
[[sites]]
kind = "folha"
"#;
        assert!(Config::from_toml(toml).is_err());
    }
}
