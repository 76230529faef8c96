//! Paginated link discovery over a site's listing pages.

use crate::http::HttpClient;
use crate::news::Candidate;
use crate::sites::SiteAdapter;
use scraper::Html;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Insertion-ordered candidates, unique by normalized href.
#[derive(Debug, Default)]
pub struct CandidateSet {
    items: Vec<Candidate>,
    seen: HashSet<String>,
}

/// Dedup key: trimmed, without fragment or trailing slash.
pub fn normalize_href(href: &str) -> String {
    let href = href.trim();
    let href = href.split('#').next().unwrap_or(href);
    href.trim_end_matches('/').to_string()
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an equivalent href is already present.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        let key = normalize_href(&candidate.href);
        self.insert_keyed(key, candidate)
    }

    fn insert_keyed(&mut self, key: String, candidate: Candidate) -> bool {
        if !self.seen.insert(key) {
            return false;
        }
        self.items.push(candidate);
        true
    }

    /// Inserts each candidate, returning how many were new.
    pub fn extend(&mut self, candidates: impl IntoIterator<Item = Candidate>) -> usize {
        self.extend_by(candidates, str::to_string)
    }

    /// Like [`extend`](Self::extend), but two hrefs are duplicates when
    /// `resolve` maps them to the same normalized string.
    pub fn extend_by<F>(&mut self, candidates: impl IntoIterator<Item = Candidate>, resolve: F) -> usize
    where
        F: Fn(&str) -> String,
    {
        candidates
            .into_iter()
            .filter(|c| !c.href.trim().is_empty())
            .map(|c| {
                let key = normalize_href(&resolve(c.href.trim()));
                self.insert_keyed(key, c)
            })
            .filter(|added| *added)
            .count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.items
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Items the caller wants; discovery aims for twice as many.
    pub target: usize,
    pub max_pages: usize,
    pub supplement_from_root: bool,
    pub timeout: Duration,
}

async fn fetch_links(
    http: &HttpClient,
    adapter: &dyn SiteAdapter,
    url: &str,
    timeout: Duration,
) -> crate::error::Result<Vec<Candidate>> {
    let body = http
        .get_page(url, timeout, adapter.request_headers())
        .await?;
    let doc = Html::parse_document(&body);
    Ok(adapter.discover_links(&doc))
}

/// Walks listing pages 0, 1, ... collecting candidates, unique by absolute
/// link, until there are `2 * target`, a page adds nothing new, or
/// `max_pages` is reached. A failed page ends pagination but keeps what was
/// already found.
pub async fn discover(
    http: &HttpClient,
    adapter: &dyn SiteAdapter,
    opts: &DiscoveryOptions,
) -> CandidateSet {
    let wanted = opts.target.saturating_mul(2);
    let mut set = CandidateSet::new();

    for page in 0..opts.max_pages {
        if set.len() >= wanted {
            break;
        }
        let url = adapter.page_url(page);
        let found = match fetch_links(http, adapter, &url, opts.timeout).await {
            Ok(found) => found,
            Err(e) => {
                warn!(site = adapter.name(), page, url = %url, error = %e, "listing page failed, keeping partial results");
                break;
            }
        };
        let added = set.extend_by(found, |href| adapter.absolute_link(href));
        info!(site = adapter.name(), page, new_links = added, total = set.len(), "listing page scanned");
        if added == 0 {
            break;
        }
    }

    if opts.supplement_from_root && set.len() < opts.target {
        let root = adapter.root_url();
        match fetch_links(http, adapter, &root, opts.timeout).await {
            Ok(found) => {
                let added = set.extend_by(found, |href| adapter.absolute_link(href));
                info!(site = adapter.name(), new_links = added, total = set.len(), "supplemented from root page");
            }
            Err(e) => debug!(site = adapter.name(), error = %e, "root page supplement failed"),
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::AnchorContext;

    fn candidate(href: &str) -> Candidate {
        Candidate {
            href: href.into(),
            context: AnchorContext::default(),
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let mut set = CandidateSet::new();
        let added = set.extend([
            candidate("/n/1"),
            candidate("/n/2"),
            candidate("/n/1#comentarios"),
            candidate(" /n/2/ "),
            candidate("/n/3"),
            candidate(""),
        ]);
        assert_eq!(added, 3);
        let hrefs: Vec<_> = set.iter().map(|c| c.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/n/1", "/n/2", "/n/3"]);
    }

    #[test]
    fn resolved_duplicates_are_dropped() {
        let mut set = CandidateSet::new();
        let resolve = |href: &str| {
            if href.starts_with('/') {
                format!("https://andes.org.br{href}")
            } else {
                href.to_string()
            }
        };
        let added = set.extend_by(
            [
                candidate("/conteudos/noticia/ato"),
                candidate("https://andes.org.br/conteudos/noticia/ato/"),
            ],
            resolve,
        );
        assert_eq!(added, 1);
        assert_eq!(set.iter().next().map(|c| c.href.as_str()), Some("/conteudos/noticia/ato"));
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_href(" /a/b/#x "), "/a/b");
        assert_eq!(normalize_href("/a/b?page=1"), "/a/b?page=1");
    }
}
