//! Source sites. Each site is a [`SiteAdapter`]; the aggregator only ever
//! sees the trait, so adding a site means adding a module and a
//! [`SiteKind`] variant.

pub mod andes;
pub mod csp_conlutas;

use crate::error::{Error, Result};
use crate::extract::metadata::{self, MAX_ANCESTOR_LEVELS};
use crate::extract::text::{element_text, spaced_text};
use crate::extract::title::{self, TitleStrategy};
use crate::news::{AnchorContext, Candidate};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use url::Url;

pub use andes::AndesAdapter;
pub use csp_conlutas::CspConlutasAdapter;

static ANCHOR: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("a[href]").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SiteKind {
    Andes,
    CspConlutas,
}

impl std::fmt::Display for SiteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Andes => write!(f, "andes"),
            Self::CspConlutas => write!(f, "csp-conlutas"),
        }
    }
}

impl SiteKind {
    pub fn build(self, base_url: Option<&str>) -> Result<Arc<dyn SiteAdapter>> {
        Ok(match self {
            Self::Andes => Arc::new(AndesAdapter::new(base_url.unwrap_or(andes::BASE_URL))?),
            Self::CspConlutas => Arc::new(CspConlutasAdapter::new(
                base_url.unwrap_or(csp_conlutas::BASE_URL),
            )?),
        })
    }
}

pub(crate) fn parse_base(base_url: &str) -> Result<Url> {
    Url::parse(base_url).map_err(|e| Error::parse(format!("invalid base URL {base_url}: {e}")))
}

pub trait SiteAdapter: Send + Sync {
    fn kind(&self) -> SiteKind;

    fn name(&self) -> &str;

    fn base_url(&self) -> &Url;

    /// Listing page `page` (0-based); page 0 is the bare listing URL.
    fn page_url(&self, page: usize) -> String;

    fn root_url(&self) -> String {
        self.base_url().to_string()
    }

    fn request_headers(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    fn is_news_link(&self, href: &str) -> bool;

    /// Matching anchors in document order, with their surrounding text
    /// captured. Duplicates are left for the caller to drop.
    fn discover_links(&self, doc: &Html) -> Vec<Candidate> {
        let Some(sel) = ANCHOR.as_ref() else {
            return Vec::new();
        };
        doc.select(sel)
            .filter_map(|a| {
                let href = a.value().attr("href")?.trim();
                self.is_news_link(href).then(|| Candidate {
                    href: href.to_string(),
                    context: anchor_context(a),
                })
            })
            .collect()
    }

    fn categories(&self) -> &'static [&'static str] {
        &[]
    }

    fn default_category(&self) -> &str;

    fn reads_page_heading(&self) -> bool {
        false
    }

    fn page_heading(&self, _doc: &Html) -> Option<String> {
        None
    }

    fn title_strategies(&self) -> &'static [TitleStrategy];

    fn title(&self, candidate: &Candidate, page_heading: Option<String>) -> Option<String> {
        title::resolve(
            candidate,
            page_heading,
            self.title_strategies(),
            self.categories(),
        )
    }

    fn category_and_date(&self, candidate: &Candidate, today: NaiveDate) -> (String, String) {
        metadata::category_and_date(candidate, self.categories(), self.default_category(), today)
    }

    fn summary(&self, doc: &Html) -> Option<String>;

    /// Image URLs to probe, best first, already normalized.
    fn image_candidates(&self, doc: &Html) -> Vec<String>;

    fn absolute_link(&self, href: &str) -> String {
        self.base_url()
            .join(href)
            .map(String::from)
            .unwrap_or_else(|_| href.to_string())
    }
}

fn anchor_context(anchor: ElementRef<'_>) -> AnchorContext {
    AnchorContext {
        text: element_text(anchor),
        title_attr: anchor.value().attr("title").map(str::to_string),
        ancestor_texts: anchor
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take(MAX_ANCESTOR_LEVELS)
            .map(spaced_text)
            .collect(),
    }
}
