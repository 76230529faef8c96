use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const SUMMARY_UNAVAILABLE: &str = "Resumo não disponível";
pub const IMAGE_UNAVAILABLE: &str = "Imagem não disponível";
pub const SUMMARY_ERROR_PREFIX: &str = "Erro ao extrair resumo";

/// DOM context captured around a listing anchor at discovery time.
///
/// The parsed document cannot outlive the discovery pass, so everything the
/// metadata chains need is copied out here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorContext {
    pub text: String,
    pub title_attr: Option<String>,
    /// Text of each ancestor element, nearest first (`[0]` is the parent).
    pub ancestor_texts: Vec<String>,
}

impl AnchorContext {
    pub fn parent_text(&self) -> Option<&str> {
        self.ancestor_texts.first().map(String::as_str)
    }
}

/// An unresolved listing link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub href: String,
    pub context: AnchorContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItemMeta {
    pub href: String,
    pub absolute_link: String,
    pub title: String,
    pub category: String,
    pub date_text: String,
    pub sortable_date: NaiveDate,
    pub site_name: String,
}

/// Caller-facing news record. `number` is the 1-based rank after the final
/// truncation and is not stable across different requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub number: usize,
    pub title: String,
    pub summary: String,
    pub image_url: String,
    pub link: String,
    pub category: String,
    pub date_text: String,
}

/// A fully extracted item before global ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedItem {
    pub item: NewsItem,
    pub sortable_date: NaiveDate,
    pub site_name: String,
}

/// Summary text and image URL of a detail page, sentinels included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailContent {
    pub summary: String,
    pub image_url: String,
}

impl DetailContent {
    pub fn unavailable() -> Self {
        Self {
            summary: SUMMARY_UNAVAILABLE.to_string(),
            image_url: IMAGE_UNAVAILABLE.to_string(),
        }
    }

    pub fn fetch_error(error: impl std::fmt::Display) -> Self {
        Self {
            summary: format!("{SUMMARY_ERROR_PREFIX}: {error}"),
            image_url: IMAGE_UNAVAILABLE.to_string(),
        }
    }
}

impl RankedItem {
    pub fn from_parts(meta: NewsItemMeta, content: DetailContent) -> Self {
        Self {
            item: NewsItem {
                number: 0,
                title: meta.title,
                summary: content.summary,
                image_url: content.image_url,
                link: meta.absolute_link,
                category: meta.category,
                date_text: meta.date_text,
            },
            sortable_date: meta.sortable_date,
            site_name: meta.site_name,
        }
    }
}

/// Assigns dense 1-based numbers in list order.
pub fn renumber(items: Vec<NewsItem>) -> Vec<NewsItem> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| NewsItem {
            number: i + 1,
            ..item
        })
        .collect()
}
