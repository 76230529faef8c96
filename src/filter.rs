//! Keyword include/exclude filtering over titles and summaries.

use crate::config::FilterConfig;
use crate::extract::text::word_regex;
use crate::news::NewsItem;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Effective filter for one request. Keyword sets are ordered, so equal
/// specs serialize identically no matter how the keywords were supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    pub include: BTreeSet<String>,
    pub exclude: BTreeSet<String>,
    pub title_only: bool,
    pub case_sensitive: bool,
}

/// Splits a free-form keyword string on commas and whitespace.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_set<I, S>(keywords: I, case_sensitive: bool) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_string())
        .filter(|k| !k.is_empty())
        .map(|k| if case_sensitive { k } else { k.to_lowercase() })
        .collect()
}

struct Matcher {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl FilterSpec {
    pub fn from_lists<I, E, S, T>(
        include: I,
        exclude: E,
        title_only: bool,
        case_sensitive: bool,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            include: normalize_set(include, case_sensitive),
            exclude: normalize_set(exclude, case_sensitive),
            title_only,
            case_sensitive,
        }
    }

    /// No keywords at all: the filter keeps everything.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    fn matcher(&self) -> Matcher {
        let compile = |set: &BTreeSet<String>| -> Vec<Regex> {
            set.iter()
                .map(|k| self.fold(k))
                .filter_map(|k| word_regex(&k))
                .collect()
        };
        Matcher {
            include: compile(&self.include),
            exclude: compile(&self.exclude),
        }
    }

    fn fold(&self, text: &str) -> String {
        if self.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        }
    }

    fn search_text(&self, item: &NewsItem) -> String {
        let text = if self.title_only {
            item.title.clone()
        } else {
            format!("{} {}", item.title, item.summary)
        };
        self.fold(text.trim())
    }

    fn keeps(&self, matcher: &Matcher, item: &NewsItem) -> bool {
        let text = self.search_text(item);
        if matcher.exclude.iter().any(|re| re.is_match(&text)) {
            return false;
        }
        matcher.include.is_empty() || matcher.include.iter().any(|re| re.is_match(&text))
    }

    /// Whether a single item survives the filter.
    pub fn matches(&self, item: &NewsItem) -> bool {
        self.keeps(&self.matcher(), item)
    }

    /// The items to keep, in their original order. Numbers are left
    /// untouched; callers renumber.
    pub fn apply(&self, items: Vec<NewsItem>) -> Vec<NewsItem> {
        if self.is_empty() {
            return items;
        }
        let matcher = self.matcher();
        let before = items.len();
        let kept: Vec<NewsItem> = items
            .into_iter()
            .filter(|item| self.keeps(&matcher, item))
            .collect();
        info!(
            kept = kept.len(),
            total = before,
            include = ?self.include,
            exclude = ?self.exclude,
            "filter applied"
        );
        kept
    }
}

/// Caller-supplied filter parameters, before defaults are considered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub title_only: bool,
    pub case_sensitive: bool,
    /// `None` defers to `[filter] apply_by_default`.
    pub use_defaults: Option<bool>,
}

/// Effective keywords for a request, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub title_only: bool,
    pub case_sensitive: bool,
    pub defaults_applied: bool,
    /// Caller keywords are ignored; only configured defaults apply.
    pub locked: bool,
}

/// Decides which keywords a request actually filters with.
#[derive(Debug, Clone)]
pub struct KeywordPolicy {
    default_include: Vec<String>,
    default_exclude: Vec<String>,
    apply_by_default: bool,
    allow_external: bool,
}

impl From<&FilterConfig> for KeywordPolicy {
    fn from(config: &FilterConfig) -> Self {
        Self {
            default_include: config.default_include.clone(),
            default_exclude: config.default_exclude.clone(),
            apply_by_default: config.apply_by_default,
            allow_external: config.allow_external_keywords,
        }
    }
}

impl KeywordPolicy {
    pub fn summary(&self, request: &FilterRequest) -> FilterSummary {
        let clean = |list: &[String]| -> Vec<String> {
            list.iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect()
        };

        if !self.allow_external {
            return FilterSummary {
                include: clean(&self.default_include),
                exclude: clean(&self.default_exclude),
                title_only: request.title_only,
                case_sensitive: request.case_sensitive,
                defaults_applied: true,
                locked: true,
            };
        }

        let use_defaults = request.use_defaults.unwrap_or(self.apply_by_default);
        let mut include = clean(&request.include);
        let mut exclude = clean(&request.exclude);
        let mut defaults_applied = false;
        if use_defaults && include.is_empty() && !self.default_include.is_empty() {
            include = clean(&self.default_include);
            defaults_applied = true;
        }
        if use_defaults && exclude.is_empty() && !self.default_exclude.is_empty() {
            exclude = clean(&self.default_exclude);
            defaults_applied = true;
        }

        FilterSummary {
            include,
            exclude,
            title_only: request.title_only,
            case_sensitive: request.case_sensitive,
            defaults_applied,
            locked: false,
        }
    }

    pub fn resolve(&self, request: &FilterRequest) -> FilterSpec {
        let summary = self.summary(request);
        FilterSpec::from_lists(
            summary.include,
            summary.exclude,
            summary.title_only,
            summary.case_sensitive,
        )
    }
}
