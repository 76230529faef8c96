use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::warn;

pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace()
        .map(|w| w.replace('\u{FFFD}', ""))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Like [`element_text`] but with a space between text nodes, so labels in
/// sibling elements do not run together.
pub fn spaced_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    word_regex(needle).is_some_and(|re| re.is_match(haystack))
}

pub fn word_regex(keyword: &str) -> Option<Regex> {
    Regex::new(&format!(r"\b{}\b", regex::escape(keyword))).ok()
}

#[derive(Debug, Clone)]
pub struct SelectorList {
    compiled: Vec<Selector>,
}

impl SelectorList {
    pub fn new(sources: &[&str]) -> Self {
        let compiled = sources
            .iter()
            .filter_map(|src| match Selector::parse(src) {
                Ok(sel) => Some(sel),
                Err(e) => {
                    warn!(selector = %src, error = %e, "invalid selector, skipping");
                    None
                }
            })
            .collect();
        Self { compiled }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.compiled.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}
