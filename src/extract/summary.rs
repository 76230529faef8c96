use super::text::{SelectorList, clean_text, element_text, truncate_chars};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

pub const MAX_SUMMARY_CHARS: usize = 300;
/// Fallback paragraphs must be longer than this.
pub const MIN_PARAGRAPH_CHARS: usize = 50;

static PARAGRAPH: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("p").ok());

#[derive(Debug, Clone)]
pub struct SummaryRules {
    pub containers: SelectorList,
    /// Container paragraphs must be longer than this; `0` accepts any
    /// non-empty paragraph.
    pub min_container_chars: usize,
    pub boilerplate_prefixes: &'static [&'static str],
    pub boilerplate_fragments: &'static [&'static str],
}

impl SummaryRules {
    pub fn is_boilerplate(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.boilerplate_prefixes.iter().any(|p| text.starts_with(p))
            || self
                .boilerplate_fragments
                .iter()
                .any(|f| lower.contains(&f.to_lowercase()))
    }
}

pub type SummaryStrategy = fn(&Html, &SummaryRules) -> Option<String>;

fn first_paragraph(element: ElementRef<'_>) -> Option<String> {
    if element.value().name() == "p" {
        return Some(element_text(element));
    }
    let sel = PARAGRAPH.as_ref()?;
    element.select(sel).next().map(element_text)
}

pub fn from_content_container(doc: &Html, rules: &SummaryRules) -> Option<String> {
    rules.containers.iter().find_map(|sel| {
        doc.select(sel)
            .filter_map(first_paragraph)
            .find(|text| {
                !text.is_empty()
                    && text.chars().count() > rules.min_container_chars
                    && !rules.is_boilerplate(text)
            })
    })
}

pub fn from_substantial_paragraph(doc: &Html, rules: &SummaryRules) -> Option<String> {
    let sel = PARAGRAPH.as_ref()?;
    doc.select(sel)
        .map(element_text)
        .find(|text| text.chars().count() > MIN_PARAGRAPH_CHARS && !rules.is_boilerplate(text))
}

pub const SUMMARY_CHAIN: &[SummaryStrategy] = &[from_content_container, from_substantial_paragraph];

pub fn extract(doc: &Html, rules: &SummaryRules) -> Option<String> {
    SUMMARY_CHAIN
        .iter()
        .find_map(|strategy| strategy(doc, rules))
        .map(|text| truncate_chars(&clean_text(&text), MAX_SUMMARY_CHARS))
}
