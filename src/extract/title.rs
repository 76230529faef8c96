use super::dates::{strip_leading_date, strip_trailing_date};
use super::text::{SelectorList, clean_text, contains_word, element_text};
use crate::news::Candidate;
use scraper::Html;

pub type TitleStrategy = fn(&Candidate) -> Option<String>;

pub const MIN_ANCHOR_TITLE_LEN: usize = 10;
pub const MIN_TITLE_LEN: usize = 3;

pub fn from_anchor_text(candidate: &Candidate) -> Option<String> {
    let text = clean_text(&candidate.context.text);
    (text.chars().count() >= MIN_ANCHOR_TITLE_LEN).then_some(text)
}

pub fn from_parent_text(candidate: &Candidate) -> Option<String> {
    candidate
        .context
        .parent_text()
        .map(clean_text)
        .filter(|t| !t.is_empty())
}

pub fn from_title_attr(candidate: &Candidate) -> Option<String> {
    candidate
        .context
        .title_attr
        .as_deref()
        .map(clean_text)
        .filter(|t| !t.is_empty())
}

/// Human-readable title from the trailing path segment, e.g.
/// `/conteudos/noticia/docentes-aprovam-greve` -> `Docentes Aprovam Greve`.
pub fn from_url_slug(candidate: &Candidate) -> Option<String> {
    let path = candidate.href.split(['?', '#']).next()?;
    let slug = path.rsplit('/').find(|s| !s.is_empty())?;
    if !slug.chars().any(char::is_alphabetic) {
        return None;
    }
    let words: Vec<String> = slug
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect();
    Some(words.join(" ")).filter(|t| !t.is_empty())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn tidy(raw: &str, categories: &[&str]) -> String {
    let mut title = strip_leading_date(&clean_text(raw));
    let rest = categories.iter().find_map(|cat| {
        title
            .strip_prefix(*cat)
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    });
    if let Some(rest) = rest {
        title = rest.trim().to_string();
    }
    strip_trailing_date(&title)
}

/// Runs the chain: the detail-page heading (when the adapter fetched one)
/// first, then each strategy in order. The first result that survives
/// [`tidy`] with at least [`MIN_TITLE_LEN`] characters wins.
pub fn resolve(
    candidate: &Candidate,
    page_heading: Option<String>,
    strategies: &[TitleStrategy],
    categories: &[&str],
) -> Option<String> {
    page_heading
        .into_iter()
        .chain(strategies.iter().filter_map(|s| s(candidate)))
        .map(|raw| tidy(&raw, categories))
        .find(|t| t.chars().count() >= MIN_TITLE_LEN)
}

pub fn heading_from_page(
    doc: &Html,
    selectors: &SelectorList,
    generic_markers: &[&str],
) -> Option<String> {
    selectors.iter().find_map(|sel| {
        let element = doc.select(sel).next()?;
        let heading = strip_trailing_date(&strip_leading_date(&element_text(element)));
        let upper = heading.to_uppercase();
        let generic = generic_markers
            .iter()
            .any(|m| contains_word(&upper, &m.to_uppercase()));
        (heading.chars().count() > MIN_ANCHOR_TITLE_LEN && !generic).then_some(heading)
    })
}
