use super::text::SelectorList;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

const VALID_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp", ".gif"];
const BLACKLISTED_TERMS: &[&str] = &["icon", "logo", "avatar", "sprite"];
const ICON_SIZES: &[&str] = &["16x16", "24x24", "32x32"];

static ANY_IMG: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("img").ok());

pub fn is_valid_image_name(src: &str) -> bool {
    let lower = src.to_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    VALID_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        && !path.ends_with(".svg")
        && !BLACKLISTED_TERMS.iter().any(|t| lower.contains(t))
        && !ICON_SIZES.iter().any(|s| lower.contains(s))
}

pub fn normalize_image_url(src: &str, base_url: &str) -> String {
    let src = src.trim();
    let base = base_url.trim_end_matches('/');
    if let Some(rest) = src.strip_prefix("//") {
        format!("https://{rest}")
    } else if src.starts_with('/') {
        format!("{base}{src}")
    } else if let Some(rest) = src.strip_prefix("http://") {
        format!("https://{rest}")
    } else if src.starts_with("https://") {
        src.to_string()
    } else {
        format!("{base}/{src}")
    }
}

#[derive(Debug, Clone)]
pub struct ImageRules {
    pub content: SelectorList,
    /// Tier 2: image fields; only the first match per selector is tried.
    pub fields: SelectorList,
    pub content_excluded_parents: &'static [&'static str],
    pub page_excluded_parents: &'static [&'static str],
    pub excluded_alt_terms: &'static [&'static str],
}

fn parent_classes(img: ElementRef<'_>) -> String {
    img.parent()
        .and_then(ElementRef::wrap)
        .map(|p| p.value().classes().collect::<Vec<_>>().join(" ").to_lowercase())
        .unwrap_or_default()
}

fn is_excluded(img: ElementRef<'_>, parents: &[&str], alt_terms: &[&str]) -> bool {
    let classes = parent_classes(img);
    let alt = img.value().attr("alt").unwrap_or_default().to_lowercase();
    parents.iter().any(|c| classes.contains(c)) || alt_terms.iter().any(|t| alt.contains(t))
}

fn valid_src(img: ElementRef<'_>) -> Option<&str> {
    img.value()
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty() && is_valid_image_name(src))
}

/// Candidate image URLs in the order they should be probed: content images,
/// then image fields, then every other image on the page. Each URL is
/// already validated by name and normalized; duplicates are dropped.
pub fn candidates(doc: &Html, rules: &ImageRules, base_url: &str) -> Vec<String> {
    let mut srcs: Vec<&str> = Vec::new();

    for sel in rules.content.iter() {
        srcs.extend(
            doc.select(sel)
                .filter(|img| {
                    !is_excluded(*img, rules.content_excluded_parents, rules.excluded_alt_terms)
                })
                .filter_map(valid_src),
        );
    }

    for sel in rules.fields.iter() {
        srcs.extend(doc.select(sel).next().and_then(valid_src));
    }

    if let Some(any) = ANY_IMG.as_ref() {
        srcs.extend(
            doc.select(any)
                .filter(|img| {
                    !is_excluded(*img, rules.page_excluded_parents, rules.excluded_alt_terms)
                })
                .filter_map(valid_src),
        );
    }

    dedup_normalized(srcs, base_url)
}

pub fn dedup_normalized<'a>(srcs: impl IntoIterator<Item = &'a str>, base_url: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for src in srcs {
        let url = normalize_image_url(src, base_url);
        if !out.contains(&url) {
            out.push(url);
        }
    }
    out
}
