use super::{SiteAdapter, SiteKind, parse_base};
use crate::error::Result;
use crate::extract::image::{self, ImageRules};
use crate::extract::summary::{self, MIN_PARAGRAPH_CHARS, SummaryRules};
use crate::extract::text::SelectorList;
use crate::extract::title::{self, TitleStrategy};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

pub const BASE_URL: &str = "https://cspconlutas.org.br";
const LISTING_PATH: &str = "/noticias";
const CATEGORY: &str = "CSP-Conlutas";
/// Listing thumbnails, which the site also reuses as article artwork.
const THUMB_PATH: &str = "/arquivo/thumb/noticias/";

static NEWS_LINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"/noticias/n/\d+/").ok());
static ANY_IMG: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("img").ok());

const HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    ),
    ("Accept-Language", "pt-BR,pt;q=0.9,en;q=0.8"),
];

const TITLE_CHAIN: &[TitleStrategy] = &[
    title::from_anchor_text,
    title::from_title_attr,
    title::from_url_slug,
];

const SUMMARY_CONTAINERS: &[&str] = &[
    "div.content",
    "div.article-content",
    "main p",
    "article p",
    ".post-content p",
    ".news-content p",
];

const CONTENT_IMAGES: &[&str] = &[
    "main img",
    "article img",
    ".content img",
    ".post-content img",
    ".news-content img",
];
const EXCLUDED_PARENTS: &[&str] = &["navigation", "nav", "sidebar", "footer", "header"];

pub struct CspConlutasAdapter {
    base: Url,
    listing: String,
    summary_rules: SummaryRules,
    image_rules: ImageRules,
}

impl CspConlutasAdapter {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = parse_base(base_url)?;
        let listing = format!("{}{LISTING_PATH}", base.as_str().trim_end_matches('/'));
        Ok(Self {
            base,
            listing,
            summary_rules: SummaryRules {
                containers: SelectorList::new(SUMMARY_CONTAINERS),
                min_container_chars: MIN_PARAGRAPH_CHARS,
                boilerplate_prefixes: &["Rua Senador", "Telefone:", "©", "Facebook", "Twitter"],
                boilerplate_fragments: &["cookie"],
            },
            image_rules: ImageRules {
                content: SelectorList::new(CONTENT_IMAGES),
                fields: SelectorList::new(&[]),
                content_excluded_parents: EXCLUDED_PARENTS,
                page_excluded_parents: EXCLUDED_PARENTS,
                excluded_alt_terms: &["facebook", "twitter", "whatsapp", "youtube"],
            },
        })
    }

    fn thumbnails<'a>(&self, doc: &'a Html) -> Vec<&'a str> {
        let Some(sel) = ANY_IMG.as_ref() else {
            return Vec::new();
        };
        doc.select(sel)
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| src.contains(THUMB_PATH))
            .collect()
    }
}

impl SiteAdapter for CspConlutasAdapter {
    fn kind(&self) -> SiteKind {
        SiteKind::CspConlutas
    }

    fn name(&self) -> &str {
        "CSP-Conlutas"
    }

    fn base_url(&self) -> &Url {
        &self.base
    }

    fn page_url(&self, page: usize) -> String {
        if page == 0 {
            self.listing.clone()
        } else {
            format!("{}?p={page}", self.listing)
        }
    }

    fn request_headers(&self) -> &'static [(&'static str, &'static str)] {
        HEADERS
    }

    fn is_news_link(&self, href: &str) -> bool {
        NEWS_LINK.as_ref().is_some_and(|re| re.is_match(href))
    }

    fn default_category(&self) -> &str {
        CATEGORY
    }

    fn title_strategies(&self) -> &'static [TitleStrategy] {
        TITLE_CHAIN
    }

    fn summary(&self, doc: &Html) -> Option<String> {
        summary::extract(doc, &self.summary_rules)
    }

    /// Site thumbnails first (trusted without a name check), then the
    /// generic content and page tiers.
    fn image_candidates(&self, doc: &Html) -> Vec<String> {
        let base = self.base.as_str();
        let mut urls = image::dedup_normalized(self.thumbnails(doc), base);
        for url in image::candidates(doc, &self.image_rules, base) {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    }
}
