use super::{SiteAdapter, SiteKind, parse_base};
use crate::error::Result;
use crate::extract::image::{self, ImageRules};
use crate::extract::summary::{self, SummaryRules};
use crate::extract::text::SelectorList;
use crate::extract::title::{self, TitleStrategy};
use scraper::Html;
use url::Url;

pub const BASE_URL: &str = "https://andes.org.br";
const LISTING_PATH: &str = "/sites/noticias";
const NEWS_PATH: &str = "/conteudos/noticia/";

const CATEGORIES: &[&str] = &["Nacional", "Internacional", "Outras lutas", "Eventos"];
const DEFAULT_CATEGORY: &str = "Sem categoria";

const HEADING_SELECTORS: &[&str] = &["h2", "h1", ".title", ".headline", "title"];
/// Headings naming the union itself rather than the article.
const GENERIC_HEADINGS: &[&str] = &[
    "SINDICATO NACIONAL DOS DOCENTES",
    "ANDES",
    "ASSOCIAÇÃO NACIONAL DOS DOCENTES",
];

const TITLE_CHAIN: &[TitleStrategy] = &[
    title::from_anchor_text,
    title::from_parent_text,
    title::from_title_attr,
    title::from_url_slug,
];

const SUMMARY_CONTAINERS: &[&str] = &[
    "div.field-type-text-with-summary",
    "div.content",
    "div.article-content",
    "div.news-content",
    "div.field-name-body",
    "div.field-item",
];

const CONTENT_IMAGES: &[&str] = &[
    "div.field-name-body img",
    "div.field-type-text-with-summary img",
    "article.node-noticia img",
    "div.content img",
    "div.text-content img",
    "div.node-content img",
    "main img",
];
const FIELD_IMAGES: &[&str] = &[
    "img.field-content",
    "div.field-name-field-imagem img",
    "div.field-type-image img",
    "div.image img",
];

pub struct AndesAdapter {
    base: Url,
    listing: String,
    headings: SelectorList,
    summary_rules: SummaryRules,
    image_rules: ImageRules,
}

impl AndesAdapter {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = parse_base(base_url)?;
        let listing = format!("{}{LISTING_PATH}", base.as_str().trim_end_matches('/'));
        Ok(Self {
            base,
            listing,
            headings: SelectorList::new(HEADING_SELECTORS),
            summary_rules: SummaryRules {
                containers: SelectorList::new(SUMMARY_CONTAINERS),
                min_container_chars: 0,
                boilerplate_prefixes: &["O nosso site", "Utilizamos cookies", "Home", "A Entidade"],
                boilerplate_fragments: &["cookies"],
            },
            image_rules: ImageRules {
                content: SelectorList::new(CONTENT_IMAGES),
                fields: SelectorList::new(FIELD_IMAGES),
                content_excluded_parents: &[
                    "img-capa-interna",
                    "sidebar",
                    "related",
                    "thumb",
                    "miniatura",
                ],
                page_excluded_parents: &[
                    "img-capa-interna",
                    "sidebar",
                    "related",
                    "thumb",
                    "miniatura",
                    "navbar",
                ],
                excluded_alt_terms: &[],
            },
        })
    }
}

impl SiteAdapter for AndesAdapter {
    fn kind(&self) -> SiteKind {
        SiteKind::Andes
    }

    fn name(&self) -> &str {
        "ANDES"
    }

    fn base_url(&self) -> &Url {
        &self.base
    }

    fn page_url(&self, page: usize) -> String {
        if page == 0 {
            self.listing.clone()
        } else {
            format!("{}?page={page}", self.listing)
        }
    }

    fn is_news_link(&self, href: &str) -> bool {
        href.contains(NEWS_PATH)
    }

    fn categories(&self) -> &'static [&'static str] {
        CATEGORIES
    }

    fn default_category(&self) -> &str {
        DEFAULT_CATEGORY
    }

    fn reads_page_heading(&self) -> bool {
        true
    }

    fn page_heading(&self, doc: &Html) -> Option<String> {
        title::heading_from_page(doc, &self.headings, GENERIC_HEADINGS)
    }

    fn title_strategies(&self) -> &'static [TitleStrategy] {
        TITLE_CHAIN
    }

    fn summary(&self, doc: &Html) -> Option<String> {
        summary::extract(doc, &self.summary_rules)
    }

    fn image_candidates(&self, doc: &Html) -> Vec<String> {
        image::candidates(doc, &self.image_rules, self.base.as_str())
    }
}
