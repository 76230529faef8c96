use super::dates::{self, find_date};
use super::text::contains_word;
use crate::http::{HttpClient, Timeouts};
use crate::news::{Candidate, NewsItemMeta};
use crate::sites::SiteAdapter;
use chrono::NaiveDate;
use scraper::Html;
use tracing::debug;

/// How far up from the anchor category and date are searched.
pub const MAX_ANCESTOR_LEVELS: usize = 5;

pub type DateStrategy = fn(&Candidate) -> Option<String>;

pub fn date_from_ancestors(candidate: &Candidate) -> Option<String> {
    candidate
        .context
        .ancestor_texts
        .iter()
        .take(MAX_ANCESTOR_LEVELS)
        .find_map(|text| find_date(text))
}

pub fn date_from_anchor_text(candidate: &Candidate) -> Option<String> {
    find_date(&candidate.context.text)
}

pub const DATE_CHAIN: &[DateStrategy] = &[date_from_ancestors, date_from_anchor_text];

/// First known category mentioned, as a whole word, by the nearest ancestor
/// that mentions any. Whole-word matching keeps `Internacional` from also
/// reading as `Nacional`.
pub fn category_from_ancestors(candidate: &Candidate, vocabulary: &[&str]) -> Option<String> {
    candidate
        .context
        .ancestor_texts
        .iter()
        .take(MAX_ANCESTOR_LEVELS)
        .find_map(|text| {
            let lower = text.to_lowercase();
            vocabulary
                .iter()
                .find(|cat| contains_word(&lower, &cat.to_lowercase()))
                .map(|cat| cat.to_string())
        })
}

/// Category and date text for a candidate. The date chain always ends in
/// `today`, so a date string is always present even if fabricated.
pub fn category_and_date(
    candidate: &Candidate,
    vocabulary: &[&str],
    default_category: &str,
    today: NaiveDate,
) -> (String, String) {
    let category = category_from_ancestors(candidate, vocabulary)
        .unwrap_or_else(|| default_category.to_string());
    let date = DATE_CHAIN
        .iter()
        .find_map(|strategy| strategy(candidate))
        .unwrap_or_else(|| {
            debug!(href = %candidate.href, "no date near anchor, using today");
            dates::localized(today)
        });
    (category, date)
}

pub fn build_meta(
    adapter: &dyn SiteAdapter,
    candidate: &Candidate,
    page_heading: Option<String>,
    today: NaiveDate,
) -> Option<NewsItemMeta> {
    let Some(title) = adapter.title(candidate, page_heading) else {
        debug!(site = adapter.name(), href = %candidate.href, "no usable title, dropping candidate");
        return None;
    };
    let (category, date_text) = adapter.category_and_date(candidate, today);
    Some(NewsItemMeta {
        href: candidate.href.clone(),
        absolute_link: adapter.absolute_link(&candidate.href),
        title,
        category,
        sortable_date: dates::sortable(&date_text),
        date_text,
        site_name: adapter.name().to_string(),
    })
}

/// Metadata extractor. Adapters that read titles from the detail page get
/// that page fetched first; a failed fetch just skips that strategy.
pub async fn extract_meta(
    http: &HttpClient,
    adapter: &dyn SiteAdapter,
    candidate: &Candidate,
    timeouts: &Timeouts,
    today: NaiveDate,
) -> Option<NewsItemMeta> {
    let page_heading = if adapter.reads_page_heading() {
        let link = adapter.absolute_link(&candidate.href);
        match http
            .get_page(&link, timeouts.title, adapter.request_headers())
            .await
        {
            Ok(body) => adapter.page_heading(&Html::parse_document(&body)),
            Err(e) => {
                debug!(site = adapter.name(), url = %link, error = %e, "title page fetch failed");
                None
            }
        }
    } else {
        None
    };
    build_meta(adapter, candidate, page_heading, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::AnchorContext;

    fn candidate(text: &str, ancestors: &[&str]) -> Candidate {
        Candidate {
            href: "/conteudos/noticia/x".into(),
            context: AnchorContext {
                text: text.into(),
                title_attr: None,
                ancestor_texts: ancestors.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    const VOCAB: &[&str] = &["Nacional", "Internacional", "Outras lutas", "Eventos"];

    #[test]
    fn nearest_ancestor_wins() {
        let c = candidate(
            "Ato",
            &["Ato", "Eventos 2 de junho de 2025 Ato", "Nacional 1 de junho de 2025"],
        );
        let (cat, date) = category_and_date(&c, VOCAB, "Sem categoria", today());
        assert_eq!(cat, "Eventos");
        assert_eq!(date, "2 de junho de 2025");
    }

    #[test]
    fn category_and_date_can_come_from_different_levels() {
        let c = candidate("Ato", &["Ato 10/04/2025", "x", "outras lutas"]);
        let (cat, date) = category_and_date(&c, VOCAB, "Sem categoria", today());
        assert_eq!(cat, "Outras lutas");
        assert_eq!(date, "10 de abril de 2025");
    }

    #[test]
    fn ancestors_beyond_limit_are_ignored() {
        let c = candidate("Ato", &["a", "b", "c", "d", "e", "Nacional 1 de junho de 2025"]);
        let (cat, date) = category_and_date(&c, VOCAB, "Sem categoria", today());
        assert_eq!(cat, "Sem categoria");
        assert_eq!(date, "17 de outubro de 2026");
    }

    #[test]
    fn internacional_is_not_nacional() {
        let c = candidate("Ato", &["Internacional 2 de junho de 2025"]);
        let (cat, _) = category_and_date(&c, VOCAB, "Sem categoria", today());
        assert_eq!(cat, "Internacional");
    }

    #[test]
    fn anchor_text_is_second_date_source() {
        let c = candidate("Ato 3 de maio de 2024", &[]);
        let (_, date) = category_and_date(&c, VOCAB, "Sem categoria", today());
        assert_eq!(date, "3 de maio de 2024");
    }

    #[test]
    fn missing_date_is_fabricated_as_today() {
        let c = candidate("Ato", &["sem data aqui"]);
        let (_, date) = category_and_date(&c, VOCAB, "Sem categoria", today());
        assert_eq!(date, "17 de outubro de 2026");
        assert_eq!(dates::sortable(&date), today());
    }
}
