use crate::http::{HttpClient, Timeouts};
use crate::news::{DetailContent, IMAGE_UNAVAILABLE, SUMMARY_UNAVAILABLE};
use crate::sites::SiteAdapter;
use scraper::Html;
use tracing::{debug, warn};

/// Fetches a detail page and resolves its summary and image. Never fails:
/// a fetch error is reported inside `summary`, unresolved fields become
/// sentinels.
pub async fn extract_content(
    http: &HttpClient,
    adapter: &dyn SiteAdapter,
    link: &str,
    timeouts: &Timeouts,
) -> DetailContent {
    let body = match http
        .get_page(link, timeouts.detail, adapter.request_headers())
        .await
    {
        Ok(body) => body,
        Err(e) => {
            warn!(site = adapter.name(), url = %link, error = %e, "detail page fetch failed");
            return DetailContent::fetch_error(e);
        }
    };

    // The parsed document is not Send; keep it out of the probe loop.
    let (summary, images) = {
        let doc = Html::parse_document(&body);
        (adapter.summary(&doc), adapter.image_candidates(&doc))
    };

    let mut image_url = None;
    for url in images {
        if http.probe_image(&url, timeouts.probe).await {
            image_url = Some(url);
            break;
        }
    }
    if image_url.is_none() {
        debug!(site = adapter.name(), url = %link, "no reachable image");
    }

    DetailContent {
        summary: summary.unwrap_or_else(|| SUMMARY_UNAVAILABLE.to_string()),
        image_url: image_url.unwrap_or_else(|| IMAGE_UNAVAILABLE.to_string()),
    }
}
