//! Fixtures shared by the integration tests: HTML builders for both sites
//! and helpers that mount them on a `wiremock` server.

#![allow(dead_code)]

use andes_news::config::{Config, SiteConfig};
use andes_news::sites::SiteKind;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One listing entry: URL slug and the date shown next to it.
pub struct Entry {
    pub slug: &'static str,
    pub date: &'static str,
}

pub const fn entry(slug: &'static str, date: &'static str) -> Entry {
    Entry { slug, date }
}

/// Config pointing every listed site at the mock server, with no courtesy
/// delays and no root-page supplement.
pub fn config_for(uri: &str, kinds: &[SiteKind]) -> Config {
    let mut config = Config::default();
    config.aggregator.delay_ms = 0;
    config.aggregator.supplement_from_root = false;
    config.http.listing_timeout_secs = 5;
    config.http.detail_timeout_secs = 5;
    config.http.title_timeout_secs = 5;
    config.http.probe_timeout_secs = 5;
    config.sites = kinds
        .iter()
        .map(|kind| SiteConfig {
            kind: *kind,
            base_url: Some(uri.to_string()),
            enabled: true,
        })
        .collect();
    if let Some(first) = kinds.first() {
        config.aggregator.primary_site = *first;
    }
    config
}

pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(format!("<!DOCTYPE html><html><body>{body}</body></html>"))
}

pub fn andes_listing(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(|e| {
            format!(
                r#"<div class="views-row"><span class="categoria">Nacional</span>
                   <span class="data">{date}</span>
                   <a href="/conteudos/noticia/{slug}">Chamada da notícia {slug}</a></div>"#,
                date = e.date,
                slug = e.slug,
            )
        })
        .collect()
}

pub fn andes_detail(slug: &str) -> String {
    format!(
        r#"<h2>SINDICATO NACIONAL DOS DOCENTES</h2>
           <h1>Título completo {slug}</h1>
           <div class="field-name-body"><p>Resumo da notícia {slug}.</p>
           <img src="/files/{slug}.jpg"></div>"#
    )
}

/// CSP listing entries carry numeric dates and numeric ids.
pub fn csp_listing(entries: &[Entry]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                r#"<li><span>{date}</span>
                   <a href="/noticias/n/{id}/{slug}">Manchete completa {slug}</a></li>"#,
                date = e.date,
                id = 100 + i,
                slug = e.slug,
            )
        })
        .collect()
}

pub fn csp_detail(slug: &str) -> String {
    format!(
        r#"<main><p>Curto.</p>
           <p>Resumo da Central sobre {slug}, com texto suficiente para passar do mínimo.</p>
           <img src="/uploads/{slug}.jpg"></main>"#
    )
}

/// Listing page 0 (no page parameter).
pub async fn mount_andes_listing(server: &MockServer, entries: &[Entry]) {
    Mock::given(method("GET"))
        .and(path("/sites/noticias"))
        .and(query_param_is_missing("page"))
        .respond_with(html(&andes_listing(entries)))
        .mount(server)
        .await;
}

pub async fn mount_andes_page(server: &MockServer, page: usize, entries: &[Entry]) {
    Mock::given(method("GET"))
        .and(path("/sites/noticias"))
        .and(query_param("page", page.to_string()))
        .respond_with(html(&andes_listing(entries)))
        .mount(server)
        .await;
}

pub async fn mount_csp_listing(server: &MockServer, entries: &[Entry]) {
    Mock::given(method("GET"))
        .and(path("/noticias"))
        .and(query_param_is_missing("p"))
        .respond_with(html(&csp_listing(entries)))
        .mount(server)
        .await;
}

/// Detail pages plus reachable images for every ANDES entry.
pub async fn mount_andes_details(server: &MockServer, entries: &[Entry]) {
    for e in entries {
        Mock::given(method("GET"))
            .and(path(format!("/conteudos/noticia/{}", e.slug)))
            .respond_with(html(&andes_detail(e.slug)))
            .mount(server)
            .await;
        mount_image(server, &format!("/files/{}.jpg", e.slug)).await;
    }
}

pub async fn mount_csp_details(server: &MockServer, entries: &[Entry]) {
    for (i, e) in entries.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(format!("/noticias/n/{}/{}", 100 + i, e.slug)))
            .respond_with(html(&csp_detail(e.slug)))
            .mount(server)
            .await;
        mount_image(server, &format!("/uploads/{}.jpg", e.slug)).await;
    }
}

pub async fn mount_image(server: &MockServer, image_path: &str) {
    Mock::given(method("HEAD"))
        .and(path(image_path.to_string()))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/jpeg"))
        .mount(server)
        .await;
}
