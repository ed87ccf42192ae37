use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, NaiveDate, Utc};
use kuke_shared::{
    ContentItem, ScoreConfig, SitemapFile, SitemapUrlEntry, Tier, categorize,
    render_sitemap_index, render_urlset,
};
use tracing::{info, warn};

use crate::config::{NEWS_CHANGEFREQ, NEWS_PRIORITY, STATIC_ROUTES};
use crate::services::backend::{PostsSource, fetch_news};
use crate::services::paginator::{StopReason, fetch_all};
use crate::state::AppState;

const XML_CONTENT_TYPE: &str = "application/xml";

pub async fn sitemap_index(State(state): State<AppState>) -> Response {
    state.observability.record_sitemap_served();
    let today = Utc::now().date_naive();
    xml_response(render_sitemap_index(&state.settings.site_url, today))
}

/// Serves one of the [`SitemapFile`] documents. Upstream trouble degrades to
/// fewer (or no) entries; it never turns into a 5xx.
pub async fn sitemap_document(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    let Some(stem) = filename.strip_suffix(".xml") else {
        state.observability.record_sitemap_not_found();
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };
    let Some(file) = SitemapFile::from_stem(stem) else {
        state.observability.record_sitemap_not_found();
        return (StatusCode::NOT_FOUND, "Sitemap not found").into_response();
    };

    let now = Utc::now();
    let today = now.date_naive();
    let entries = match (file, file.post_tier()) {
        (_, Some(tier)) => post_entries(&state, tier, now).await,
        (SitemapFile::News, None) => news_entries(&state, today).await,
        (_, None) => static_entries(&state.settings.site_url, today),
    };

    state.observability.record_sitemap_served();
    xml_response(render_urlset(&entries))
}

async fn post_entries(state: &AppState, tier: Tier, now: DateTime<Utc>) -> Vec<SitemapUrlEntry> {
    let settings = &state.settings;
    let source = PostsSource::new(&state.http_client, &settings.api_base);
    let report = fetch_all(&source, settings.post_limits).await;

    state
        .observability
        .record_items_fetched(report.items.len() as u64);
    if report.stop == StopReason::Failed {
        state.observability.record_upstream_failure();
    }

    let entries = tier_entries(&settings.site_url, &report.items, tier, &settings.score, now);
    info!(
        %tier,
        fetched = report.items.len(),
        listed = entries.len(),
        pages = report.pages_fetched,
        stop = ?report.stop,
        "built posts sitemap"
    );
    entries
}

async fn news_entries(state: &AppState, today: NaiveDate) -> Vec<SitemapUrlEntry> {
    let settings = &state.settings;
    let news = match fetch_news(&state.http_client, &settings.api_base, settings.news_limit).await
    {
        Ok(news) => news,
        Err(e) => {
            state.observability.record_upstream_failure();
            warn!(error = %e, "failed to fetch news; serving an empty news sitemap");
            Vec::new()
        }
    };
    state.observability.record_items_fetched(news.len() as u64);

    news.iter()
        .map(|item| SitemapUrlEntry {
            loc: content_url(&settings.site_url, "news", item),
            lastmod: lastmod_or(item, today),
            changefreq: NEWS_CHANGEFREQ,
            priority: NEWS_PRIORITY,
        })
        .collect()
}

fn static_entries(site_url: &str, today: NaiveDate) -> Vec<SitemapUrlEntry> {
    let base = site_url.trim_end_matches('/');
    STATIC_ROUTES
        .iter()
        .map(|route| SitemapUrlEntry {
            loc: if route.path == "/" {
                base.to_owned()
            } else {
                format!("{base}{}", route.path)
            },
            lastmod: today,
            changefreq: route.changefreq,
            priority: route.priority,
        })
        .collect()
}

/// Entries for the posts that categorize into `tier`, in fetch order.
fn tier_entries(
    site_url: &str,
    posts: &[ContentItem],
    tier: Tier,
    score: &ScoreConfig,
    now: DateTime<Utc>,
) -> Vec<SitemapUrlEntry> {
    let today = now.date_naive();
    let seo = tier.seo();
    posts
        .iter()
        .filter(|post| categorize(post, score, now) == tier)
        .map(|post| {
            let section = if post.is_album() { "album" } else { "activity" };
            SitemapUrlEntry {
                loc: content_url(site_url, section, post),
                lastmod: lastmod_or(post, today),
                changefreq: seo.changefreq,
                priority: seo.priority,
            }
        })
        .collect()
}

/// Calendar date of the last modification in the backend's own offset.
fn lastmod_or(item: &ContentItem, today: NaiveDate) -> NaiveDate {
    item.last_modified()
        .map(|at| at.date_naive())
        .unwrap_or(today)
}

/// `{site_url}/{section}/{id}` with the id percent-encoded as a path segment.
fn content_url(site_url: &str, section: &str, item: &ContentItem) -> String {
    let base = site_url.trim_end_matches('/');
    let Ok(mut url) = reqwest::Url::parse(base) else {
        return format!("{base}/{section}/{}", item.id);
    };
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty().push(section).push(item.id.as_str());
        }
        Err(()) => return format!("{base}/{section}/{}", item.id),
    }
    url.into()
}

fn xml_response(body: String) -> Response {
    let mut response = body.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(XML_CONTENT_TYPE),
    );
    response
}
