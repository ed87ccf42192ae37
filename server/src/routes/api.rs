use std::fmt::Write as _;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::state::{AppState, ObservabilitySnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "site_url": state.settings.site_url,
        "observability": {
            "sitemap_documents_served_total": observability.sitemap_documents_served_total,
            "sitemap_not_found_total": observability.sitemap_not_found_total,
            "upstream_failures_total": observability.upstream_failures_total,
            "items_fetched_total": observability.items_fetched_total,
        }
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = render_prometheus_metrics(state.observability.snapshot());

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn render_prometheus_metrics(observability: ObservabilitySnapshot) -> String {
    let counters = [
        (
            "kuke_sitemap_documents_served_total",
            "Total sitemap and sitemap index documents served.",
            observability.sitemap_documents_served_total,
        ),
        (
            "kuke_sitemap_not_found_total",
            "Total requests for unknown sitemap documents.",
            observability.sitemap_not_found_total,
        ),
        (
            "kuke_upstream_failures_total",
            "Total backend fetches that failed and degraded a sitemap.",
            observability.upstream_failures_total,
        ),
        (
            "kuke_items_fetched_total",
            "Total posts and news items fetched from the backend.",
            observability.items_fetched_total,
        ),
    ];

    let mut body = String::new();
    for (name, help, value) in counters {
        let _ = writeln!(body, "# HELP {name} {help}");
        let _ = writeln!(body, "# TYPE {name} counter");
        let _ = writeln!(body, "{name} {value}");
    }
    body
}
