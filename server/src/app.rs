use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use tower_http::compression::CompressionLayer;

use crate::config::SITEMAP_CACHE_CONTROL;
use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState) -> Router {
    let sitemaps = Router::new()
        .route("/sitemap.xml", get(routes::sitemap::sitemap_index))
        .route(
            "/sitemaps/{filename}",
            get(routes::sitemap::sitemap_document),
        )
        .layer(middleware::from_fn(set_sitemap_cache_control));

    Router::new()
        .route("/api/health", get(routes::api::health))
        .route("/api/metrics", get(routes::api::metrics))
        .merge(sitemaps)
        .layer(CompressionLayer::new())
        .with_state(state)
}

async fn set_sitemap_cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if response.status().is_success()
        && let Some(cache_control) = cache_control_for_path(&path)
    {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    if path == "/sitemap.xml" || (path.starts_with("/sitemaps/") && path.ends_with(".xml")) {
        return Some(SITEMAP_CACHE_CONTROL);
    }

    None
}
