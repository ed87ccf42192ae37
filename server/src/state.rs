use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use kuke_shared::{DEFAULT_SCORE_CONFIG, ScoreConfig};
use tracing::warn;

use crate::config;
use crate::services::paginator::PageLimits;

/// Everything a sitemap request needs besides the HTTP client.
#[derive(Debug, Clone)]
pub struct Settings {
    pub site_url: String,
    pub api_base: String,
    pub score: ScoreConfig,
    pub post_limits: PageLimits,
    pub news_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_url: config::DEFAULT_SITE_URL.to_owned(),
            api_base: config::DEFAULT_API_BASE.to_owned(),
            score: DEFAULT_SCORE_CONFIG,
            post_limits: PageLimits {
                per_page: config::DEFAULT_POSTS_PER_PAGE,
                max_pages: config::DEFAULT_MAX_PAGES,
                max_items: config::DEFAULT_MAX_POSTS,
            },
            news_limit: config::DEFAULT_NEWS_LIMIT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            site_url: config::site_url(),
            api_base: config::api_base(),
            score: DEFAULT_SCORE_CONFIG,
            post_limits: PageLimits {
                per_page: config::posts_per_page(),
                max_pages: config::max_pages(),
                max_items: config::max_posts(),
            },
            news_limit: config::news_limit(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    pub settings: Arc<Settings>,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    sitemap_documents_served_total: AtomicU64,
    sitemap_not_found_total: AtomicU64,
    upstream_failures_total: AtomicU64,
    items_fetched_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub sitemap_documents_served_total: u64,
    pub sitemap_not_found_total: u64,
    pub upstream_failures_total: u64,
    pub items_fetched_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            sitemap_documents_served_total: self
                .sitemap_documents_served_total
                .load(Ordering::Relaxed),
            sitemap_not_found_total: self.sitemap_not_found_total.load(Ordering::Relaxed),
            upstream_failures_total: self.upstream_failures_total.load(Ordering::Relaxed),
            items_fetched_total: self.items_fetched_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_sitemap_served(&self) {
        self.sitemap_documents_served_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sitemap_not_found(&self) {
        self.sitemap_not_found_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upstream_failure(&self) {
        self.upstream_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_items_fetched(&self, count: u64) {
        self.items_fetched_total.fetch_add(count, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, reqwest::Error> {
        let request_timeout = config::upstream_http_timeout();
        let connect_timeout = config::upstream_connect_timeout();
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("kuke-sitemap/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .timeout(request_timeout)
                    .connect_timeout(connect_timeout)
                    .build()
            })?;

        Ok(Self {
            http_client,
            settings: Arc::new(settings),
            observability: Arc::new(ObservabilityCounters::default()),
        })
    }
}
