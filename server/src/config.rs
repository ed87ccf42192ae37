use std::str::FromStr;
use std::time::Duration;

use kuke_shared::ChangeFreq;

pub const DEFAULT_SITE_URL: &str = "https://kuke.ink";
pub const DEFAULT_API_BASE: &str = "https://api.kuke.ink";
pub const POSTS_PATH: &str = "/api/posts";
pub const NEWS_PATH: &str = "/api/website/news/";

pub const DEFAULT_SERVER_PORT: u16 = 5460;
pub const DEFAULT_POSTS_PER_PAGE: u32 = 50;
pub const DEFAULT_MAX_PAGES: u32 = 20; // hard ceiling on upstream calls per sitemap request
pub const DEFAULT_MAX_POSTS: usize = 10_000;
pub const DEFAULT_NEWS_LIMIT: u32 = 1000;
pub const DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 3;

pub const SITEMAP_CACHE_CONTROL: &str = "public, max-age=3600, s-maxage=3600";
pub const NEWS_PRIORITY: f64 = 0.8;
pub const NEWS_CHANGEFREQ: ChangeFreq = ChangeFreq::Monthly;

/// Hand-ranked core pages listed in `sitemap-main.xml`.
#[derive(Debug, Clone, Copy)]
pub struct StaticRoute {
    pub path: &'static str,
    pub priority: f64,
    pub changefreq: ChangeFreq,
}

pub const STATIC_ROUTES: [StaticRoute; 8] = [
    StaticRoute {
        path: "/",
        priority: 1.0,
        changefreq: ChangeFreq::Daily,
    },
    StaticRoute {
        path: "/news",
        priority: 0.9,
        changefreq: ChangeFreq::Daily,
    },
    StaticRoute {
        path: "/activity",
        priority: 0.9,
        changefreq: ChangeFreq::Always,
    },
    StaticRoute {
        path: "/stats",
        priority: 0.8,
        changefreq: ChangeFreq::Daily,
    },
    StaticRoute {
        path: "/consensus",
        priority: 0.8,
        changefreq: ChangeFreq::Weekly,
    },
    StaticRoute {
        path: "/players",
        priority: 0.7,
        changefreq: ChangeFreq::Daily,
    },
    StaticRoute {
        path: "/bans",
        priority: 0.6,
        changefreq: ChangeFreq::Daily,
    },
    StaticRoute {
        path: "/monitor",
        priority: 0.5,
        changefreq: ChangeFreq::Always,
    },
];

pub fn site_url() -> String {
    base_url_var("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_owned())
}

pub fn api_base() -> String {
    base_url_var("API_BASE")
        .or_else(|| base_url_var("NEXT_PUBLIC_API_BASE"))
        .unwrap_or_else(|| DEFAULT_API_BASE.to_owned())
}

pub fn server_port() -> u16 {
    positive_var("PORT").unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn posts_per_page() -> u32 {
    positive_var("SITEMAP_POSTS_PER_PAGE").unwrap_or(DEFAULT_POSTS_PER_PAGE)
}

pub fn max_pages() -> u32 {
    positive_var("SITEMAP_MAX_PAGES").unwrap_or(DEFAULT_MAX_PAGES)
}

pub fn max_posts() -> usize {
    positive_var("SITEMAP_MAX_POSTS").unwrap_or(DEFAULT_MAX_POSTS)
}

pub fn news_limit() -> u32 {
    positive_var("SITEMAP_NEWS_LIMIT").unwrap_or(DEFAULT_NEWS_LIMIT)
}

pub fn upstream_http_timeout() -> Duration {
    positive_var("UPSTREAM_HTTP_TIMEOUT_SECS")
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS))
}

pub fn upstream_connect_timeout() -> Duration {
    positive_var("UPSTREAM_CONNECT_TIMEOUT_SECS")
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS))
}

/// Numeric override that must parse and be greater than zero.
fn positive_var<T>(name: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .filter(|value| *value > T::default())
}

fn base_url_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn numeric_overrides_require_positive_values() {
        temp_env::with_vars(
            [
                ("SITEMAP_MAX_PAGES", Some("5")),
                ("SITEMAP_POSTS_PER_PAGE", Some("0")),
                ("SITEMAP_MAX_POSTS", Some("-3")),
                ("SITEMAP_NEWS_LIMIT", Some("lots")),
            ],
            || {
                assert_eq!(max_pages(), 5);
                assert_eq!(posts_per_page(), DEFAULT_POSTS_PER_PAGE);
                assert_eq!(max_posts(), DEFAULT_MAX_POSTS);
                assert_eq!(news_limit(), DEFAULT_NEWS_LIMIT);
            },
        );
    }

    #[test]
    fn base_urls_are_trimmed_and_fall_back() {
        temp_env::with_vars(
            [
                ("SITE_URL", Some(" https://staging.kuke.ink/ ")),
                ("API_BASE", None),
                ("NEXT_PUBLIC_API_BASE", Some("http://127.0.0.1:8000")),
            ],
            || {
                assert_eq!(site_url(), "https://staging.kuke.ink");
                assert_eq!(api_base(), "http://127.0.0.1:8000");
            },
        );

        temp_env::with_vars(
            [
                ("SITE_URL", Some("   ")),
                ("API_BASE", None::<&str>),
                ("NEXT_PUBLIC_API_BASE", None),
            ],
            || {
                assert_eq!(site_url(), DEFAULT_SITE_URL);
                assert_eq!(api_base(), DEFAULT_API_BASE);
            },
        );
    }

    #[test]
    fn upstream_timeouts_default_when_unset() {
        temp_env::with_vars_unset(
            ["UPSTREAM_HTTP_TIMEOUT_SECS", "UPSTREAM_CONNECT_TIMEOUT_SECS"],
            || {
                assert_eq!(upstream_http_timeout(), Duration::from_secs(10));
                assert_eq!(upstream_connect_timeout(), Duration::from_secs(3));
            },
        );
    }

    #[test]
    fn static_routes_start_at_the_home_page() {
        assert_eq!(STATIC_ROUTES[0].path, "/");
        assert!(
            STATIC_ROUTES
                .iter()
                .all(|route| (0.0..=1.0).contains(&route.priority))
        );
    }
}
