use kuke_shared::ContentItem;
use reqwest::StatusCode;
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{NEWS_PATH, POSTS_PATH};
use crate::services::paginator::{ListingPage, PageSource};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Deserialize)]
struct PostsResponse {
    #[serde(default)]
    data: Option<Vec<Value>>,
    #[serde(default)]
    total: Option<Value>,
}

/// `GET {api_base}/api/posts?page&per_page&type=latest`.
pub struct PostsSource<'a> {
    client: &'a reqwest::Client,
    url: String,
}

impl<'a> PostsSource<'a> {
    pub fn new(client: &'a reqwest::Client, api_base: &str) -> Self {
        Self {
            client,
            url: format!("{}{POSTS_PATH}", api_base.trim_end_matches('/')),
        }
    }
}

impl PageSource for PostsSource<'_> {
    type Error = FetchError;

    fn label(&self) -> &str {
        "posts"
    }

    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<ListingPage, FetchError> {
        let request = self
            .client
            .get(&self.url)
            .query(&[("page", page), ("per_page", per_page)])
            .query(&[("type", "latest")])
            .header(CACHE_CONTROL, "no-cache");

        let body: PostsResponse = fetch_json(request, &self.url).await?;
        let total = body.total.as_ref().and_then(reported_total);

        Ok(ListingPage {
            items: decode_items(body.data.unwrap_or_default(), "posts"),
            total,
        })
    }
}

/// `GET {api_base}/api/website/news/?limit`. A non-array body counts as no news.
pub async fn fetch_news(
    client: &reqwest::Client,
    api_base: &str,
    limit: u32,
) -> Result<Vec<ContentItem>, FetchError> {
    let url = format!("{}{NEWS_PATH}", api_base.trim_end_matches('/'));
    let request = client
        .get(&url)
        .query(&[("limit", limit)])
        .header(CACHE_CONTROL, "no-cache");

    match fetch_json::<Value>(request, &url).await? {
        Value::Array(values) => Ok(decode_items(values, "news")),
        _ => Ok(Vec::new()),
    }
}

/// The backend's `total`, when it is a usable count. Anything else leaves the
/// walk to the other stop conditions.
fn reported_total(value: &Value) -> Option<u64> {
    let total = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (total.is_finite() && total >= 0.0).then_some(total as u64)
}

async fn fetch_json<T>(request: reqwest::RequestBuilder, url: &str) -> Result<T, FetchError>
where
    T: serde::de::DeserializeOwned,
{
    let resp = request.send().await.map_err(|source| FetchError::Transport {
        url: url.to_owned(),
        source,
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_owned(),
            status,
        });
    }

    resp.json::<T>().await.map_err(|source| FetchError::Decode {
        url: url.to_owned(),
        source,
    })
}

/// Decodes items one by one so a single malformed entry doesn't sink the page.
fn decode_items(values: Vec<Value>, kind: &str) -> Vec<ContentItem> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<ContentItem>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!(kind, error = %e, "skipping undecodable listing item");
                None
            }
        })
        .collect()
}
