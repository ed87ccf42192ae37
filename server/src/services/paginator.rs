use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;

use kuke_shared::ContentItem;
use tracing::{debug, warn};

/// One page of a backend listing.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub items: Vec<ContentItem>,
    /// Total item count the backend claims to have, if it reports one.
    pub total: Option<u64>,
}

/// Something that can hand out a listing one 1-indexed page at a time.
pub trait PageSource {
    type Error: Display;

    /// Short name used in logs.
    fn label(&self) -> &str;

    fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<ListingPage, Self::Error>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub per_page: u32,
    /// Upper bound on upstream calls, whatever the backend reports as its total.
    pub max_pages: u32,
    pub max_items: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EmptyPage,
    ItemCap,
    ReportedTotal,
    PageLimit,
    /// A page failed; everything gathered before it is kept.
    Failed,
}

#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Unique items in first-seen order.
    pub items: Vec<ContentItem>,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

/// Walks `source` from page 1, deduplicating by id, until one of the stop
/// conditions in [`StopReason`] holds.
///
/// Never fails: an upstream error ends the walk with what was gathered so far.
pub async fn fetch_all<S: PageSource>(source: &S, limits: PageLimits) -> FetchReport {
    let mut items: Vec<ContentItem> = Vec::new();
    let mut seen = HashSet::new();
    let mut page = 0_u32;
    let mut pages_fetched = 0_u32;

    let stop = loop {
        if page >= limits.max_pages {
            break StopReason::PageLimit;
        }
        page += 1;

        let listing = match source.fetch_page(page, limits.per_page).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(
                    source = source.label(),
                    page,
                    kept = items.len(),
                    error = %e,
                    "listing fetch failed; continuing with partial results"
                );
                break StopReason::Failed;
            }
        };
        pages_fetched += 1;

        if listing.items.is_empty() {
            break StopReason::EmptyPage;
        }

        let received = listing.items.len();
        for item in listing.items {
            if items.len() >= limits.max_items {
                break;
            }
            if seen.insert(item.id.clone()) {
                items.push(item);
            }
        }
        debug!(
            source = source.label(),
            page,
            received,
            unique = items.len(),
            "fetched listing page"
        );

        if items.len() >= limits.max_items {
            break StopReason::ItemCap;
        }
        if listing
            .total
            .is_some_and(|total| items.len() as u64 >= total)
        {
            break StopReason::ReportedTotal;
        }
    };

    FetchReport {
        items,
        pages_fetched,
        stop,
    }
}
