pub mod content;
pub mod scoring;
pub mod sitemap;

pub use content::{ContentId, ContentItem, Timestamp};
pub use scoring::{
    DEFAULT_SCORE_CONFIG, ScoreConfig, ScoreConfigError, Tier, TierSeo, categorize,
    interaction_score,
};
pub use sitemap::{ChangeFreq, SitemapFile, SitemapUrlEntry, render_sitemap_index, render_urlset};
