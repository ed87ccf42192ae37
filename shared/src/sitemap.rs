//! Sitemap protocol documents.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://kuke.ink/activity/1</loc>
//!     <lastmod>2026-01-01</lastmod>
//!     <changefreq>daily</changefreq>
//!     <priority>0.9</priority>
//!   </url>
//! </urlset>
//! ```

use std::fmt::{self, Write as _};

use chrono::NaiveDate;
use quick_xml::escape::escape;

use crate::scoring::Tier;

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const LASTMOD_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    pub const fn as_str(self) -> &'static str {
        match self {
            ChangeFreq::Always => "always",
            ChangeFreq::Hourly => "hourly",
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
            ChangeFreq::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<url>` element of a `urlset`.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrlEntry {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: ChangeFreq,
    /// 0.0 ..= 1.0; clamped on render.
    pub priority: f64,
}

/// The child documents listed by the sitemap index, in index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SitemapFile {
    Main,
    News,
    PostsHot,
    PostsEvergreen,
    PostsTrending,
    PostsStandard,
}

impl SitemapFile {
    pub const ALL: [SitemapFile; 6] = [
        SitemapFile::Main,
        SitemapFile::News,
        SitemapFile::PostsHot,
        SitemapFile::PostsEvergreen,
        SitemapFile::PostsTrending,
        SitemapFile::PostsStandard,
    ];

    /// File name without the `.xml` extension.
    pub const fn stem(self) -> &'static str {
        match self {
            SitemapFile::Main => "sitemap-main",
            SitemapFile::News => "sitemap-news",
            SitemapFile::PostsHot => "sitemap-posts-hot",
            SitemapFile::PostsEvergreen => "sitemap-posts-evergreen",
            SitemapFile::PostsTrending => "sitemap-posts-trending",
            SitemapFile::PostsStandard => "sitemap-posts-standard",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.xml", self.stem())
    }

    pub fn from_stem(stem: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|file| file.stem() == stem)
    }

    /// Tier whose posts this document lists, if it is a posts document.
    pub const fn post_tier(self) -> Option<Tier> {
        match self {
            SitemapFile::PostsHot => Some(Tier::Hot),
            SitemapFile::PostsEvergreen => Some(Tier::Evergreen),
            SitemapFile::PostsTrending => Some(Tier::Trending),
            SitemapFile::PostsStandard => Some(Tier::Standard),
            SitemapFile::Main | SitemapFile::News => None,
        }
    }
}

/// Renders a `urlset` document. An empty slice still yields a valid document.
///
/// `loc` values are XML-escaped.
pub fn render_urlset(entries: &[SitemapUrlEntry]) -> String {
    let mut xml = String::with_capacity(256 + entries.len() * 160);
    let _ = writeln!(xml, "{XML_DECLARATION}");
    let _ = writeln!(xml, r#"<urlset xmlns="{SITEMAP_NS}">"#);

    for entry in entries {
        let _ = writeln!(xml, "  <url>");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape(entry.loc.as_str()));
        let _ = writeln!(
            xml,
            "    <lastmod>{}</lastmod>",
            entry.lastmod.format(LASTMOD_FORMAT)
        );
        let _ = writeln!(xml, "    <changefreq>{}</changefreq>", entry.changefreq);
        let _ = writeln!(
            xml,
            "    <priority>{:.1}</priority>",
            entry.priority.clamp(0.0, 1.0)
        );
        let _ = writeln!(xml, "  </url>");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Renders the `sitemapindex` listing every [`SitemapFile`] under
/// `{site_url}/sitemaps/`, all stamped with `today`.
pub fn render_sitemap_index(site_url: &str, today: NaiveDate) -> String {
    let base = site_url.trim_end_matches('/');
    let lastmod = today.format(LASTMOD_FORMAT);

    let mut xml = String::with_capacity(1024);
    let _ = writeln!(xml, "{XML_DECLARATION}");
    let _ = writeln!(xml, r#"<sitemapindex xmlns="{SITEMAP_NS}">"#);

    for file in SitemapFile::ALL {
        let loc = format!("{base}/sitemaps/{}", file.file_name());
        let _ = writeln!(xml, "  <sitemap>");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape(loc.as_str()));
        let _ = writeln!(xml, "    <lastmod>{lastmod}</lastmod>");
        let _ = writeln!(xml, "  </sitemap>");
    }

    xml.push_str("</sitemapindex>\n");
    xml
}
