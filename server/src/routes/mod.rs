pub mod api;
pub mod sitemap;
