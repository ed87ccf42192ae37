pub mod backend;
pub mod paginator;
