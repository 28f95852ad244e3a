//! Catalog source adapters.

pub mod file;
pub mod http;

pub use file::FileCatalogSource;
pub use http::HttpCatalogSource;
