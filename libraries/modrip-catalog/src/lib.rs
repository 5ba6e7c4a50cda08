//! modrip Catalog
//!
//! Crawls a module archive artist listing and downloads the modules it links.
//!
//! # Features
//!
//! - Paginated crawl following the listing's "next page" link
//! - Download-link and listing-title extraction per table row
//! - Immutable [`Catalog`] value handed to the conversion pipeline
//! - Downloads that skip files already on disk
//!
//! # Example
//!
//! ```ignore
//! use modrip_catalog::CatalogClient;
//!
//! let client = CatalogClient::new()?;
//! let catalog = client.fetch_catalog(artist_url).await?;
//! let summary = client.download_all(&catalog, Path::new("mods")).await?;
//! println!("{} downloaded, {} already present", summary.downloaded.len(), summary.skipped.len());
//! ```

mod client;
mod download;
mod error;
mod parser;
mod types;

pub use client::CatalogClient;
pub use download::DownloadSummary;
pub use error::{CatalogError, Result};
pub use parser::{parse_page, ParsedPage};
pub use types::{Catalog, CatalogEntry};
