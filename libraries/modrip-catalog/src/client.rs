//! Artist listing crawler.

use crate::error::{CatalogError, Result};
use crate::parser::parse_page;
use crate::types::Catalog;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// HTTP client for crawling a module archive and downloading its files.
///
/// # Example
///
/// ```ignore
/// use modrip_catalog::CatalogClient;
///
/// let client = CatalogClient::new()?;
/// let catalog = client
///     .fetch_catalog("https://modarchive.org/index.php?request=view_artist_modules&query=84384")
///     .await?;
/// println!("Found {} modules", catalog.len());
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    pub(crate) http: Client,
}

impl CatalogClient {
    /// Create a client with reasonable timeouts.
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("modrip/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http })
    }

    /// Crawl every page of an artist listing, starting at `start_url`.
    ///
    /// Follows the "next page" link until there is none; a page that was
    /// already visited ends the crawl.
    pub async fn fetch_catalog(&self, start_url: &str) -> Result<Catalog> {
        let mut url = Url::parse(start_url)
            .map_err(|e| CatalogError::InvalidUrl(format!("{}: {}", start_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidUrl(format!(
                "{}: only http and https are supported",
                start_url
            )));
        }

        let mut visited = HashSet::new();
        let mut entries = Vec::new();

        loop {
            if !visited.insert(url.clone()) {
                warn!(url = %url, "Pagination loops back to a visited page, stopping");
                break;
            }

            debug!(url = %url, page = visited.len(), "Fetching listing page");
            let html = self.fetch_page(&url).await?;
            let page = parse_page(&html, &url)?;

            debug!(url = %url, modules = page.entries.len(), "Parsed listing page");
            entries.extend(page.entries);

            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }

        let catalog: Catalog = entries.into_iter().collect();
        info!(
            pages = visited.len(),
            modules = catalog.len(),
            "Catalog fetched"
        );

        Ok(catalog)
    }

    async fn fetch_page(&self, url: &Url) -> Result<String> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
