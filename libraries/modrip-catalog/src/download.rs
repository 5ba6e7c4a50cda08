//! Module download operations.

use crate::client::CatalogClient;
use crate::error::{CatalogError, Result};
use crate::types::Catalog;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

/// What happened to each catalog entry during a download pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Identifiers fetched in this pass
    pub downloaded: Vec<String>,
    /// Identifiers already on disk
    pub skipped: Vec<String>,
    /// Identifiers that failed, with the reason
    pub failed: Vec<(String, String)>,
}

impl DownloadSummary {
    /// Identifiers whose file is now present locally
    pub fn available(&self) -> impl Iterator<Item = &str> {
        self.downloaded
            .iter()
            .chain(self.skipped.iter())
            .map(String::as_str)
    }
}

/// Identifier usable as a single path component inside the module directory
fn is_plain_file_name(identifier: &str) -> bool {
    !identifier.is_empty()
        && !identifier.contains(['/', '\\'])
        && identifier != "."
        && identifier != ".."
}

fn part_path(dest: &Path) -> PathBuf {
    let mut path = OsString::from(dest.as_os_str());
    path.push(".part");
    PathBuf::from(path)
}

impl CatalogClient {
    /// Download every catalog entry into `dir`, skipping files that already exist.
    ///
    /// Individual failures are logged and recorded; they never stop the pass.
    pub async fn download_all(&self, catalog: &Catalog, dir: &Path) -> Result<DownloadSummary> {
        tokio::fs::create_dir_all(dir).await?;

        let mut summary = DownloadSummary::default();

        for (identifier, entry) in catalog.iter() {
            if !is_plain_file_name(identifier) {
                let err = CatalogError::InvalidIdentifier(identifier.to_string());
                warn!(module = identifier, error = %err, "Refusing to download");
                summary.failed.push((identifier.to_string(), err.to_string()));
                continue;
            }

            let dest = dir.join(identifier);

            if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
                info!(module = identifier, "Already downloaded, skipping");
                summary.skipped.push(identifier.to_string());
                continue;
            }

            info!(module = identifier, "Downloading");
            match self.download_module(&entry.url, &dest).await {
                Ok(size) => {
                    debug!(module = identifier, size, "Download complete");
                    summary.downloaded.push(identifier.to_string());
                }
                Err(e) => {
                    warn!(module = identifier, url = %entry.url, error = %e, "Download failed");
                    summary.failed.push((identifier.to_string(), e.to_string()));
                }
            }
        }

        info!(
            downloaded = summary.downloaded.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            "Download pass finished"
        );

        Ok(summary)
    }

    /// Download one file to `dest`, returning its size in bytes.
    ///
    /// The body is written to `<dest>.part` and renamed once complete, so a
    /// partial transfer never leaves a file at `dest`.
    pub async fn download_module(&self, url: &Url, dest: &Path) -> Result<u64> {
        let mut response = self.http.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part = part_path(dest);
        let mut file = File::create(&part).await?;
        let mut written: u64 = 0;

        let transfer: Result<()> = async {
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        if let Err(e) = transfer {
            drop(file);
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }

        drop(file);
        tokio::fs::rename(&part, dest).await?;

        Ok(written)
    }
}
