//! Local filesystem side of the store: root bootstrap and upload writes.

use std::io;
use std::path::PathBuf;

use bytes::Bytes;
use tokio::fs;
use tracing::{debug, info};

use super::locator::{sanitize_file_name, StoreLocator};
use crate::error::UploadError;

/// A file written by [`DiskStore::save`].
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Token the file was stored under
    pub token: String,

    /// Sanitized file name on disk
    pub file_name: String,

    /// Full path of the written file
    pub path: PathBuf,

    /// Number of bytes written
    pub size: usize,
}

impl StoredImage {
    /// Retrieval URL for this file, relative to the server root.
    ///
    /// Token and file name are percent-encoded as individual path segments.
    pub fn url(&self) -> String {
        format!(
            "/receipts/{}/{}",
            urlencoding::encode(&self.token),
            urlencoding::encode(&self.file_name)
        )
    }
}

/// Filesystem-backed image store rooted at the locator's storage root.
#[derive(Debug, Clone)]
pub struct DiskStore {
    locator: StoreLocator,
}

impl DiskStore {
    /// Create a store writing through `locator`.
    pub fn new(locator: StoreLocator) -> Self {
        Self { locator }
    }

    /// The locator used to compute storage paths.
    pub fn locator(&self) -> &StoreLocator {
        &self.locator
    }

    /// Create the storage root if it does not exist yet.
    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(self.locator.root()).await
    }

    /// Write `data` to `<root>/<token>/<base name of raw_file_name>`.
    ///
    /// The per-token directory is created on first use. An existing file
    /// with the same name is replaced.
    pub async fn save(
        &self,
        token: &str,
        raw_file_name: &str,
        data: Bytes,
    ) -> Result<StoredImage, UploadError> {
        let user_dir = self.locator.user_dir(token)?;
        let file_name = sanitize_file_name(raw_file_name)?.to_string();
        let path = user_dir.join(&file_name);

        debug!(dir = %user_dir.display(), "ensuring user directory");
        fs::create_dir_all(&user_dir)
            .await
            .map_err(|e| UploadError::Io {
                message: format!("Failed to create user directory: {}", e),
            })?;

        fs::write(&path, &data).await.map_err(|e| UploadError::Io {
            message: e.to_string(),
        })?;

        info!(
            file_name = %file_name,
            bytes = data.len(),
            "stored image"
        );

        Ok(StoredImage {
            token: token.to_string(),
            file_name,
            path,
            size: data.len(),
        })
    }
}
