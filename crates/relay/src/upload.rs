use crate::{ProgressSink, Published, Relay, RelayError};
use common::FileRecord;
use minter::Minted;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

impl Relay {
    /// Send the file at `path` to the external host and return its URL.
    ///
    /// The size is checked before any network activity; an oversized file
    /// fails with [`RelayError::TooLarge`] and the host is never contacted.
    pub async fn relay_to_host(
        &self,
        path: &Path,
        file_name: &str,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<String, RelayError> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();

        if size > self.max_upload_size {
            warn!(
                file_name = ?file_name,
                size,
                limit = self.max_upload_size,
                "Rejected oversized upload"
            );
            return Err(RelayError::TooLarge {
                size,
                limit: self.max_upload_size,
            });
        }

        progress.report(0.0);
        let response = self
            .host
            .upload(file, size, file_name, progress.clone())
            .await?;
        let remote_url = remote_url_from_response(&response)?;
        progress.report(1.0);

        Ok(remote_url)
    }

    /// Relay a local file to the host and record it under a new identifier.
    ///
    /// The record is persisted before this returns. On any failure no record
    /// is created.
    pub async fn upload(
        &self,
        path: &Path,
        original_name: &str,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Published, RelayError> {
        let remote_url = self.relay_to_host(path, original_name, progress).await?;

        let Minted {
            identifier,
            obfuscated_name,
        } = minter::mint(original_name);

        let record = FileRecord {
            original_name: original_name.to_string(),
            obfuscated_name,
            remote_url,
        };

        self.store
            .put(&identifier, record.clone())
            .await
            .map_err(RelayError::Store)?;

        info!(
            identifier = %identifier,
            original_name = ?record.original_name,
            download_name = %record.obfuscated_name,
            "Upload recorded"
        );

        Ok(Published { identifier, record })
    }
}

/// Accept the host's response only if it is a URL; anything else is the host's error text
pub fn remote_url_from_response(response: &str) -> Result<String, RelayError> {
    let response = response.trim();
    if response.starts_with("https://") || response.starts_with("http://") {
        return Ok(response.to_string());
    }
    if response.is_empty() {
        return Err(RelayError::UploadFailed(
            "empty response from file host".to_string(),
        ));
    }
    Err(RelayError::UploadFailed(response.to_string()))
}
