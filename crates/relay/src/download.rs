use crate::{ByteStream, Relay, RelayError};
use common::constants::DOWNLOAD_CHUNK_SIZE;
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::info;

/// A resolved download: the name to present and the bytes to relay
pub struct Download {
    pub filename: String,
    pub body: ByteStream,
}

impl Relay {
    /// Resolve `identifier` and start streaming its bytes from the host.
    ///
    /// Unknown identifiers fail with [`RelayError::NotFound`] without
    /// contacting the host. Every call fetches afresh; nothing is cached.
    pub async fn download(&self, identifier: &str) -> Result<Download, RelayError> {
        let record = self
            .store
            .get(identifier)
            .await
            .map_err(RelayError::Store)?
            .ok_or(RelayError::NotFound)?;

        let body = self.host.fetch(&record.remote_url).await?;

        info!(
            identifier = %identifier,
            download_name = %record.obfuscated_name,
            "Relaying download"
        );

        Ok(Download {
            filename: record.obfuscated_name,
            body: rechunk(body),
        })
    }
}

/// Re-slice `body` into chunks of at most `DOWNLOAD_CHUNK_SIZE` bytes
fn rechunk(body: ByteStream) -> ByteStream {
    Box::pin(ReaderStream::with_capacity(
        StreamReader::new(body),
        DOWNLOAD_CHUNK_SIZE,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryHost;
    use common::FileRecord;
    use futures_util::StreamExt;
    use std::sync::Arc;
    use storage::{MemoryStorage, RecordStore};

    async fn collect(mut body: ByteStream) -> (Vec<u8>, Vec<usize>) {
        let mut bytes = Vec::new();
        let mut sizes = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.unwrap();
            sizes.push(chunk.len());
            bytes.extend_from_slice(&chunk);
        }
        (bytes, sizes)
    }

    async fn relay_with(content: &[u8]) -> (Relay, Arc<MemoryHost>) {
        let host = Arc::new(MemoryHost::new());
        host.insert("https://files.example.test/x.txt", content.to_vec());

        let store = Arc::new(MemoryStorage::new());
        store
            .put(
                "0123456789ab",
                FileRecord {
                    original_name: "a.txt".to_string(),
                    obfuscated_name: "c0ffee1234.txt".to_string(),
                    remote_url: "https://files.example.test/x.txt".to_string(),
                },
            )
            .await
            .unwrap();

        (Relay::new(store, host.clone(), 1024), host)
    }

    #[tokio::test]
    async fn test_unknown_identifier_never_fetches() {
        let (relay, host) = relay_with(b"0123456789").await;

        let result = relay.download("doesnotexist").await;
        assert!(matches!(result, Err(RelayError::NotFound)));
        assert_eq!(host.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_download_uses_obfuscated_name() {
        let (relay, _host) = relay_with(b"0123456789").await;

        let download = relay.download("0123456789ab").await.unwrap();
        assert_eq!(download.filename, "c0ffee1234.txt");
        let (bytes, _) = collect(download.body).await;
        assert_eq!(bytes, b"0123456789");
    }

    #[tokio::test]
    async fn test_chunks_are_bounded() {
        let content: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        let (relay, _host) = relay_with(&content).await;

        let download = relay.download("0123456789ab").await.unwrap();
        let (bytes, sizes) = collect(download.body).await;
        assert_eq!(bytes, content);
        assert!(sizes.iter().all(|&n| n > 0 && n <= DOWNLOAD_CHUNK_SIZE));
    }

    #[tokio::test]
    async fn test_each_download_fetches_again() {
        let (relay, host) = relay_with(b"same bytes every time").await;

        let first = collect(relay.download("0123456789ab").await.unwrap().body).await;
        let second = collect(relay.download("0123456789ab").await.unwrap().body).await;

        assert_eq!(first.0, second.0);
        assert_eq!(host.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_remote_is_unavailable() {
        let host = Arc::new(MemoryHost::new());
        let store = Arc::new(MemoryStorage::new());
        store
            .put(
                "0123456789ab",
                FileRecord {
                    original_name: "a.txt".to_string(),
                    obfuscated_name: "c0ffee1234.txt".to_string(),
                    remote_url: "https://files.example.test/expired.txt".to_string(),
                },
            )
            .await
            .unwrap();
        let relay = Relay::new(store, host, 1024);

        let result = relay.download("0123456789ab").await;
        assert!(matches!(result, Err(RelayError::Unavailable(_))));
    }
}
