use crate::{ProgressSink, RelayError};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::io;
use std::pin::Pin;
use std::sync::Arc;

/// Body of a relayed file, delivered chunk by chunk
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// External service that stores uploaded bytes and serves them back by URL
#[async_trait]
pub trait FileHost: Send + Sync {
    /// Stream `file` (exactly `size` bytes) to the host under `file_name`.
    ///
    /// Returns the host's raw response text. Hosts answer with either a URL
    /// or a short error string; telling the two apart is left to the caller.
    async fn upload(
        &self,
        file: tokio::fs::File,
        size: u64,
        file_name: &str,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<String, RelayError>;

    /// Start streaming the bytes stored at `url`
    async fn fetch(&self, url: &str) -> Result<ByteStream, RelayError>;
}
