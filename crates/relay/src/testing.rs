//! In-memory file host for tests.
//!
//! Available behind the `testing` feature or in `#[cfg(test)]` within this crate.

use crate::host::{ByteStream, FileHost};
use crate::progress::{self, ProgressSink};
use crate::RelayError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::io::ReaderStream;

/// Size of the pieces `fetch` hands back, deliberately not a multiple of the relay chunk size
const FETCH_PIECE: usize = 5_000;

/// File host keeping every upload in a map and counting calls
#[derive(Default)]
pub struct MemoryHost {
    files: Mutex<HashMap<String, Vec<u8>>>,
    rejection: Option<String>,
    uploads: AtomicUsize,
    fetches: AtomicUsize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that answers every upload with `message` instead of a URL
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            rejection: Some(message.into()),
            ..Self::default()
        }
    }

    /// Place `content` at `url` as if it had been uploaded earlier
    pub fn insert(&self, url: &str, content: Vec<u8>) {
        self.files
            .lock()
            .unwrap()
            .insert(url.to_string(), content);
    }

    /// Bytes stored at `url`, if any
    pub fn stored(&self, url: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(url).cloned()
    }

    pub fn upload_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileHost for MemoryHost {
    async fn upload(
        &self,
        file: tokio::fs::File,
        size: u64,
        file_name: &str,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<String, RelayError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);

        let mut chunks = Box::pin(progress::track(ReaderStream::new(file), size, progress));
        let mut content = Vec::new();
        while let Some(chunk) = chunks.next().await {
            content.extend_from_slice(&chunk?);
        }

        if let Some(message) = &self.rejection {
            return Ok(message.clone());
        }

        let url = format!("https://files.example.test/{}/{}", n, file_name);
        self.insert(&url, content);
        Ok(format!("{}\n", url))
    }

    async fn fetch(&self, url: &str) -> Result<ByteStream, RelayError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let content = self
            .stored(url)
            .ok_or_else(|| RelayError::Unavailable(url.to_string()))?;

        let pieces: Vec<std::io::Result<Bytes>> = content
            .chunks(FETCH_PIECE)
            .map(|piece| Ok(Bytes::copy_from_slice(piece)))
            .collect();
        Ok(Box::pin(stream::iter(pieces)))
    }
}
