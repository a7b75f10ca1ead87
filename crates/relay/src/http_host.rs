//! File host reached over HTTP with a catbox-style API

use crate::host::{ByteStream, FileHost};
use crate::progress::{self, ProgressSink};
use crate::RelayError;
use async_trait::async_trait;
use bytes::Bytes;
use common::constants::DOWNLOAD_CONTENT_TYPE;
use futures_util::{stream, Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Default upload API endpoint
pub const DEFAULT_API_URL: &str = "https://catbox.moe/user/api.php";

/// Default time the host may go without moving a byte (10 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Multipart field carrying the file
const FILE_FIELD: &str = "fileToUpload";

/// Request-type discriminator expected by the upload API
const REQUEST_TYPE_FIELD: &str = "reqtype";
const REQUEST_TYPE_UPLOAD: &str = "fileupload";

/// Uploads with a multipart POST to `api_url`, fetches with plain GETs.
///
/// There is no overall deadline. A request fails once the host has gone
/// `idle_timeout` without sending or accepting data, however long the
/// transfer has been running.
pub struct HttpFileHost {
    client: Client,
    api_url: String,
    idle_timeout: Duration,
}

impl HttpFileHost {
    pub fn new(api_url: impl Into<String>, idle_timeout: Duration) -> Result<Self, RelayError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            idle_timeout,
        })
    }

    fn stalled(&self) -> RelayError {
        warn!(idle_timeout = ?self.idle_timeout, "File host stalled");
        RelayError::Stalled(self.idle_timeout)
    }
}

/// Last moment a chunk of the request body was handed to the connection
struct Activity {
    start: Instant,
    last_ms: AtomicU64,
}

impl Activity {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            last_ms: AtomicU64::new(0),
        }
    }

    fn touch(&self) {
        let elapsed = self.start.elapsed().as_millis() as u64;
        self.last_ms.store(elapsed, Ordering::Relaxed);
    }

    fn last(&self) -> Instant {
        self.start + Duration::from_millis(self.last_ms.load(Ordering::Relaxed))
    }

    /// Resolves once nothing has moved for `idle`
    async fn stalled(&self, idle: Duration) {
        loop {
            let deadline = self.last() + idle;
            if Instant::now() >= deadline {
                return;
            }
            tokio::time::sleep_until(deadline).await;
        }
    }
}

/// Fail `body` with `TimedOut` when no chunk arrives within `idle`
fn idle_limited<S, E>(body: S, idle: Duration) -> ByteStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body = Box::pin(body);
    Box::pin(stream::unfold(Some(body), move |state| async move {
        let mut body = state?;
        match tokio::time::timeout(idle, body.next()).await {
            Ok(Some(Ok(chunk))) => Some((Ok(chunk), Some(body))),
            Ok(Some(Err(e))) => Some((Err(io::Error::new(io::ErrorKind::Other, e)), None)),
            Ok(None) => None,
            Err(_) => Some((
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("file host sent nothing for {:?}", idle),
                )),
                None,
            )),
        }
    }))
}

#[async_trait]
impl FileHost for HttpFileHost {
    async fn upload(
        &self,
        file: tokio::fs::File,
        size: u64,
        file_name: &str,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<String, RelayError> {
        let activity = Arc::new(Activity::new());
        let touched = activity.clone();
        let chunks = progress::track(ReaderStream::new(file), size, progress).map(move |chunk| {
            touched.touch();
            chunk
        });
        let part = Part::stream_with_length(Body::wrap_stream(chunks), size)
            .file_name(file_name.to_string())
            .mime_str(DOWNLOAD_CONTENT_TYPE)?;

        let form = Form::new()
            .text(REQUEST_TYPE_FIELD, REQUEST_TYPE_UPLOAD)
            .part(FILE_FIELD, part);

        let send = self.client.post(&self.api_url).multipart(form).send();
        let response = tokio::select! {
            response = send => response?,
            _ = activity.stalled(self.idle_timeout) => return Err(self.stalled()),
        };

        let status = response.status();
        let body = tokio::time::timeout(self.idle_timeout, response.text())
            .await
            .map_err(|_| self.stalled())??;
        debug!(status = %status, bytes = size, "File host answered upload");

        Ok(body)
    }

    async fn fetch(&self, url: &str) -> Result<ByteStream, RelayError> {
        let response = tokio::time::timeout(self.idle_timeout, self.client.get(url).send())
            .await
            .map_err(|_| self.stalled())??
            .error_for_status()?;

        Ok(idle_limited(response.bytes_stream(), self.idle_timeout))
    }
}
