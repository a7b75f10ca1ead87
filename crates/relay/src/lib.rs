//! Relays files between uploaders, the external file host and downloaders.
//!
//! Uploads are size-checked, streamed to the host and recorded under a
//! freshly minted identifier. Downloads resolve that identifier and stream
//! the host's bytes back under the obfuscated name. Neither direction holds
//! a whole file in memory.

pub mod download;
pub mod error;
pub mod host;
pub mod http_host;
pub mod progress;
pub mod upload;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use common::FileRecord;
use std::sync::Arc;
use storage::RecordStore;

pub use download::Download;
pub use error::RelayError;
pub use host::{ByteStream, FileHost};
pub use http_host::HttpFileHost;
pub use progress::{NoProgress, ProgressSink};

/// Identifier and record created by a successful upload
#[derive(Debug, Clone)]
pub struct Published {
    pub identifier: String,
    pub record: FileRecord,
}

/// Upload and download relay over one record store and one file host
pub struct Relay {
    store: Arc<dyn RecordStore>,
    host: Arc<dyn FileHost>,
    max_upload_size: u64,
}

impl Relay {
    pub fn new(store: Arc<dyn RecordStore>, host: Arc<dyn FileHost>, max_upload_size: u64) -> Self {
        Self {
            store,
            host,
            max_upload_size,
        }
    }

    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }
}
