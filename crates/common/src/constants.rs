/// Default maximum accepted upload size in bytes (200 MiB)
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 200 * 1024 * 1024;

/// Chunk size used when relaying downloads back to the caller
pub const DOWNLOAD_CHUNK_SIZE: usize = 8 * 1024;

/// Upload endpoint path
pub const UPLOAD_ENDPOINT: &str = "/upload";

/// Download endpoint path (followed by `/{identifier}`)
pub const DOWNLOAD_ENDPOINT: &str = "/download";

/// Body returned for unknown identifiers
pub const NOT_FOUND_MESSAGE: &str = "File not found";

/// Content type used for every relayed download
pub const DOWNLOAD_CONTENT_TYPE: &str = "application/octet-stream";
