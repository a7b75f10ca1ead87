use thiserror::Error;

/// Failures surfaced by the upload and download relays
#[derive(Debug, Error)]
pub enum RelayError {
    /// Local file is over the configured ceiling; nothing was sent
    #[error("file is {size} bytes, over the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    /// The file host answered with something other than a URL
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// No record for the requested identifier
    #[error("file not found")]
    NotFound,

    /// The file host moved no data for the configured idle timeout
    #[error("file host stalled for {0:?}")]
    Stalled(std::time::Duration),

    #[error("file host request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The file host could not serve a previously stored URL
    #[error("remote file unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read local file: {0}")]
    Io(#[from] std::io::Error),

    #[error("record store error: {0:#}")]
    Store(anyhow::Error),
}
