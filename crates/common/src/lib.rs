pub mod constants;
pub mod file_utils;

use serde::{Deserialize, Serialize};

/// Metadata kept for every file relayed to the external host.
///
/// The opaque identifier is the key this record is stored under and is not
/// repeated inside the record itself.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    /// Filename as supplied by the uploader, for display only
    pub original_name: String,
    /// Generated filename presented to downloaders
    #[serde(rename = "random_name", alias = "obfuscated_name")]
    pub obfuscated_name: String,
    /// Location of the bytes on the external host
    #[serde(rename = "url")]
    pub remote_url: String,
}

/// Response returned by the server after a successful upload
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadResponse {
    pub identifier: String,
    pub original_name: String,
    pub download_name: String,
    pub link: String, // <base-url>/download/<identifier>
}

/// Response from health check endpoint
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String, // "ok" when healthy
}

/// Build the public share link for an identifier
pub fn share_link(base_url: &str, identifier: &str) -> String {
    format!(
        "{}{}/{}",
        base_url.trim_end_matches('/'),
        constants::DOWNLOAD_ENDPOINT,
        identifier
    )
}
