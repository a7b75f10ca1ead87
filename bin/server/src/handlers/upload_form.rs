use crate::constants::MULTIPART_OVERHEAD;
use crate::handlers::error::{handle_error, too_large_message};
use actix_multipart::form::{tempfile::TempFile, MultipartForm, MultipartFormConfig};
use actix_multipart::MultipartError;
use actix_web::error::PayloadError;
use actix_web::http::StatusCode;
use actix_web::ResponseError;
use tracing::warn;

/// Multipart form for file upload
#[derive(MultipartForm)]
pub struct UploadForm {
    /// The file being uploaded, spooled to a temporary file
    pub file: TempFile,
}

/// Body limits for upload forms.
///
/// Leaves room for multipart framing above `max_upload_size`; the exact
/// ceiling is enforced by the upload relay against the spooled file.
pub fn multipart_config(max_upload_size: u64) -> MultipartFormConfig {
    let total_limit = usize::try_from(max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    MultipartFormConfig::default()
        .total_limit(total_limit)
        .error_handler(move |err, _req| {
            let over_limit = matches!(err, MultipartError::Payload(PayloadError::Overflow))
                || err.status_code() == StatusCode::PAYLOAD_TOO_LARGE;
            if over_limit {
                warn!("POST /upload - Body over multipart limit");
                return actix_web::error::ErrorPayloadTooLarge(too_large_message(max_upload_size));
            }
            handle_error("Invalid upload form", err)
        })
}
