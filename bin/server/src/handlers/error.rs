use common::constants::NOT_FOUND_MESSAGE;
use relay::RelayError;
use tracing::{error, info, warn};

/// Helper function for bad request errors
pub fn handle_error<E: std::fmt::Display>(msg: &str, e: E) -> actix_web::Error {
    warn!("{}: {}", msg, e);
    actix_web::error::ErrorBadRequest(format!("{}: {}", msg, e))
}

/// Helper function for server errors
pub fn handle_server_error<E: std::fmt::Display>(msg: &str, e: E) -> actix_web::Error {
    error!("{}: {}", msg, e);
    actix_web::error::ErrorInternalServerError(format!("{}: {}", msg, e))
}

/// Helper function for failures of the external file host
pub fn handle_gateway_error<E: std::fmt::Display>(msg: &str, e: E) -> actix_web::Error {
    error!("{}: {}", msg, e);
    actix_web::error::ErrorBadGateway(format!("{}: {}", msg, e))
}

/// Message shown when an upload is over the size ceiling
pub fn too_large_message(limit: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if limit >= MIB && limit % MIB == 0 {
        format!("File too large! Max {} MB", limit / MIB)
    } else {
        format!("File too large! Max {} bytes", limit)
    }
}

/// Map a failed upload to a response
pub fn upload_error(e: RelayError, limit: u64) -> actix_web::Error {
    match e {
        RelayError::TooLarge { .. } => {
            actix_web::error::ErrorPayloadTooLarge(too_large_message(limit))
        }
        RelayError::UploadFailed(detail) => handle_gateway_error("Upload failed", detail),
        RelayError::Transport(e) => handle_gateway_error("Upload failed", e),
        e @ RelayError::Stalled(_) => handle_gateway_error("Upload failed", e),
        RelayError::Io(e) => handle_server_error("Failed to read uploaded file", e),
        e => handle_server_error("Failed to record upload", e),
    }
}

/// Map a failed download to a response
pub fn download_error(identifier: &str, e: RelayError) -> actix_web::Error {
    match e {
        RelayError::NotFound => {
            info!(identifier = ?identifier, "GET /download - Unknown identifier");
            actix_web::error::ErrorNotFound(NOT_FOUND_MESSAGE)
        }
        RelayError::Transport(e) => handle_gateway_error("Failed to fetch file from host", e),
        RelayError::Unavailable(e) => handle_gateway_error("Failed to fetch file from host", e),
        e @ RelayError::Stalled(_) => handle_gateway_error("Failed to fetch file from host", e),
        e => handle_server_error("Failed to resolve download", e),
    }
}
