use crate::handlers::error::{handle_error, upload_error};
use crate::handlers::upload_form::UploadForm;
use crate::progress::LogProgress;
use crate::state::AppState;
use actix_multipart::form::MultipartForm;
use actix_web::{post, web, HttpResponse, Result as ActixResult};
use common::{file_utils, share_link, UploadResponse};
use std::sync::Arc;
use tracing::info;

/// Handle file upload (multipart/form-data)
#[post("/upload")]
pub async fn upload(
    form: MultipartForm<UploadForm>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let UploadForm { file } = form.into_inner();

    // Browsers may send a full client-side path; keep the last component only
    let original_name = file
        .file_name
        .as_deref()
        .and_then(file_utils::display_name)
        .ok_or_else(|| handle_error("Invalid upload form", "file has no usable filename"))?;

    // The extension ends up in a response header on every download
    file_utils::validate_filename(&original_name).map_err(|e| handle_error("Invalid filename", e))?;

    info!(
        original_name = ?original_name,
        size = file.size,
        "POST /upload - Request received"
    );

    let progress = Arc::new(LogProgress::new(&original_name));
    let published = state
        .relay
        .upload(file.file.path(), &original_name, progress)
        .await
        .map_err(|e| upload_error(e, state.relay.max_upload_size()))?;

    let link = share_link(&state.base_url, &published.identifier);

    info!(
        identifier = %published.identifier,
        link = %link,
        "POST /upload - File relayed"
    );

    Ok(HttpResponse::Ok().json(UploadResponse {
        identifier: published.identifier,
        original_name: published.record.original_name,
        download_name: published.record.obfuscated_name,
        link,
    }))
}
