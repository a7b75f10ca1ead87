use crate::handlers::error::download_error;
use crate::state::AppState;
use actix_web::http::header;
use actix_web::{get, web, HttpResponse, Result as ActixResult};
use common::constants::DOWNLOAD_CONTENT_TYPE;
use tracing::info;

/// Stream a relayed file back under its obfuscated name
#[get("/download/{identifier}")]
pub async fn download(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let identifier = path.into_inner();

    info!(identifier = ?identifier, "GET /download - Request received");

    let download = state
        .relay
        .download(&identifier)
        .await
        .map_err(|e| download_error(&identifier, e))?;

    // Generic content type and generated name only; nothing about the real file or host leaks
    Ok(HttpResponse::Ok()
        .content_type(DOWNLOAD_CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", download.filename),
        ))
        .streaming(download.body))
}
