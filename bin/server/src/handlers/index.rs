use crate::handlers::error::too_large_message;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse, Result as ActixResult};

const UPLOAD_PAGE: &str = include_str!("../../static/index.html");

/// Upload page
#[get("/")]
pub async fn index(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let limit = state.relay.max_upload_size();
    let page = UPLOAD_PAGE
        .replace("{{MAX_UPLOAD_SIZE}}", &limit.to_string())
        .replace("{{TOO_LARGE_MESSAGE}}", &too_large_message(limit));

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page))
}
