//! HTTP request handlers

pub mod download;
pub mod error;
pub mod health;
pub mod index;
pub mod upload;
pub mod upload_form;

use actix_web::web;

/// Register every route of the relay
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index::index)
        .service(upload::upload)
        .service(download::download)
        .service(health::health);
}
