pub mod feed_handlers;
pub mod follow_handlers;
pub mod post_handlers;

use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;

use crate::dtos::api_dtos::ApiResponse;
use crate::error::{AppError, AppResult};

/// Serializes a page context into the body bytes that the page cache stores.
pub(crate) fn render_bytes<T: Serialize>(message: &str, context: T) -> AppResult<web::Bytes> {
    let body = serde_json::to_vec(&ApiResponse::success(message, context))?;
    Ok(web::Bytes::from(body))
}

pub(crate) fn json_page(body: web::Bytes) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::json()).body(body)
}

pub(crate) fn render<T: Serialize>(message: &str, context: T) -> AppResult<HttpResponse> {
    Ok(json_page(render_bytes(message, context)?))
}

/// Fallback for unknown routes.
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(req.path().to_string()))
}

/// Malformed path segments (e.g. `/posts/abc/`) get the same page as unknown ids.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, req| AppError::NotFound(format!("{} ({})", req.path(), err)).into())
}

/// Post forms carry base64 images, so bodies may be far larger than the default limit.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default().limit(limit)
}
