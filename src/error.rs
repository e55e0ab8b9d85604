// src/error.rs - HTTP-facing error taxonomy

use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::dtos::api_dtos::ApiResponse;
use crate::repositories::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    /// Silent refusal: the client is sent somewhere else instead of seeing a 403.
    #[error("forbidden, redirecting to {location}")]
    RedirectForbidden { location: String },

    #[error("forbidden: {0}")]
    ExplicitForbidden(String),

    #[error("authentication required")]
    Unauthenticated { login_url: String, next: String },

    #[error("repository error: {0}")]
    Repository(#[from] RepoError),

    #[error("render error: {0}")]
    Render(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(serde::Serialize)]
struct ErrorPage {
    code: u16,
    page: &'static str,
}

/// `302 Found` to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found().insert_header((LOCATION, location)).finish()
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RedirectForbidden { .. } | AppError::Unauthenticated { .. } => StatusCode::FOUND,
            AppError::ExplicitForbidden(_) => StatusCode::FORBIDDEN,
            AppError::Repository(_) | AppError::Render(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(what) => HttpResponse::NotFound().json(ApiResponse {
                status: "error".to_string(),
                message: format!("Page not found: {}", what),
                data: Some(ErrorPage { code: 404, page: "core/404" }),
            }),
            AppError::RedirectForbidden { location } => redirect(location),
            AppError::ExplicitForbidden(reason) => HttpResponse::Forbidden().json(ApiResponse {
                status: "error".to_string(),
                message: format!("Access denied: {}", reason),
                data: Some(ErrorPage { code: 403, page: "core/403" }),
            }),
            AppError::Unauthenticated { login_url, next } => {
                redirect(&format!("{}?next={}", login_url, urlencoding::encode(next)))
            }
            AppError::Repository(_) | AppError::Render(_) | AppError::Internal(_) => {
                log::error!("{}", self);
                HttpResponse::InternalServerError().json(ApiResponse::<()> {
                    status: "error".to_string(),
                    message: "Internal server error".to_string(),
                    data: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(AppError::NotFound("post 1".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::ExplicitForbidden("bad token".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Repository(RepoError::NotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthenticated_redirects_to_login_with_next() {
        let resp = AppError::Unauthenticated {
            login_url: "/auth/login/".into(),
            next: "/create/".into(),
        }
        .error_response();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(LOCATION).unwrap(),
            "/auth/login/?next=%2Fcreate%2F"
        );
    }

    #[test]
    fn redirect_forbidden_goes_to_location() {
        let resp = AppError::RedirectForbidden { location: "/".into() }.error_response();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/");
    }
}
