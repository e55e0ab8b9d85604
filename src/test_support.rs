//! Shared fixtures for handler and extractor tests.

use std::sync::Arc;

use actix_web::web;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use crate::AppState;
use crate::config::Settings;
use crate::models::user::JwtClaims;
use crate::repositories::memory_repository::InMemoryRepository;

pub fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(Arc::new(InMemoryRepository::new()), Settings::for_tests()))
}

/// Mints what the identity provider would hand out.
pub fn issue_token(user_id: Uuid, secret: &str) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = JwtClaims { sub: user_id.to_string(), exp: now + 3600, iat: Some(now) };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("token encodes")
}

/// `Authorization` header value for `user_id`.
pub fn bearer(state: &AppState, user_id: Uuid) -> String {
    format!("Bearer {}", issue_token(user_id, &state.settings.jwt_secret))
}

/// Builds the full application around `state`, as `main` does.
macro_rules! init_app {
    ($state:expr) => {{
        let state = $state;
        let json_config = crate::handlers::json_config(state.settings.max_body_bytes);
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(state)
                .app_data(crate::handlers::path_config())
                .app_data(json_config)
                .configure(crate::routes)
                .default_service(actix_web::web::route().to(crate::handlers::not_found)),
        )
    }};
}

pub(crate) use init_app;
