// src/middleware/auth_extractor.rs - bearer token authentication
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use log::{debug, warn};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppError;
use crate::models::user::JwtClaims;

/// A request whose bearer token names an existing user.
///
/// Missing credentials redirect to the login page; a token that is present but
/// does not verify is an explicit 403. Use `Option<AuthenticatedUser>` on routes
/// that guests may also see.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Verifies an HS256 token and returns its subject.
pub fn verify_token(token: &str, secret: &str) -> Result<Uuid, String> {
    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| format!("token rejected: {}", e))?;
    Uuid::parse_str(&data.claims.sub).map_err(|e| format!("invalid subject: {}", e))
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<AuthenticatedUser, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .map(|h| h.to_str().map(str::to_owned));
        let next = crate::urls::full_path(req);

        Box::pin(async move {
            let state = state.ok_or_else(|| AppError::Internal("app state not configured".into()))?;
            let unauthenticated = || AppError::Unauthenticated {
                login_url: state.settings.login_url.clone(),
                next: next.clone(),
            };

            let header = match header {
                None => return Err(unauthenticated()),
                Some(Err(_)) => return Err(AppError::ExplicitForbidden("invalid header format".into())),
                Some(Ok(h)) => h,
            };
            let Some(token) = header.strip_prefix("Bearer ") else {
                return Err(AppError::ExplicitForbidden("invalid auth header format".into()));
            };

            let user_id = verify_token(token.trim(), &state.settings.jwt_secret).map_err(|e| {
                warn!("auth failed: {}", e);
                AppError::ExplicitForbidden("invalid token".into())
            })?;

            match state.repo.find_user_by_id(user_id).await? {
                Some(user) => {
                    debug!("authenticated {}", user.username);
                    Ok(AuthenticatedUser { user_id: user.id, username: user.username })
                }
                None => {
                    warn!("token for unknown user {}", user_id);
                    Err(unauthenticated())
                }
            }
        })
    }
}
