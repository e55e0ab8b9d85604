// src/handlers/follow_handlers.rs - follow / unfollow an author

use actix_web::{HttpResponse, post, web};
use log::debug;

use crate::AppState;
use crate::error::{AppError, AppResult, redirect};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::urls;

/// POST /profile/{username}/follow/
#[post("/profile/{username}/follow/")]
pub async fn profile_follow(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = state
        .repo
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;
    let outcome = state.follows.follow(user.user_id, &author).await?;
    debug!("follow {} -> {}: {:?}", user.username, author.username, outcome);
    Ok(redirect(&urls::profile(&author.username)))
}

/// POST /profile/{username}/unfollow/
#[post("/profile/{username}/unfollow/")]
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.follows.unfollow(user.user_id, &username).await?;
    Ok(redirect(&urls::profile(&username)))
}
