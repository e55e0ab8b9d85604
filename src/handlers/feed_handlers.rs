// src/handlers/feed_handlers.rs - paginated listings

use actix_web::{HttpRequest, HttpResponse, get, web};
use log::debug;

use crate::AppState;
use crate::cache::PageCache;
use crate::dtos::post_dtos::{IndexContext, PageQuery};
use crate::error::AppResult;
use crate::handlers::{json_page, render, render_bytes};
use crate::middleware::auth_extractor::AuthenticatedUser;

/// GET /
/// Served from the page cache while the entry lives.
#[get("/")]
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: PageQuery,
) -> AppResult<HttpResponse> {
    let key = PageCache::key_for(&req);
    if let Some(body) = state.page_cache.get(&key).await {
        debug!("index served from cache: {}", key);
        return Ok(json_page(body));
    }

    let page_obj = state.feeds.index(query.number()).await?;
    let body = render_bytes("Posts retrieved successfully", IndexContext { page_obj })?;
    state.page_cache.insert(key, body.clone()).await;
    Ok(json_page(body))
}

/// GET /group/{slug}/
#[get("/group/{slug}/")]
pub async fn group_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: PageQuery,
) -> AppResult<HttpResponse> {
    let ctx = state.feeds.group(&slug, query.number()).await?;
    render("Group posts retrieved successfully", ctx)
}

/// GET /profile/{username}/
#[get("/profile/{username}/")]
pub async fn profile(
    state: web::Data<AppState>,
    viewer: Option<AuthenticatedUser>,
    username: web::Path<String>,
    query: PageQuery,
) -> AppResult<HttpResponse> {
    let viewer_id = viewer.map(|v| v.user_id);
    let ctx = state.feeds.profile(&username, viewer_id, query.number()).await?;
    render("Profile retrieved successfully", ctx)
}

/// GET /follow/
/// Posts by the authors the current user follows.
#[get("/follow/")]
pub async fn follow_index(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: PageQuery,
) -> AppResult<HttpResponse> {
    let page_obj = state.feeds.following(user.user_id, query.number()).await?;
    render("Followed posts retrieved successfully", IndexContext { page_obj })
}
