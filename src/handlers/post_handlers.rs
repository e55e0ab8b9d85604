// src/handlers/post_handlers.rs - post detail, authoring and comments

use actix_web::{HttpResponse, get, post, web};

use crate::AppState;
use crate::dtos::api_dtos::ApiResponse;
use crate::dtos::post_dtos::{CommentForm, FormErrors, PostForm};
use crate::error::{AppResult, redirect};
use crate::handlers::render;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::services::post_service::FormOutcome;
use crate::urls;

/// GET /posts/{post_id}/
#[get("/posts/{post_id}/")]
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: Option<AuthenticatedUser>,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let ctx = state
        .feeds
        .post_detail(post_id.into_inner(), viewer.map(|v| v.user_id))
        .await?;
    render("Post retrieved successfully", ctx)
}

/// GET /create/
#[get("/create/")]
pub async fn post_create_form(state: web::Data<AppState>, _user: AuthenticatedUser) -> AppResult<HttpResponse> {
    let ctx = state.posts.form_context(None, PostForm::default(), FormErrors::default()).await?;
    render("New post form", ctx)
}

/// POST /create/
/// Redirects to the author's profile on success.
#[post("/create/")]
pub async fn post_create(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();
    match state.posts.create_post(user.user_id, &form).await? {
        FormOutcome::Saved(_) => Ok(redirect(&urls::profile(&user.username))),
        FormOutcome::Invalid(errors) => {
            let ctx = state.posts.form_context(None, form, errors).await?;
            Ok(HttpResponse::BadRequest().json(ApiResponse::invalid("Please correct the errors below", ctx)))
        }
    }
}

/// GET /posts/{post_id}/edit/
#[get("/posts/{post_id}/edit/")]
pub async fn post_edit_form(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let ctx = state.posts.edit_form(user.user_id, post_id.into_inner()).await?;
    render("Edit post form", ctx)
}

/// POST /posts/{post_id}/edit/
/// Non-authors are redirected to the index.
#[post("/posts/{post_id}/edit/")]
pub async fn post_edit(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    post_id: web::Path<i64>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    let form = body.into_inner();
    match state.posts.edit_post(user.user_id, post_id, &form).await? {
        FormOutcome::Saved(post) => Ok(redirect(&urls::post_detail(post.id))),
        FormOutcome::Invalid(errors) => {
            let mut ctx = state.posts.edit_form(user.user_id, post_id).await?;
            ctx.form = form;
            ctx.errors = errors;
            Ok(HttpResponse::BadRequest().json(ApiResponse::invalid("Please correct the errors below", ctx)))
        }
    }
}

/// POST /posts/{post_id}/add_comment/
/// Always lands back on the post, whether or not the comment was saved.
#[post("/posts/{post_id}/add_comment/")]
pub async fn add_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    post_id: web::Path<i64>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    state.posts.add_comment(user.user_id, post_id, &body).await?;
    Ok(redirect(&urls::post_detail(post_id)))
}
