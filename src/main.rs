// src/main.rs
mod cache;
mod config;
mod dtos;
mod error;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod services;
mod urls;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{error, info};

use crate::cache::PageCache;
use crate::config::{Settings, StorageBackend};
use crate::handlers::feed_handlers::{follow_index, group_posts, index, profile};
use crate::handlers::follow_handlers::{profile_follow, profile_unfollow};
use crate::handlers::post_handlers::{
    add_comment, post_create, post_create_form, post_detail, post_edit, post_edit_form,
};
use crate::repositories::BlogRepository;
use crate::repositories::memory_repository::InMemoryRepository;
use crate::repositories::pg_repository::PgRepository;
use crate::services::feed_service::FeedService;
use crate::services::follow_service::FollowService;
use crate::services::media_service::MediaService;
use crate::services::post_service::PostService;

pub struct AppState {
    pub repo: Arc<dyn BlogRepository>,
    pub feeds: FeedService,
    pub follows: FollowService,
    pub posts: PostService,
    pub page_cache: PageCache,
    pub settings: Settings,
}

impl AppState {
    pub fn new(repo: Arc<dyn BlogRepository>, settings: Settings) -> Self {
        let follows = FollowService::new(repo.clone());
        Self {
            feeds: FeedService::new(repo.clone(), follows.clone(), settings.page_size),
            posts: PostService::new(repo.clone(), MediaService::new(settings.media_root.clone())),
            page_cache: PageCache::new(settings.index_cache_ttl),
            follows,
            repo,
            settings,
        }
    }
}

/// Every route of the site.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(group_posts)
        .service(profile_follow)
        .service(profile_unfollow)
        .service(profile)
        .service(post_create_form)
        .service(post_create)
        .service(post_detail)
        .service(post_edit_form)
        .service(post_edit)
        .service(add_comment)
        .service(follow_index);
}

async fn build_repository(settings: &Settings) -> anyhow::Result<Arc<dyn BlogRepository>> {
    match settings.storage {
        StorageBackend::Memory => {
            info!("Using in-memory storage, data is lost on restart");
            Ok(Arc::new(InMemoryRepository::new()))
        }
        StorageBackend::Postgres => {
            let repo = PgRepository::new(config::get_pg_pool()?);
            repo.migrate().await?;
            Ok(Arc::new(repo))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let repo = match build_repository(&settings).await {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to set up storage: {:#}", e);
            std::process::exit(1);
        }
    };

    let bind_address = format!("0.0.0.0:{}", settings.port);
    let allowed_origins = settings.allowed_origins.clone();
    let max_body_bytes = settings.max_body_bytes;
    info!(
        "Starting server on {} ({} posts per page, index cached for {:?})",
        bind_address, settings.page_size, settings.index_cache_ttl
    );

    let state = web::Data::new(AppState::new(repo, settings));

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type", "accept"])
            .supports_credentials()
            .max_age(3600);
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(handlers::path_config())
            .app_data(handlers::json_config(max_body_bytes))
            .configure(routes)
            .default_service(web::route().to(handlers::not_found))
    })
    .bind(&bind_address)?
    .run()
    .await
}
