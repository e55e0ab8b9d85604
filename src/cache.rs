//! Full-page response cache.
//!
//! Keys are request path plus query string, values are the rendered body.
//! Entries expire after a fixed time-to-live; nothing invalidates them early
//! except `clear`.

use std::time::Duration;

use actix_web::HttpRequest;
use actix_web::web::Bytes;
use moka::future::Cache;

const MAX_ENTRIES: u64 = 10_000;

#[derive(Clone)]
pub struct PageCache {
    pages: Cache<String, Bytes>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        let pages = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(ttl)
            .build();
        Self { pages }
    }

    pub fn key_for(req: &HttpRequest) -> String {
        crate::urls::full_path(req)
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.pages.get(key).await
    }

    pub async fn insert(&self, key: String, body: Bytes) {
        self.pages.insert(key, body).await;
    }

    pub fn clear(&self) {
        self.pages.invalidate_all();
    }
}
