//! Paths the service redirects to.

use actix_web::HttpRequest;

/// Path plus query string of the current request.
pub fn full_path(req: &HttpRequest) -> String {
    match req.uri().path_and_query() {
        Some(pq) => pq.as_str().to_string(),
        None => req.path().to_string(),
    }
}

pub fn index() -> String {
    "/".to_string()
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

pub fn post_detail(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}
