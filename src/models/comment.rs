use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::post::Author;

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author: Author,
    pub text: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: Uuid,
    pub text: String,
}
