pub mod memory_repository;
pub mod pg_repository;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::comment::{Comment, NewComment};
use crate::models::group::{Group, NewGroup};
use crate::models::post::{NewPost, Post, PostChanges, PostFilter};
use crate::models::user::User;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found")]
    NotFound,
    #[error("invalid data: {0}")]
    Invalid(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage seam for everything the blog persists.
///
/// `list_posts` applies the filter only; ordering is the caller's job.
/// `insert_follow` must be idempotent at the storage level: two concurrent
/// inserts of the same pair leave exactly one edge, and the second reports `false`.
#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn create_user(&self, username: &str) -> RepoResult<User>;
    async fn find_user_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    async fn create_group(&self, group: NewGroup) -> RepoResult<Group>;
    async fn find_group_by_id(&self, id: i64) -> RepoResult<Option<Group>>;
    async fn find_group_by_slug(&self, slug: &str) -> RepoResult<Option<Group>>;
    async fn list_groups(&self) -> RepoResult<Vec<Group>>;

    async fn create_post(&self, post: NewPost) -> RepoResult<Post>;
    async fn update_post(&self, id: i64, changes: PostChanges) -> RepoResult<Post>;
    /// Removes the post and its comments. Returns `false` if the post did not exist.
    async fn delete_post(&self, id: i64) -> RepoResult<bool>;
    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>>;
    async fn list_posts(&self, filter: &PostFilter) -> RepoResult<Vec<Post>>;
    async fn count_posts(&self, filter: &PostFilter) -> RepoResult<usize>;

    async fn create_comment(&self, comment: NewComment) -> RepoResult<Comment>;
    /// Comments of one post, oldest first.
    async fn list_comments(&self, post_id: i64) -> RepoResult<Vec<Comment>>;

    /// Returns `true` when a new edge was stored.
    async fn insert_follow(&self, user_id: Uuid, author_id: Uuid) -> RepoResult<bool>;
    /// Returns `true` when an edge was removed.
    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> RepoResult<bool>;
    async fn follow_exists(&self, user_id: Uuid, author_id: Uuid) -> RepoResult<bool>;
    async fn followed_author_ids(&self, user_id: Uuid) -> RepoResult<Vec<Uuid>>;
}
