// src/repositories/pg_repository.rs - PostgreSQL storage over the deadpool pool

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use uuid::Uuid;

use crate::models::comment::{Comment, NewComment};
use crate::models::group::{Group, GroupRef, NewGroup};
use crate::models::post::{Author, NewPost, Post, PostChanges, PostFilter};
use crate::models::user::User;
use crate::repositories::{BlogRepository, RepoError, RepoResult};

const POST_SELECT: &str = "
    SELECT p.id, p.text, p.pub_date, p.image,
           u.id AS author_id, u.username AS author_username,
           g.id AS group_id, g.slug AS group_slug, g.title AS group_title
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_groups g ON g.id = p.group_id";

const COMMENT_SELECT: &str = "
    SELECT c.id, c.post_id, c.text, c.created,
           u.id AS author_id, u.username AS author_username
    FROM comments c
    JOIN users u ON u.id = c.author_id";

#[derive(Clone)]
pub struct PgRepository {
    pool: Pool,
}

impl PgRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Applies `migrations/0001_init.sql`. Statements are idempotent.
    pub async fn migrate(&self) -> RepoResult<()> {
        let client = self.pool.get().await?;
        client.batch_execute(include_str!("../../migrations/0001_init.sql")).await?;
        Ok(())
    }
}

fn post_from_row(row: &Row) -> Post {
    let group_id: Option<i64> = row.get("group_id");
    Post {
        id: row.get("id"),
        text: row.get("text"),
        pub_date: row.get("pub_date"),
        image: row.get("image"),
        author: Author { id: row.get("author_id"), username: row.get("author_username") },
        group: group_id.map(|id| GroupRef {
            id,
            slug: row.get("group_slug"),
            title: row.get("group_title"),
        }),
    }
}

fn comment_from_row(row: &Row) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        text: row.get("text"),
        created: row.get("created"),
        author: Author { id: row.get("author_id"), username: row.get("author_username") },
    }
}

fn group_from_row(row: &Row) -> Group {
    Group {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
    }
}

/// Maps constraint violations to domain errors, everything else to `Database`.
fn classify(e: tokio_postgres::Error) -> RepoError {
    match e.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => RepoError::Conflict(e.to_string()),
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION || *code == SqlState::CHECK_VIOLATION => {
            RepoError::Invalid(e.to_string())
        }
        _ => RepoError::Database(e),
    }
}

/// WHERE clause and parameters for a post filter. Parameter numbering starts at $1.
fn filter_clause(filter: &PostFilter) -> (&'static str, Vec<&(dyn ToSql + Sync)>) {
    match filter {
        PostFilter::All => ("", Vec::new()),
        PostFilter::Group(id) => (" WHERE p.group_id = $1", vec![id as &(dyn ToSql + Sync)]),
        PostFilter::Author(id) => (" WHERE p.author_id = $1", vec![id as &(dyn ToSql + Sync)]),
        PostFilter::Authors(ids) => (" WHERE p.author_id = ANY($1)", vec![ids as &(dyn ToSql + Sync)]),
    }
}

#[async_trait]
impl BlogRepository for PgRepository {
    async fn create_user(&self, username: &str) -> RepoResult<User> {
        let client = self.pool.get().await?;
        let id = Uuid::new_v4();
        client
            .execute("INSERT INTO users (id, username) VALUES ($1, $2)", &[&id, &username])
            .await
            .map_err(classify)?;
        Ok(User { id, username: username.to_string() })
    }

    async fn find_user_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT id, username FROM users WHERE id = $1", &[&id])
            .await?;
        Ok(row.map(|r| User { id: r.get("id"), username: r.get("username") }))
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT id, username FROM users WHERE username = $1", &[&username])
            .await?;
        Ok(row.map(|r| User { id: r.get("id"), username: r.get("username") }))
    }

    async fn create_group(&self, group: NewGroup) -> RepoResult<Group> {
        group.validate().map_err(RepoError::Invalid)?;
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO post_groups (title, slug, description) VALUES ($1, $2, $3)
                 RETURNING id, title, slug, description",
                &[&group.title, &group.slug, &group.description],
            )
            .await
            .map_err(classify)?;
        Ok(group_from_row(&row))
    }

    async fn find_group_by_id(&self, id: i64) -> RepoResult<Option<Group>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT id, title, slug, description FROM post_groups WHERE id = $1", &[&id])
            .await?;
        Ok(row.as_ref().map(group_from_row))
    }

    async fn find_group_by_slug(&self, slug: &str) -> RepoResult<Option<Group>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT id, title, slug, description FROM post_groups WHERE slug = $1", &[&slug])
            .await?;
        Ok(row.as_ref().map(group_from_row))
    }

    async fn list_groups(&self) -> RepoResult<Vec<Group>> {
        let client = self.pool.get().await?;
        let rows = client
            .query("SELECT id, title, slug, description FROM post_groups ORDER BY title", &[])
            .await?;
        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn create_post(&self, post: NewPost) -> RepoResult<Post> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO posts (author_id, text, group_id, image) VALUES ($1, $2, $3, $4) RETURNING id",
                &[&post.author_id, &post.text, &post.group_id, &post.image],
            )
            .await
            .map_err(classify)?;
        let id: i64 = row.get("id");
        drop(client);
        self.find_post(id).await?.ok_or(RepoError::NotFound)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> RepoResult<Post> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE posts SET text = $2, group_id = $3, image = $4 WHERE id = $1",
                &[&id, &changes.text, &changes.group_id, &changes.image],
            )
            .await
            .map_err(classify)?;
        if updated == 0 {
            return Err(RepoError::NotFound);
        }
        drop(client);
        self.find_post(id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        let client = self.pool.get().await?;
        // comments go with the post via ON DELETE CASCADE
        let deleted = client.execute("DELETE FROM posts WHERE id = $1", &[&id]).await?;
        Ok(deleted > 0)
    }

    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>> {
        let client = self.pool.get().await?;
        let sql = format!("{} WHERE p.id = $1", POST_SELECT);
        let row = client.query_opt(sql.as_str(), &[&id]).await?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn list_posts(&self, filter: &PostFilter) -> RepoResult<Vec<Post>> {
        let client = self.pool.get().await?;
        let (clause, params) = filter_clause(filter);
        let sql = format!("{}{} ORDER BY p.pub_date DESC, p.id DESC", POST_SELECT, clause);
        let rows = client.query(sql.as_str(), &params).await?;
        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn count_posts(&self, filter: &PostFilter) -> RepoResult<usize> {
        let client = self.pool.get().await?;
        let (clause, params) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) AS n FROM posts p{}", clause);
        let row = client.query_one(sql.as_str(), &params).await?;
        let n: i64 = row.get("n");
        Ok(usize::try_from(n).unwrap_or_default())
    }

    async fn create_comment(&self, comment: NewComment) -> RepoResult<Comment> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO comments (post_id, author_id, text) VALUES ($1, $2, $3) RETURNING id",
                &[&comment.post_id, &comment.author_id, &comment.text],
            )
            .await
            .map_err(classify)?;
        let id: i64 = row.get("id");
        let sql = format!("{} WHERE c.id = $1", COMMENT_SELECT);
        let row = client.query_one(sql.as_str(), &[&id]).await?;
        Ok(comment_from_row(&row))
    }

    async fn list_comments(&self, post_id: i64) -> RepoResult<Vec<Comment>> {
        let client = self.pool.get().await?;
        let sql = format!("{} WHERE c.post_id = $1 ORDER BY c.created, c.id", COMMENT_SELECT);
        let rows = client.query(sql.as_str(), &[&post_id]).await?;
        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn insert_follow(&self, user_id: Uuid, author_id: Uuid) -> RepoResult<bool> {
        let client = self.pool.get().await?;
        let inserted = client
            .execute(
                "INSERT INTO follows (user_id, author_id) VALUES ($1, $2)
                 ON CONFLICT (user_id, author_id) DO NOTHING",
                &[&user_id, &author_id],
            )
            .await
            .map_err(classify)?;
        Ok(inserted > 0)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> RepoResult<bool> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute("DELETE FROM follows WHERE user_id = $1 AND author_id = $2", &[&user_id, &author_id])
            .await?;
        Ok(deleted > 0)
    }

    async fn follow_exists(&self, user_id: Uuid, author_id: Uuid) -> RepoResult<bool> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2) AS present",
                &[&user_id, &author_id],
            )
            .await?;
        Ok(row.get("present"))
    }

    async fn followed_author_ids(&self, user_id: Uuid) -> RepoResult<Vec<Uuid>> {
        let client = self.pool.get().await?;
        let rows = client
            .query("SELECT author_id FROM follows WHERE user_id = $1", &[&user_id])
            .await?;
        Ok(rows.iter().map(|r| r.get("author_id")).collect())
    }
}
