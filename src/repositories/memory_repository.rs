// src/repositories/memory_repository.rs - in-process store for local runs and tests

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::comment::{Comment, NewComment};
use crate::models::group::{Group, GroupRef, NewGroup};
use crate::models::post::{Author, NewPost, Post, PostChanges, PostFilter};
use crate::models::user::User;
use crate::repositories::{BlogRepository, RepoError, RepoResult};

struct PostRow {
    id: i64,
    author_id: Uuid,
    group_id: Option<i64>,
    text: String,
    image: Option<String>,
    pub_date: DateTime<Utc>,
}

struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: Uuid,
    text: String,
    created: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<PostRow>,
    comments: Vec<CommentRow>,
    // (user_id, author_id); the set is the uniqueness constraint
    follows: BTreeSet<(Uuid, Uuid)>,
    next_group_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
}

#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn author(&self, id: Uuid) -> RepoResult<Author> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| Author { id: u.id, username: u.username.clone() })
            .ok_or_else(|| RepoError::Invalid(format!("unknown user {}", id)))
    }

    fn group_ref(&self, id: i64) -> RepoResult<GroupRef> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .map(GroupRef::from)
            .ok_or_else(|| RepoError::Invalid(format!("unknown group {}", id)))
    }

    fn to_post(&self, row: &PostRow) -> RepoResult<Post> {
        Ok(Post {
            id: row.id,
            text: row.text.clone(),
            pub_date: row.pub_date,
            author: self.author(row.author_id)?,
            group: row.group_id.map(|id| self.group_ref(id)).transpose()?,
            image: row.image.clone(),
        })
    }

    fn to_comment(&self, row: &CommentRow) -> RepoResult<Comment> {
        Ok(Comment {
            id: row.id,
            post_id: row.post_id,
            author: self.author(row.author_id)?,
            text: row.text.clone(),
            created: row.created,
        })
    }

    fn filtered_posts(&self, filter: &PostFilter) -> RepoResult<Vec<Post>> {
        let mut out = Vec::new();
        for row in &self.posts {
            let post = self.to_post(row)?;
            if filter.matches(&post) {
                out.push(post);
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl BlogRepository for InMemoryRepository {
    async fn create_user(&self, username: &str) -> RepoResult<User> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.username == username) {
            return Err(RepoError::Conflict(format!("username '{}' is taken", username)));
        }
        let user = User { id: Uuid::new_v4(), username: username.to_string() };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_group(&self, group: NewGroup) -> RepoResult<Group> {
        group.validate().map_err(RepoError::Invalid)?;
        let mut t = self.tables.write().await;
        if t.groups.iter().any(|g| g.slug == group.slug) {
            return Err(RepoError::Conflict(format!("slug '{}' is taken", group.slug)));
        }
        t.next_group_id += 1;
        let created = Group {
            id: t.next_group_id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        t.groups.push(created.clone());
        Ok(created)
    }

    async fn find_group_by_id(&self, id: i64) -> RepoResult<Option<Group>> {
        let t = self.tables.read().await;
        Ok(t.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn find_group_by_slug(&self, slug: &str) -> RepoResult<Option<Group>> {
        let t = self.tables.read().await;
        Ok(t.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list_groups(&self) -> RepoResult<Vec<Group>> {
        let t = self.tables.read().await;
        let mut groups = t.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }

    async fn create_post(&self, post: NewPost) -> RepoResult<Post> {
        let mut t = self.tables.write().await;
        t.author(post.author_id)?;
        if let Some(group_id) = post.group_id {
            t.group_ref(group_id)?;
        }
        t.next_post_id += 1;
        let row = PostRow {
            id: t.next_post_id,
            author_id: post.author_id,
            group_id: post.group_id,
            text: post.text,
            image: post.image,
            pub_date: Utc::now(),
        };
        let created = t.to_post(&row)?;
        t.posts.push(row);
        Ok(created)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> RepoResult<Post> {
        let mut t = self.tables.write().await;
        if let Some(group_id) = changes.group_id {
            t.group_ref(group_id)?;
        }
        let idx = t.posts.iter().position(|p| p.id == id).ok_or(RepoError::NotFound)?;
        let row = &mut t.posts[idx];
        row.text = changes.text;
        row.group_id = changes.group_id;
        row.image = changes.image;
        t.to_post(&t.posts[idx])
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.posts.len();
        t.posts.retain(|p| p.id != id);
        if t.posts.len() == before {
            return Ok(false);
        }
        t.comments.retain(|c| c.post_id != id);
        Ok(true)
    }

    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>> {
        let t = self.tables.read().await;
        t.posts.iter().find(|p| p.id == id).map(|row| t.to_post(row)).transpose()
    }

    async fn list_posts(&self, filter: &PostFilter) -> RepoResult<Vec<Post>> {
        let t = self.tables.read().await;
        t.filtered_posts(filter)
    }

    async fn count_posts(&self, filter: &PostFilter) -> RepoResult<usize> {
        let t = self.tables.read().await;
        Ok(t.filtered_posts(filter)?.len())
    }

    async fn create_comment(&self, comment: NewComment) -> RepoResult<Comment> {
        let mut t = self.tables.write().await;
        t.author(comment.author_id)?;
        if !t.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(RepoError::NotFound);
        }
        t.next_comment_id += 1;
        let row = CommentRow {
            id: t.next_comment_id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created: Utc::now(),
        };
        let created = t.to_comment(&row)?;
        t.comments.push(row);
        Ok(created)
    }

    async fn list_comments(&self, post_id: i64) -> RepoResult<Vec<Comment>> {
        let t = self.tables.read().await;
        let mut comments = t
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| t.to_comment(c))
            .collect::<RepoResult<Vec<_>>>()?;
        comments.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn insert_follow(&self, user_id: Uuid, author_id: Uuid) -> RepoResult<bool> {
        if user_id == author_id {
            return Err(RepoError::Invalid("a user cannot follow itself".to_string()));
        }
        let mut t = self.tables.write().await;
        t.author(user_id)?;
        t.author(author_id)?;
        Ok(t.follows.insert((user_id, author_id)))
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        Ok(t.follows.remove(&(user_id, author_id)))
    }

    async fn follow_exists(&self, user_id: Uuid, author_id: Uuid) -> RepoResult<bool> {
        let t = self.tables.read().await;
        Ok(t.follows.contains(&(user_id, author_id)))
    }

    async fn followed_author_ids(&self, user_id: Uuid) -> RepoResult<Vec<Uuid>> {
        let t = self.tables.read().await;
        Ok(t
            .follows
            .iter()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, author)| *author)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn follow_pair_is_unique() {
        let repo = InMemoryRepository::new();
        let a = repo.create_user("a").await.unwrap();
        let b = repo.create_user("b").await.unwrap();

        assert!(repo.insert_follow(a.id, b.id).await.unwrap());
        assert!(!repo.insert_follow(a.id, b.id).await.unwrap());
        assert_eq!(repo.followed_author_ids(a.id).await.unwrap(), vec![b.id]);
        assert!(repo.followed_author_ids(b.id).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn self_follow_is_rejected_by_storage() {
        let repo = InMemoryRepository::new();
        let a = repo.create_user("a").await.unwrap();
        assert!(matches!(repo.insert_follow(a.id, a.id).await, Err(RepoError::Invalid(_))));
    }

    #[actix_web::test]
    async fn deleting_post_cascades_to_comments() {
        let repo = InMemoryRepository::new();
        let u = repo.create_user("writer").await.unwrap();
        let post = repo
            .create_post(NewPost { author_id: u.id, text: "hello".into(), group_id: None, image: None })
            .await
            .unwrap();
        repo.create_comment(NewComment { post_id: post.id, author_id: u.id, text: "first".into() })
            .await
            .unwrap();
        assert_eq!(repo.list_comments(post.id).await.unwrap().len(), 1);

        assert!(repo.delete_post(post.id).await.unwrap());
        assert!(repo.find_post(post.id).await.unwrap().is_none());
        assert!(repo.list_comments(post.id).await.unwrap().is_empty());
        assert!(!repo.delete_post(post.id).await.unwrap());
    }

    #[actix_web::test]
    async fn duplicate_username_and_slug_conflict() {
        let repo = InMemoryRepository::new();
        repo.create_user("dup").await.unwrap();
        assert!(matches!(repo.create_user("dup").await, Err(RepoError::Conflict(_))));

        let g = NewGroup { title: "G".into(), slug: "g".into(), description: String::new() };
        repo.create_group(g.clone()).await.unwrap();
        assert!(matches!(repo.create_group(g).await, Err(RepoError::Conflict(_))));
    }

    #[actix_web::test]
    async fn post_with_unknown_group_is_invalid() {
        let repo = InMemoryRepository::new();
        let u = repo.create_user("writer").await.unwrap();
        let res = repo
            .create_post(NewPost { author_id: u.id, text: "x".into(), group_id: Some(42), image: None })
            .await;
        assert!(matches!(res, Err(RepoError::Invalid(_))));
    }
}
