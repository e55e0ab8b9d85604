use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::models::group::GroupRef;

/// Number of characters of the text used when a post is shown as a label.
const LABEL_LEN: usize = 15;

/// Author as embedded in a post row (joined from `users`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: Author,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
}

/// Row to insert. `pub_date` is set by the repository.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Fields an author may change on an existing post.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Predicate applied by the repository when listing posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(Uuid),
    Authors(Vec<Uuid>),
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group.as_ref().map(|g| g.id) == Some(*group_id),
            PostFilter::Author(author_id) => post.author.id == *author_id,
            PostFilter::Authors(ids) => ids.contains(&post.author.id),
        }
    }
}

impl Post {
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author.id == user_id
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: String = self.text.chars().take(LABEL_LEN).collect();
        f.write_str(&label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str) -> Post {
        Post {
            id: 1,
            text: text.to_string(),
            pub_date: Utc::now(),
            author: Author { id: Uuid::new_v4(), username: "auth".into() },
            group: None,
            image: None,
        }
    }

    #[test]
    fn display_is_text_prefix() {
        assert_eq!(post("short post").to_string(), "short post");
        assert_eq!(post("a much longer post text here").to_string(), "a much longer p");
    }

    #[test]
    fn group_filter_skips_posts_without_group() {
        let p = post("no group");
        assert!(!PostFilter::Group(1).matches(&p));
        assert!(PostFilter::All.matches(&p));
    }
}
