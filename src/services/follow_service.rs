use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, info};
use uuid::Uuid;

use crate::models::follow::FollowOutcome;
use crate::models::user::User;
use crate::repositories::{BlogRepository, RepoResult};

/// Follow edges between users. Every operation is idempotent.
#[derive(Clone)]
pub struct FollowService {
    repo: Arc<dyn BlogRepository>,
}

impl FollowService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self { repo }
    }

    /// Self-follow is dropped without an error; the caller gets `SelfFollowIgnored`.
    pub async fn follow(&self, follower: Uuid, author: &User) -> RepoResult<FollowOutcome> {
        if follower == author.id {
            info!("user {} tried to follow itself, ignoring", follower);
            return Ok(FollowOutcome::SelfFollowIgnored);
        }
        // uniqueness is the storage layer's job, concurrent requests race safely there
        if self.repo.insert_follow(follower, author.id).await? {
            debug!("{} now follows {}", follower, author.username);
            Ok(FollowOutcome::Created)
        } else {
            Ok(FollowOutcome::AlreadyFollowing)
        }
    }

    /// Returns whether an edge was removed. Unknown usernames are a no-op.
    pub async fn unfollow(&self, follower: Uuid, author_username: &str) -> RepoResult<bool> {
        let Some(author) = self.repo.find_user_by_username(author_username).await? else {
            return Ok(false);
        };
        let removed = self.repo.delete_follow(follower, author.id).await?;
        if removed {
            debug!("{} unfollowed {}", follower, author.username);
        }
        Ok(removed)
    }

    pub async fn is_following(&self, follower: Uuid, author: Uuid) -> RepoResult<bool> {
        self.repo.follow_exists(follower, author).await
    }

    pub async fn followed_authors(&self, user: Uuid) -> RepoResult<BTreeSet<Uuid>> {
        Ok(self.repo.followed_author_ids(user).await?.into_iter().collect())
    }
}
