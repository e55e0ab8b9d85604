// src/services/feed_service.rs - ordered, paginated post collections

use std::num::NonZeroUsize;
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::dtos::post_dtos::{GroupContext, PostDetailContext, ProfileContext};
use crate::error::{AppError, AppResult};
use crate::models::post::{Post, PostFilter};
use crate::repositories::BlogRepository;
use crate::services::follow_service::FollowService;
use crate::services::pagination::{Page, paginate};

#[derive(Clone)]
pub struct FeedService {
    repo: Arc<dyn BlogRepository>,
    follows: FollowService,
    page_size: NonZeroUsize,
}

/// Newest first; equal timestamps fall back to the later insertion first.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then_with(|| b.id.cmp(&a.id)));
}

impl FeedService {
    pub fn new(repo: Arc<dyn BlogRepository>, follows: FollowService, page_size: NonZeroUsize) -> Self {
        Self { repo, follows, page_size }
    }

    async fn compose(&self, filter: PostFilter, page: Option<i64>) -> AppResult<Page<Post>> {
        let mut posts = self.repo.list_posts(&filter).await?;
        sort_newest_first(&mut posts);
        let page = paginate(posts, self.page_size, page);
        debug!(
            "feed {:?}: page {} of {}, {} posts shown",
            filter,
            page.number,
            page.num_pages,
            page.len()
        );
        Ok(page)
    }

    pub async fn index(&self, page: Option<i64>) -> AppResult<Page<Post>> {
        self.compose(PostFilter::All, page).await
    }

    pub async fn group(&self, slug: &str, page: Option<i64>) -> AppResult<GroupContext> {
        let group = self
            .repo
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))?;
        debug!("group feed for {}", group);
        let page_obj = self.compose(PostFilter::Group(group.id), page).await?;
        Ok(GroupContext { group, page_obj })
    }

    /// `viewer` is the authenticated user, if any.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
        page: Option<i64>,
    ) -> AppResult<ProfileContext> {
        let author = self
            .repo
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;
        let page_obj = self.compose(PostFilter::Author(author.id), page).await?;
        let following = match viewer {
            Some(viewer_id) => self.follows.is_following(viewer_id, author.id).await?,
            None => false,
        };
        Ok(ProfileContext {
            post_count: page_obj.count,
            following,
            author,
            page_obj,
        })
    }

    pub async fn following(&self, viewer: Uuid, page: Option<i64>) -> AppResult<Page<Post>> {
        let authors = self.follows.followed_authors(viewer).await?;
        let page = self.compose(PostFilter::Authors(authors.into_iter().collect()), page).await?;
        if page.is_empty() {
            debug!("nothing to show in the following feed of {}", viewer);
        }
        Ok(page)
    }

    pub async fn post_detail(&self, post_id: i64, viewer: Option<Uuid>) -> AppResult<PostDetailContext> {
        let post = self
            .repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;
        let post_count = self.repo.count_posts(&PostFilter::Author(post.author.id)).await?;
        let comments = self.repo.list_comments(post_id).await?;
        let can_edit = viewer.is_some_and(|id| post.is_authored_by(id));
        Ok(PostDetailContext { post, post_count, comments, can_edit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::comment::NewComment;
    use crate::models::group::NewGroup;
    use crate::models::post::{NewPost, PostChanges};
    use crate::models::user::User;
    use crate::repositories::memory_repository::InMemoryRepository;

    fn service(repo: Arc<InMemoryRepository>) -> FeedService {
        FeedService::new(
            repo.clone(),
            FollowService::new(repo),
            NonZeroUsize::new(10).unwrap(),
        )
    }

    async fn write(repo: &InMemoryRepository, author: &User, text: &str, group: Option<i64>) -> Post {
        repo.create_post(NewPost {
            author_id: author.id,
            text: text.to_string(),
            group_id: group,
            image: None,
        })
        .await
        .unwrap()
    }

    #[actix_web::test]
    async fn thirteen_posts_split_ten_and_three_on_every_feed() {
        let repo = Arc::new(InMemoryRepository::new());
        let user = repo.create_user("Testname").await.unwrap();
        let group = repo
            .create_group(NewGroup {
                title: "Test title".into(),
                slug: "Test_slug".into(),
                description: "Test description".into(),
            })
            .await
            .unwrap();
        for i in 0..13 {
            write(&repo, &user, &format!("Test text {}", i), Some(group.id)).await;
        }
        let feeds = service(repo);

        assert_eq!(feeds.index(Some(1)).await.unwrap().len(), 10);
        assert_eq!(feeds.index(Some(2)).await.unwrap().len(), 3);
        assert_eq!(feeds.group("Test_slug", Some(1)).await.unwrap().page_obj.len(), 10);
        assert_eq!(feeds.group("Test_slug", Some(2)).await.unwrap().page_obj.len(), 3);
        let profile = feeds.profile("Testname", None, Some(2)).await.unwrap();
        assert_eq!(profile.page_obj.len(), 3);
        assert_eq!(profile.post_count, 13);
    }

    #[actix_web::test]
    async fn newest_post_comes_first() {
        let repo = Arc::new(InMemoryRepository::new());
        let user = repo.create_user("writer").await.unwrap();
        let first = write(&repo, &user, "first", None).await;
        let second = write(&repo, &user, "second", None).await;

        let page = service(repo).index(None).await.unwrap();
        let ids: Vec<i64> = page.object_list.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn equal_timestamps_order_by_id_descending() {
        let pub_date = chrono::Utc::now();
        let author = crate::models::post::Author { id: Uuid::new_v4(), username: "writer".into() };
        let post = |id: i64| Post {
            id,
            text: format!("post {}", id),
            pub_date,
            author: author.clone(),
            group: None,
            image: None,
        };
        let mut posts: Vec<Post> = [3, 7, 1, 5, 2, 6, 4].into_iter().map(post).collect();

        sort_newest_first(&mut posts);
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3, 2, 1]);

        let size = NonZeroUsize::new(3).unwrap();
        for number in 1..=3 {
            let page_ids = |posts: Vec<Post>| -> Vec<i64> {
                paginate(posts, size, Some(number)).object_list.iter().map(|p| p.id).collect()
            };
            let first = page_ids(posts.clone());
            let mut reshuffled = posts.clone();
            reshuffled.reverse();
            sort_newest_first(&mut reshuffled);
            assert_eq!(first, page_ids(posts.clone()));
            assert_eq!(first, page_ids(reshuffled));
        }
        assert_eq!(
            paginate(posts, size, Some(3)).object_list.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[actix_web::test]
    async fn post_joins_group_feed_only_after_edit() {
        let repo = Arc::new(InMemoryRepository::new());
        let user = repo.create_user("writer").await.unwrap();
        let group = repo
            .create_group(NewGroup { title: "Cats".into(), slug: "cats".into(), description: String::new() })
            .await
            .unwrap();
        let post = write(&repo, &user, "ungrouped", None).await;
        let feeds = service(repo.clone());

        assert!(feeds.group("cats", None).await.unwrap().page_obj.is_empty());

        repo.update_post(
            post.id,
            PostChanges { text: post.text.clone(), group_id: Some(group.id), image: None },
        )
        .await
        .unwrap();
        let ctx = feeds.group("cats", None).await.unwrap();
        assert_eq!(ctx.page_obj.object_list[0].id, post.id);
    }

    #[actix_web::test]
    async fn unknown_slug_and_username_are_not_found() {
        let feeds = service(Arc::new(InMemoryRepository::new()));
        assert!(matches!(feeds.group("missing", None).await, Err(AppError::NotFound(_))));
        assert!(matches!(feeds.profile("ghost", None, None).await, Err(AppError::NotFound(_))));
        assert!(matches!(feeds.post_detail(99, None).await, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn following_feed_contains_only_followed_authors() {
        let repo = Arc::new(InMemoryRepository::new());
        let reader = repo.create_user("reader").await.unwrap();
        let followed = repo.create_user("followed").await.unwrap();
        let other = repo.create_user("other").await.unwrap();
        let p = write(&repo, &followed, "followed post", None).await;
        let q = write(&repo, &other, "other post", None).await;
        let feeds = service(repo.clone());
        FollowService::new(repo).follow(reader.id, &followed).await.unwrap();

        let page = feeds.following(reader.id, None).await.unwrap();
        let ids: Vec<i64> = page.object_list.iter().map(|x| x.id).collect();
        assert!(ids.contains(&p.id));
        assert!(!ids.contains(&q.id));

        // nobody followed, nothing shown
        assert!(feeds.following(other.id, None).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn profile_reports_follow_status_for_viewer() {
        let repo = Arc::new(InMemoryRepository::new());
        let reader = repo.create_user("reader").await.unwrap();
        let author = repo.create_user("author").await.unwrap();
        let feeds = service(repo.clone());

        assert!(!feeds.profile("author", Some(reader.id), None).await.unwrap().following);
        FollowService::new(repo).follow(reader.id, &author).await.unwrap();
        assert!(feeds.profile("author", Some(reader.id), None).await.unwrap().following);
        assert!(!feeds.profile("author", None, None).await.unwrap().following);
    }

    #[actix_web::test]
    async fn post_detail_lists_comments_oldest_first() {
        let repo = Arc::new(InMemoryRepository::new());
        let author = repo.create_user("author").await.unwrap();
        let reader = repo.create_user("reader").await.unwrap();
        let post = write(&repo, &author, "post", None).await;
        write(&repo, &author, "another", None).await;
        for text in ["one", "two"] {
            repo.create_comment(NewComment { post_id: post.id, author_id: reader.id, text: text.into() })
                .await
                .unwrap();
        }

        let ctx = service(repo).post_detail(post.id, Some(author.id)).await.unwrap();
        assert_eq!(ctx.post_count, 2);
        let texts: Vec<&str> = ctx.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert!(ctx.can_edit);
    }
}
