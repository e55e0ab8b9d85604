// src/services/post_service.rs - authoring: posts, edits, comments

use std::sync::Arc;

use log::{debug, error, info};
use uuid::Uuid;

use crate::dtos::post_dtos::{CommentForm, DecodedImage, FormErrors, ImageUpload, PostForm, PostFormContext};
use crate::error::{AppError, AppResult};
use crate::models::comment::{Comment, NewComment};
use crate::models::post::{NewPost, Post, PostChanges};
use crate::repositories::BlogRepository;
use crate::services::media_service::MediaService;
use crate::urls;

/// Either the saved object or the errors to show next to the form.
#[derive(Debug)]
pub enum FormOutcome<T> {
    Saved(T),
    Invalid(FormErrors),
}

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn BlogRepository>,
    media: MediaService,
}

impl PostService {
    pub fn new(repo: Arc<dyn BlogRepository>, media: MediaService) -> Self {
        Self { repo, media }
    }

    /// Returns the decoded upload alongside the errors so it is only decoded once.
    async fn validate(&self, form: &PostForm) -> AppResult<(FormErrors, Option<DecodedImage>)> {
        let mut errors = form.validate();
        if let Some(group_id) = form.group {
            if self.repo.find_group_by_id(group_id).await?.is_none() {
                errors.add("group", "Select a valid choice. That choice is not one of the available choices.");
            }
        }
        let image = match form.image.as_ref().map(ImageUpload::decode).transpose() {
            Ok(image) => image,
            Err(message) => {
                errors.add("image", message);
                None
            }
        };
        Ok((errors, image))
    }

    async fn store_image(&self, image: Option<DecodedImage>) -> AppResult<Option<String>> {
        match image {
            Some(image) => Ok(Some(self.media.save_post_image(&image).await?)),
            None => Ok(None),
        }
    }

    /// The repository write failed, so the just-stored file has no owner.
    async fn discard_image(&self, stored: Option<&str>, cause: &AppError) {
        if let Some(path) = stored {
            error!("dropping {} after failed save: {}", path, cause);
            self.media.remove(path).await;
        }
    }

    async fn load_post(&self, post_id: i64) -> AppResult<Post> {
        self.repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))
    }

    /// Non-authors are bounced to the index rather than shown a 403.
    async fn load_own_post(&self, editor: Uuid, post_id: i64) -> AppResult<Post> {
        let post = self.load_post(post_id).await?;
        if !post.is_authored_by(editor) {
            info!("user {} is not the author of post {}, redirecting", editor, post_id);
            return Err(AppError::RedirectForbidden { location: urls::index() });
        }
        Ok(post)
    }

    pub async fn form_context(
        &self,
        post: Option<Post>,
        form: PostForm,
        errors: FormErrors,
    ) -> AppResult<PostFormContext> {
        Ok(PostFormContext {
            is_edit: post.is_some(),
            post,
            form,
            errors,
            groups: self.repo.list_groups().await?,
        })
    }

    /// Context for `GET /posts/<id>/edit/`, prefilled from the post.
    pub async fn edit_form(&self, editor: Uuid, post_id: i64) -> AppResult<PostFormContext> {
        let post = self.load_own_post(editor, post_id).await?;
        let form = PostForm {
            text: post.text.clone(),
            group: post.group.as_ref().map(|g| g.id),
            image: None,
        };
        self.form_context(Some(post), form, FormErrors::default()).await
    }

    pub async fn create_post(&self, author: Uuid, form: &PostForm) -> AppResult<FormOutcome<Post>> {
        let (errors, image) = self.validate(form).await?;
        if !errors.is_empty() {
            return Ok(FormOutcome::Invalid(errors));
        }
        let image = self.store_image(image).await?;
        let created = self
            .repo
            .create_post(NewPost {
                author_id: author,
                text: form.text.trim().to_string(),
                group_id: form.group,
                image: image.clone(),
            })
            .await
            .map_err(AppError::from);
        let post = match created {
            Ok(post) => post,
            Err(e) => {
                self.discard_image(image.as_deref(), &e).await;
                return Err(e);
            }
        };
        info!("post {} \"{}\" created by {}", post.id, post, post.author.username);
        Ok(FormOutcome::Saved(post))
    }

    /// Ownership is checked before the form is looked at. Without a new upload the
    /// current image stays.
    pub async fn edit_post(&self, editor: Uuid, post_id: i64, form: &PostForm) -> AppResult<FormOutcome<Post>> {
        let current = self.load_own_post(editor, post_id).await?;
        let (errors, image) = self.validate(form).await?;
        if !errors.is_empty() {
            return Ok(FormOutcome::Invalid(errors));
        }
        let uploaded = self.store_image(image).await?;
        let updated = self
            .repo
            .update_post(
                post_id,
                PostChanges {
                    text: form.text.trim().to_string(),
                    group_id: form.group,
                    image: uploaded.clone().or(current.image),
                },
            )
            .await
            .map_err(AppError::from);
        let post = match updated {
            Ok(post) => post,
            Err(e) => {
                self.discard_image(uploaded.as_deref(), &e).await;
                return Err(e);
            }
        };
        info!("post {} edited", post.id);
        Ok(FormOutcome::Saved(post))
    }

    /// An invalid comment is dropped; the caller redirects either way.
    pub async fn add_comment(&self, author: Uuid, post_id: i64, form: &CommentForm) -> AppResult<Option<Comment>> {
        self.load_post(post_id).await?;
        if !form.validate().is_empty() {
            debug!("empty comment on post {} ignored", post_id);
            return Ok(None);
        }
        let comment = self
            .repo
            .create_comment(NewComment {
                post_id,
                author_id: author,
                text: form.text.trim().to_string(),
            })
            .await?;
        Ok(Some(comment))
    }
}
