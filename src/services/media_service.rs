// src/services/media_service.rs - uploaded files on local disk

use std::path::PathBuf;

use log::{info, warn};
use uuid::Uuid;

use crate::dtos::post_dtos::DecodedImage;
use crate::error::{AppError, AppResult};

/// Post images live in this directory under the media root.
pub const POST_IMAGE_DIR: &str = "posts";

#[derive(Clone)]
pub struct MediaService {
    root: PathBuf,
}

impl MediaService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where a stored path such as `posts/<uuid>.gif` lives on disk.
    pub fn path_of(&self, stored: &str) -> PathBuf {
        self.root.join(stored)
    }

    /// Writes the image under a fresh name and returns its path relative to the media root.
    pub async fn save_post_image(&self, image: &DecodedImage) -> AppResult<String> {
        let dir = self.root.join(POST_IMAGE_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("failed to prepare {}: {}", dir.display(), e)))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), image.extension);
        let target = dir.join(&file_name);
        tokio::fs::write(&target, &image.bytes)
            .await
            .map_err(|e| AppError::Internal(format!("failed to write {}: {}", target.display(), e)))?;

        info!("stored {} bytes at {}", image.bytes.len(), target.display());
        Ok(format!("{}/{}", POST_IMAGE_DIR, file_name))
    }

    /// Best effort; used to drop a file whose post never got saved.
    pub async fn remove(&self, stored: &str) {
        let path = self.path_of(stored);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("could not remove {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_media() -> MediaService {
        MediaService::new(std::env::temp_dir().join(format!("yatube-media-{}", Uuid::new_v4())))
    }

    #[actix_web::test]
    async fn saved_image_is_readable_and_removable() {
        let media = temp_media();
        let image = DecodedImage { bytes: b"GIF89a".to_vec(), extension: "gif".into() };

        let stored = media.save_post_image(&image).await.unwrap();
        assert!(stored.starts_with("posts/"));
        assert!(stored.ends_with(".gif"));
        assert_eq!(tokio::fs::read(media.path_of(&stored)).await.unwrap(), b"GIF89a");

        let again = media.save_post_image(&image).await.unwrap();
        assert_ne!(stored, again);

        media.remove(&stored).await;
        assert!(!media.path_of(&stored).exists());
    }
}
