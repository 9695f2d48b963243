use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::data::image_store::SharedImageStore;
use crate::data::post_repository::{NewPost, PostPatch, SharedPostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{
    AddCommentRequest, Comment, CreatePostRequest, ImageFile, Post, PostId, UpdatePostRequest,
};

pub(crate) struct PostService {
    repo: SharedPostRepository,
    images: SharedImageStore,
}

impl PostService {
    pub(crate) fn new(repo: SharedPostRepository, images: SharedImageStore) -> Self {
        Self { repo, images }
    }

    pub(crate) async fn create_post(
        &self,
        req: CreatePostRequest,
        image: Option<ImageFile>,
    ) -> Result<Post, DomainError> {
        let draft = req.validate()?;
        let local_image_path = self.store_image(image).await?;

        let new_post = NewPost {
            title: draft.title,
            content: draft.content,
            image_url: draft.image_url,
            local_image_path: local_image_path.clone(),
            tags: draft.tags,
            user_id: draft.user_id,
            secret_key: draft.secret_key,
            repost_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        };
        let post = match self.repo.create_post(new_post).await {
            Ok(post) => post,
            Err(err) => {
                self.discard_image(local_image_path.as_deref()).await;
                return Err(err);
            }
        };
        info!(post_id = %post.id, user_id = %post.user_id, "post created");
        Ok(post)
    }

    pub(crate) async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.repo.list_posts().await
    }

    pub(crate) async fn get_post(&self, id: &PostId) -> Result<Post, DomainError> {
        self.repo
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn update_post(
        &self,
        id: &PostId,
        req: UpdatePostRequest,
        image: Option<ImageFile>,
    ) -> Result<Post, DomainError> {
        let current = self.get_post(id).await?;
        self.authorize(&current, req.secret_key.as_deref())?;

        let changes = req.validate()?;
        let local_image_path = self.store_image(image).await?;
        let patch = PostPatch {
            changes,
            local_image_path: local_image_path.clone(),
            secret_key: req.secret_key.unwrap_or_default(),
            updated_at: Utc::now(),
        };

        let updated = self
            .repo
            .update_post(id, patch)
            .await
            .and_then(|post| post.ok_or_else(|| DomainError::NotFound(format!("post id: {id}"))));
        let post = match updated {
            Ok(post) => post,
            Err(err) => {
                self.discard_image(local_image_path.as_deref()).await;
                return Err(err);
            }
        };
        info!(post_id = %post.id, "post updated");
        Ok(post)
    }

    pub(crate) async fn delete_post(
        &self,
        id: &PostId,
        secret_key: Option<&str>,
    ) -> Result<(), DomainError> {
        let current = self.get_post(id).await?;
        self.authorize(&current, secret_key)?;

        let deleted = self.repo.delete_post(id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {id}")));
        }
        info!(post_id = %id, "post deleted");
        Ok(())
    }

    pub(crate) async fn upvote_post(&self, id: &PostId) -> Result<Post, DomainError> {
        self.repo
            .increment_upvotes(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn add_comment(
        &self,
        id: &PostId,
        req: AddCommentRequest,
    ) -> Result<Comment, DomainError> {
        let comment = Comment {
            user_id: req.user_id.unwrap_or_default(),
            comment: req.comment.unwrap_or_default(),
            created_at: Utc::now(),
        };

        let matched = self.repo.push_comment(id, comment.clone()).await?;
        if !matched {
            return Err(DomainError::NotFound(format!("post id: {id}")));
        }
        Ok(comment)
    }

    fn authorize(&self, post: &Post, secret_key: Option<&str>) -> Result<(), DomainError> {
        post.authorize(secret_key).inspect_err(|_| {
            warn!(post_id = %post.id, "secret key mismatch");
        })
    }

    async fn store_image(&self, image: Option<ImageFile>) -> Result<Option<String>, DomainError> {
        match image {
            Some(image) => Ok(Some(self.images.save_image(image).await?)),
            None => Ok(None),
        }
    }

    /// Best effort: the store write already failed, so a cleanup error is only logged.
    async fn discard_image(&self, path: Option<&str>) {
        let Some(path) = path else {
            return;
        };
        if let Err(err) = self.images.remove_image(path).await {
            warn!(path, error = %err, "failed to remove orphaned upload");
        }
    }
}
