use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Post, PostChanges, PostId};
use crate::domain::tag::Tag;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image_url: Option<String>,
    pub(crate) local_image_path: Option<String>,
    pub(crate) tags: Vec<Tag>,
    pub(crate) user_id: String,
    pub(crate) secret_key: String,
    pub(crate) repost_id: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) changes: PostChanges,
    pub(crate) local_image_path: Option<String>,
    pub(crate) secret_key: String,
    pub(crate) updated_at: DateTime<Utc>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn list_posts(&self) -> Result<Vec<Post>, DomainError>;
    async fn get_post(&self, id: &PostId) -> Result<Option<Post>, DomainError>;
    async fn update_post(&self, id: &PostId, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: &PostId) -> Result<bool, DomainError>;
    async fn increment_upvotes(&self, id: &PostId) -> Result<Option<Post>, DomainError>;
    async fn push_comment(&self, id: &PostId, comment: Comment) -> Result<bool, DomainError>;
}

pub(crate) type SharedPostRepository = Arc<dyn PostRepository>;
