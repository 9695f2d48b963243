use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::ImageFile;

#[async_trait]
pub(crate) trait ImageStore: Send + Sync {
    /// Vets and persists an image, returning its server-relative path.
    async fn save_image(&self, image: ImageFile) -> Result<String, DomainError>;

    /// Removes an image previously returned by `save_image`.
    async fn remove_image(&self, path: &str) -> Result<(), DomainError>;
}

pub(crate) type SharedImageStore = Arc<dyn ImageStore>;
