use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::data::image_store::ImageStore;
use crate::domain::error::DomainError;
use crate::domain::post::ImageFile;

pub(crate) const UPLOADS_ROUTE: &str = "/uploads";

const ALLOWED_IMAGE_TYPES: [&str; 4] = ["jpeg", "jpg", "png", "gif"];

#[derive(Debug, Error)]
pub(crate) enum UploadError {
    #[error("only images are allowed (jpeg, jpg, png, gif)")]
    NotAnImage,

    #[error("file too large: limit is {limit} bytes")]
    TooLarge { limit: usize },

    #[error("only one image per request is allowed")]
    MultipleImages,
}

/// Both the file extension and the declared MIME type have to be on the allow-list.
pub(crate) fn ensure_allowed_image(
    file_name: &str,
    content_type: Option<&str>,
) -> Result<(), UploadError> {
    let extension_ok = extension_of(file_name)
        .is_some_and(|ext| ALLOWED_IMAGE_TYPES.contains(&ext.as_str()));

    let mime_ok = content_type
        .and_then(|raw| raw.parse::<mime::Mime>().ok())
        .is_some_and(|parsed| {
            let subtype = parsed.subtype().as_str().to_ascii_lowercase();
            parsed.type_() == mime::IMAGE && ALLOWED_IMAGE_TYPES.contains(&subtype.as_str())
        });

    if extension_ok && mime_ok {
        Ok(())
    } else {
        Err(UploadError::NotAnImage)
    }
}

pub(crate) fn ensure_within_limit(len: usize, limit: usize) -> Result<(), UploadError> {
    if len > limit {
        return Err(UploadError::TooLarge { limit });
    }
    Ok(())
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

#[derive(Debug, Clone)]
pub(crate) struct DiskImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl DiskImageStore {
    pub(crate) async fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir, max_bytes })
    }

    fn vet(&self, image: &ImageFile) -> Result<(), UploadError> {
        let content_type = Some(image.content_type.as_str()).filter(|value| !value.is_empty());
        ensure_allowed_image(&image.file_name, content_type)?;
        ensure_within_limit(image.bytes.len(), self.max_bytes)
    }

    /// Maps a public `/uploads/<name>` path back to a file inside the upload directory.
    fn local_path(&self, public_path: &str) -> Option<PathBuf> {
        let name = public_path.strip_prefix(UPLOADS_ROUTE)?.strip_prefix('/')?;
        let is_plain_name = Path::new(name).file_name().is_some_and(|file| file == name);
        is_plain_name.then(|| self.dir.join(name))
    }

    fn generate_file_name(original: &str) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        let extension = extension_of(original)
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        format!(
            "{}-{}{}",
            Utc::now().timestamp_millis(),
            &suffix[..8],
            extension
        )
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn save_image(&self, image: ImageFile) -> Result<String, DomainError> {
        self.vet(&image).map_err(|err| {
            warn!(file = %image.file_name, error = %err, "upload rejected");
            DomainError::InvalidImage(err.to_string())
        })?;

        let file_name = Self::generate_file_name(&image.file_name);
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, &image.bytes).await.map_err(|err| {
            error!(path = %path.display(), error = %err, "failed to write upload");
            DomainError::Unexpected(format!("failed to store image: {err}"))
        })?;

        info!(
            file = %file_name,
            bytes = image.bytes.len(),
            content_type = %image.content_type,
            "image stored"
        );
        Ok(format!("{UPLOADS_ROUTE}/{file_name}"))
    }

    async fn remove_image(&self, path: &str) -> Result<(), DomainError> {
        let local = self
            .local_path(path)
            .ok_or_else(|| DomainError::Unexpected(format!("not an upload path: {path}")))?;

        tokio::fs::remove_file(&local).await.map_err(|err| {
            DomainError::Unexpected(format!("failed to remove image: {err}"))
        })?;
        info!(path, "image removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DiskImageStore, UploadError, ensure_allowed_image, ensure_within_limit};
    use crate::data::image_store::ImageStore;
    use crate::domain::error::DomainError;
    use crate::domain::post::ImageFile;

    #[test]
    fn allows_listed_extensions_with_matching_mime() {
        assert!(ensure_allowed_image("summit.JPG", Some("image/jpeg")).is_ok());
        assert!(ensure_allowed_image("map.png", Some("image/png")).is_ok());
        assert!(ensure_allowed_image("loop.gif", Some("image/gif")).is_ok());
    }

    #[test]
    fn rejects_when_either_extension_or_mime_is_off_list() {
        assert!(matches!(
            ensure_allowed_image("notes.txt", Some("image/png")),
            Err(UploadError::NotAnImage)
        ));
        assert!(matches!(
            ensure_allowed_image("photo.png", Some("application/pdf")),
            Err(UploadError::NotAnImage)
        ));
        assert!(matches!(
            ensure_allowed_image("photo.webp", Some("image/webp")),
            Err(UploadError::NotAnImage)
        ));
        assert!(matches!(
            ensure_allowed_image("photo.png", None),
            Err(UploadError::NotAnImage)
        ));
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(ensure_within_limit(10, 10).is_ok());
        assert!(matches!(
            ensure_within_limit(11, 10),
            Err(UploadError::TooLarge { limit: 10 })
        ));
    }

    #[test]
    fn generated_names_keep_extension_and_differ() {
        let first = DiskImageStore::generate_file_name("Trail Head.PNG");
        let second = DiskImageStore::generate_file_name("Trail Head.PNG");
        assert!(first.ends_with(".png"));
        assert!(!first.contains(' '));
        assert_ne!(first, second);
    }

    fn gif(file_name: &str, bytes: &[u8]) -> ImageFile {
        ImageFile {
            file_name: file_name.to_string(),
            content_type: "image/gif".to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn save_image_writes_file_and_returns_public_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DiskImageStore::new(dir.path().join("uploads"), 1024)
            .await
            .expect("store must be created");

        let path = store
            .save_image(gif("view.gif", b"GIF89a"))
            .await
            .expect("save must succeed");

        let file_name = path.strip_prefix("/uploads/").expect("public prefix");
        let written = std::fs::read(dir.path().join("uploads").join(file_name)).expect("file");
        assert_eq!(written, b"GIF89a");
    }

    #[tokio::test]
    async fn save_image_rejects_before_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DiskImageStore::new(dir.path(), 4).await.expect("store");

        let too_big = store.save_image(gif("view.gif", b"GIF89a")).await;
        assert!(matches!(too_big, Err(DomainError::InvalidImage(_))));

        let not_image = store.save_image(gif("notes.txt", b"GIF")).await;
        assert!(matches!(not_image, Err(DomainError::InvalidImage(_))));

        let entries = std::fs::read_dir(dir.path()).expect("dir").count();
        assert_eq!(entries, 0);
    }

    #[tokio::test]
    async fn remove_image_deletes_only_upload_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DiskImageStore::new(dir.path(), 1024).await.expect("store");

        let path = store
            .save_image(gif("view.gif", b"GIF89a"))
            .await
            .expect("save must succeed");
        store.remove_image(&path).await.expect("remove must succeed");
        assert_eq!(std::fs::read_dir(dir.path()).expect("dir").count(), 0);

        assert!(store.remove_image("/uploads/../secret").await.is_err());
        assert!(store.remove_image("/elsewhere/view.gif").await.is_err());
    }
}
