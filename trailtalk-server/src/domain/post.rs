use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use super::error::DomainError;
use super::tag::{Tag, parse_tags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PostId(ObjectId);

impl PostId {
    pub(crate) fn new() -> Self {
        Self(ObjectId::new())
    }

    pub(crate) fn as_object_id(&self) -> &ObjectId {
        &self.0
    }
}

impl From<ObjectId> for PostId {
    fn from(value: ObjectId) -> Self {
        Self(value)
    }
}

impl FromStr for PostId {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| DomainError::InvalidId(raw.to_string()))
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Comment {
    pub(crate) user_id: String,
    pub(crate) comment: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub(crate) id: PostId,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image_url: Option<String>,
    pub(crate) local_image_path: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) upvotes: u64,
    pub(crate) tags: Vec<Tag>,
    pub(crate) comments: Vec<Comment>,
    pub(crate) user_id: String,
    pub(crate) secret_key: String,
    pub(crate) repost_id: String,
}

impl Post {
    /// Plaintext equality against the stored secret; the only access check for mutations.
    pub(crate) fn authorize(&self, supplied: Option<&str>) -> Result<(), DomainError> {
        match supplied {
            Some(secret_key) if secret_key == self.secret_key => Ok(()),
            _ => Err(DomainError::Forbidden),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) image_url: Option<String>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) user_id: Option<String>,
    pub(crate) secret_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PostDraft {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image_url: Option<String>,
    pub(crate) tags: Vec<Tag>,
    pub(crate) user_id: String,
    pub(crate) secret_key: String,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<PostDraft, DomainError> {
        let title = normalize_required("title", self.title.as_deref())?;
        let user_id = normalize_required("userId", self.user_id.as_deref())?;
        let secret_key = normalize_required("secretKey", self.secret_key.as_deref())?;
        let tags = match &self.tags {
            Some(raw) => parse_tags(raw)?,
            None => Vec::new(),
        };

        Ok(PostDraft {
            title,
            content: normalize_content(self.content.as_deref()),
            image_url: normalize_optional(self.image_url.as_deref()),
            tags,
            user_id,
            secret_key,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) image_url: Option<String>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) user_id: Option<String>,
    pub(crate) secret_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PostChanges {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) image_url: Option<String>,
    pub(crate) tags: Option<Vec<Tag>>,
    pub(crate) user_id: Option<String>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(&self) -> Result<PostChanges, DomainError> {
        let title = match self.title.as_deref() {
            Some(raw) => Some(normalize_required("title", Some(raw))?),
            None => None,
        };
        let user_id = match self.user_id.as_deref() {
            Some(raw) => Some(normalize_required("userId", Some(raw))?),
            None => None,
        };
        let tags = match &self.tags {
            Some(raw) => Some(parse_tags(raw)?),
            None => None,
        };

        Ok(PostChanges {
            title,
            content: self.content.as_deref().map(|raw| raw.trim().to_string()),
            image_url: self.image_url.as_deref().map(|raw| raw.trim().to_string()),
            tags,
            user_id,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AddCommentRequest {
    pub(crate) user_id: Option<String>,
    pub(crate) comment: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ImageFile {
    pub(crate) file_name: String,
    pub(crate) content_type: String,
    pub(crate) bytes: Vec<u8>,
}

fn normalize_required(field: &'static str, value: Option<&str>) -> Result<String, DomainError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(DomainError::Validation {
            field,
            message: "is required",
        });
    }
    Ok(value.to_string())
}

fn normalize_content(content: Option<&str>) -> String {
    content.map(str::trim).unwrap_or_default().to_string()
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
