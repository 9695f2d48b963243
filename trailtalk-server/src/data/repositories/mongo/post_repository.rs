use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Post, PostId};
use crate::domain::tag::Tag;

pub(crate) const POSTS_COLLECTION: &str = "posts";

#[derive(Debug, Clone)]
pub(crate) struct MongoPostRepository {
    posts: Collection<PostDocument>,
}

impl MongoPostRepository {
    pub(crate) fn new(db: &Database) -> Self {
        Self {
            posts: db.collection(POSTS_COLLECTION),
        }
    }

    pub(crate) async fn ensure_indexes(&self) -> Result<(), DomainError> {
        let newest_first = IndexModel::builder()
            .keys(doc! { "createdAt": -1, "_id": -1 })
            .build();
        self.posts
            .create_index(newest_first)
            .await
            .map_err(map_post_db_error)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    local_image_path: Option<String>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
    #[serde(default)]
    upvotes: i64,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    comments: Vec<CommentDocument>,
    user_id: String,
    secret_key: String,
    repost_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentDocument {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    comment: String,
    created_at: bson::DateTime,
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let created_at = bson::DateTime::from_chrono(input.created_at);
        let document = PostDocument {
            id: ObjectId::new(),
            title: input.title,
            content: input.content,
            image_url: input.image_url,
            local_image_path: input.local_image_path,
            created_at,
            updated_at: created_at,
            upvotes: 0,
            tags: input.tags.iter().map(|tag| tag.as_str().to_string()).collect(),
            comments: Vec::new(),
            user_id: input.user_id,
            secret_key: input.secret_key,
            repost_id: input.repost_id,
        };

        self.posts
            .insert_one(&document)
            .await
            .map_err(map_post_db_error)?;

        map_document_to_post(document)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        let mut cursor = self
            .posts
            .find(doc! {})
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await
            .map_err(map_post_db_error)?;

        let mut posts = Vec::new();
        while cursor.advance().await.map_err(map_post_db_error)? {
            let document = cursor.deserialize_current().map_err(map_post_db_error)?;
            posts.push(map_document_to_post(document)?);
        }
        Ok(posts)
    }

    async fn get_post(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        let document = self
            .posts
            .find_one(by_id(id))
            .await
            .map_err(map_post_db_error)?;

        document.map(map_document_to_post).transpose()
    }

    async fn update_post(&self, id: &PostId, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let document = self
            .posts
            .find_one_and_update(by_id(id), doc! { "$set": patch_to_set(patch) })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_post_db_error)?;

        document.map(map_document_to_post).transpose()
    }

    async fn delete_post(&self, id: &PostId) -> Result<bool, DomainError> {
        let result = self
            .posts
            .delete_one(by_id(id))
            .await
            .map_err(map_post_db_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn increment_upvotes(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        let document = self
            .posts
            .find_one_and_update(by_id(id), doc! { "$inc": { "upvotes": 1_i64 } })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_post_db_error)?;

        document.map(map_document_to_post).transpose()
    }

    async fn push_comment(&self, id: &PostId, comment: Comment) -> Result<bool, DomainError> {
        let comment = doc! {
            "userId": comment.user_id,
            "comment": comment.comment,
            "createdAt": bson::DateTime::from_chrono(comment.created_at),
        };

        let result = self
            .posts
            .update_one(by_id(id), doc! { "$push": { "comments": comment } })
            .await
            .map_err(map_post_db_error)?;

        Ok(result.matched_count > 0)
    }
}

fn by_id(id: &PostId) -> Document {
    doc! { "_id": *id.as_object_id() }
}

fn patch_to_set(patch: PostPatch) -> Document {
    let mut set = doc! {
        "secretKey": patch.secret_key,
        "updatedAt": bson::DateTime::from_chrono(patch.updated_at),
    };

    let changes = patch.changes;
    if let Some(title) = changes.title {
        set.insert("title", title);
    }
    if let Some(content) = changes.content {
        set.insert("content", content);
    }
    if let Some(image_url) = changes.image_url {
        if image_url.is_empty() {
            set.insert("imageUrl", Bson::Null);
        } else {
            set.insert("imageUrl", image_url);
        }
    }
    if let Some(tags) = changes.tags {
        let tags: Vec<&str> = tags.iter().map(|tag| tag.as_str()).collect();
        set.insert("tags", tags);
    }
    if let Some(user_id) = changes.user_id {
        set.insert("userId", user_id);
    }
    if let Some(local_image_path) = patch.local_image_path {
        set.insert("localImagePath", local_image_path);
    }
    set
}

fn map_document_to_post(document: PostDocument) -> Result<Post, DomainError> {
    let upvotes = u64::try_from(document.upvotes)
        .map_err(|_| DomainError::Unexpected(format!("negative upvotes on post {}", document.id)))?;
    let tags = document
        .tags
        .iter()
        .map(|raw| raw.parse::<Tag>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;

    Ok(Post {
        id: PostId::from(document.id),
        title: document.title,
        content: document.content,
        image_url: document.image_url,
        local_image_path: document.local_image_path,
        created_at: document.created_at.to_chrono(),
        updated_at: document.updated_at.to_chrono(),
        upvotes,
        tags,
        comments: document
            .comments
            .into_iter()
            .map(|comment| Comment {
                user_id: comment.user_id,
                comment: comment.comment,
                created_at: comment.created_at.to_chrono(),
            })
            .collect(),
        user_id: document.user_id,
        secret_key: document.secret_key,
        repost_id: document.repost_id,
    })
}

fn map_post_db_error(err: mongodb::error::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use mongodb::bson::{self, oid::ObjectId};

    use super::{CommentDocument, PostDocument, map_document_to_post, patch_to_set};
    use crate::data::post_repository::PostPatch;
    use crate::domain::error::DomainError;
    use crate::domain::post::PostChanges;
    use crate::domain::tag::Tag;

    #[test]
    fn patch_only_sets_present_fields() {
        let patch = PostPatch {
            changes: PostChanges {
                content: Some("new body".to_string()),
                tags: Some(vec![Tag::TrailTips]),
                ..PostChanges::default()
            },
            local_image_path: None,
            secret_key: "s1".to_string(),
            updated_at: Utc::now(),
        };

        let set = patch_to_set(patch);
        assert_eq!(set.get_str("content").expect("content"), "new body");
        assert_eq!(set.get_str("secretKey").expect("secretKey"), "s1");
        assert!(set.get_datetime("updatedAt").is_ok());
        assert!(!set.contains_key("title"));
        assert!(!set.contains_key("localImagePath"));
        let tags = set.get_array("tags").expect("tags");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].as_str(), Some("Trail Tips"));
    }

    #[test]
    fn document_maps_to_post_with_comments_in_order() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).single().expect("ts");
        let mut document = sample_document(vec!["Adventure".to_string()], 3);
        document.created_at = bson::DateTime::from_chrono(at);
        document.comments = vec![
            CommentDocument {
                user_id: "a".to_string(),
                comment: "first".to_string(),
                created_at: bson::DateTime::from_chrono(at),
            },
            CommentDocument {
                user_id: "b".to_string(),
                comment: "second".to_string(),
                created_at: bson::DateTime::from_chrono(at),
            },
        ];

        let post = map_document_to_post(document).expect("must map");
        assert_eq!(post.upvotes, 3);
        assert_eq!(post.tags, vec![Tag::Adventure]);
        assert_eq!(post.comments[0].comment, "first");
        assert_eq!(post.comments[1].comment, "second");
        assert_eq!(post.created_at, at);
        assert_eq!(post.comments[0].created_at, at);
    }

    #[test]
    fn document_with_unknown_stored_tag_is_unexpected() {
        let document = sample_document(vec!["Hang Gliding".to_string()], 0);
        let err = map_document_to_post(document).expect_err("tag must be rejected");
        assert!(matches!(err, DomainError::Unexpected(_)));
    }

    fn sample_document(tags: Vec<String>, upvotes: i64) -> PostDocument {
        let now = bson::DateTime::now();
        PostDocument {
            id: ObjectId::new(),
            title: "Ridge Trail".to_string(),
            content: String::new(),
            image_url: None,
            local_image_path: None,
            created_at: now,
            updated_at: now,
            upvotes,
            tags,
            comments: Vec::new(),
            user_id: "u1".to_string(),
            secret_key: "s1".to_string(),
            repost_id: "r1".to_string(),
        }
    }
}
