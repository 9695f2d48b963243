use std::sync::Mutex;

use async_trait::async_trait;

use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Post, PostId};

/// Test double honouring the same ordering and single-document semantics as the Mongo store.
#[derive(Debug, Default)]
pub(crate) struct InMemoryPostRepository {
    posts: Mutex<Vec<(u64, Post)>>,
    next_seq: Mutex<u64>,
}

impl InMemoryPostRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.posts.lock().expect("posts mutex poisoned").len()
    }

    fn with_post<T>(&self, id: &PostId, f: impl FnOnce(&mut Post) -> T) -> Option<T> {
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        posts
            .iter_mut()
            .find(|(_, post)| post.id == *id)
            .map(|(_, post)| f(post))
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let post = Post {
            id: PostId::new(),
            title: input.title,
            content: input.content,
            image_url: input.image_url,
            local_image_path: input.local_image_path,
            created_at: input.created_at,
            updated_at: input.created_at,
            upvotes: 0,
            tags: input.tags,
            comments: Vec::new(),
            user_id: input.user_id,
            secret_key: input.secret_key,
            repost_id: input.repost_id,
        };

        let seq = {
            let mut next = self.next_seq.lock().expect("next_seq mutex poisoned");
            *next += 1;
            *next
        };
        self.posts
            .lock()
            .expect("posts mutex poisoned")
            .push((seq, post.clone()));
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        let mut posts = self.posts.lock().expect("posts mutex poisoned").clone();
        posts.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at.cmp(&a.created_at).then(b_seq.cmp(a_seq))
        });
        Ok(posts.into_iter().map(|(_, post)| post).collect())
    }

    async fn get_post(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        Ok(self.with_post(id, |post| post.clone()))
    }

    async fn update_post(&self, id: &PostId, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        Ok(self.with_post(id, |post| {
            let changes = patch.changes;
            if let Some(title) = changes.title {
                post.title = title;
            }
            if let Some(content) = changes.content {
                post.content = content;
            }
            if let Some(image_url) = changes.image_url {
                post.image_url = Some(image_url).filter(|url| !url.is_empty());
            }
            if let Some(tags) = changes.tags {
                post.tags = tags;
            }
            if let Some(user_id) = changes.user_id {
                post.user_id = user_id;
            }
            if let Some(local_image_path) = patch.local_image_path {
                post.local_image_path = Some(local_image_path);
            }
            post.secret_key = patch.secret_key;
            post.updated_at = patch.updated_at;
            post.clone()
        }))
    }

    async fn delete_post(&self, id: &PostId) -> Result<bool, DomainError> {
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let before = posts.len();
        posts.retain(|(_, post)| post.id != *id);
        Ok(posts.len() < before)
    }

    async fn increment_upvotes(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        Ok(self.with_post(id, |post| {
            post.upvotes += 1;
            post.clone()
        }))
    }

    async fn push_comment(&self, id: &PostId, comment: Comment) -> Result<bool, DomainError> {
        Ok(self.with_post(id, |post| post.comments.push(comment)).is_some())
    }
}
