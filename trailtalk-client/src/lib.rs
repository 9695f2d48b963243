//! Клиентская библиотека для работы с trailtalk-server по HTTP.
//!
//! `TrailTalkClient` повторяет маршруты `/api/posts`: создание (JSON или
//! multipart с изображением), список, получение, изменение и удаление по
//! `secretKey`, голосование и комментарии.
//!
//! Ответы сервера приходят в конверте `{ success, data | message | error }`;
//! клиент разворачивает его и превращает текст `error` в [`ClientError`].
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{ClientError, ClientResult};
pub use models::{Comment, NewPost, Post, PostUpdate};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Типизированный асинхронный клиент TrailTalk.
pub struct TrailTalkClient {
    http: HttpClient,
}

impl TrailTalkClient {
    /// Создаёт клиент с базовым URL сервера, например `http://127.0.0.1:5002`.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
        })
    }

    /// Создаёт пост. Если в `post.image` указан файл, запрос уходит как multipart.
    pub async fn create_post(&self, post: &NewPost) -> ClientResult<Post> {
        self.http.create_post(post).await
    }

    /// Возвращает все посты, новые первыми.
    pub async fn list_posts(&self) -> ClientResult<Vec<Post>> {
        self.http.list_posts().await
    }

    /// Возвращает пост по идентификатору.
    pub async fn get_post(&self, id: &str) -> ClientResult<Post> {
        self.http.get_post(id).await
    }

    /// Изменяет пост; требует `secretKey`, указанный при создании.
    pub async fn update_post(&self, update: &PostUpdate) -> ClientResult<Post> {
        self.http.update_post(update).await
    }

    /// Удаляет пост и возвращает сообщение сервера.
    pub async fn delete_post(&self, id: &str, secret_key: &str) -> ClientResult<String> {
        self.http.delete_post(id, secret_key).await
    }

    /// Добавляет один голос и возвращает обновлённый пост.
    pub async fn upvote_post(&self, id: &str) -> ClientResult<Post> {
        self.http.upvote_post(id).await
    }

    /// Добавляет комментарий в конец списка комментариев поста.
    pub async fn add_comment(
        &self,
        id: &str,
        user_id: &str,
        comment: &str,
    ) -> ClientResult<Comment> {
        self.http.add_comment(id, user_id, comment).await
    }
}
