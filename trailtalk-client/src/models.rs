use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель поста в том виде, в каком её отдаёт сервер.
pub struct Post {
    /// Идентификатор поста (24 hex-символа).
    #[serde(rename = "_id")]
    pub id: String,
    /// Заголовок поста.
    pub title: String,
    /// Текст поста.
    #[serde(default)]
    pub content: String,
    /// Внешняя ссылка на изображение.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Путь к загруженному изображению на сервере (`/uploads/...`).
    #[serde(default)]
    pub local_image_path: Option<String>,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего изменения (UTC).
    pub updated_at: DateTime<Utc>,
    /// Количество голосов.
    #[serde(default)]
    pub upvotes: u64,
    /// Теги поста.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Комментарии в порядке добавления.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Автор поста.
    pub user_id: String,
    /// Вторичный идентификатор поста.
    pub repost_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Комментарий к посту.
pub struct Comment {
    /// Автор комментария.
    pub user_id: String,
    /// Текст комментария.
    pub comment: String,
    /// Дата и время добавления (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
/// Данные для создания поста.
pub struct NewPost {
    /// Заголовок (обязателен).
    pub title: String,
    /// Текст поста.
    pub content: String,
    /// Внешняя ссылка на изображение.
    pub image_url: Option<String>,
    /// Теги из фиксированного словаря сервера.
    pub tags: Vec<String>,
    /// Автор (обязателен).
    pub user_id: String,
    /// Секрет, которым потом подтверждаются изменение и удаление.
    pub secret_key: String,
    /// Локальный файл изображения; при наличии запрос уходит как multipart.
    pub image: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
/// Изменения поста. Поля `None` на сервере не трогаются.
pub struct PostUpdate {
    /// Идентификатор изменяемого поста.
    pub id: String,
    /// Секрет, указанный при создании.
    pub secret_key: String,
    /// Новый заголовок.
    pub title: Option<String>,
    /// Новый текст.
    pub content: Option<String>,
    /// Новая внешняя ссылка на изображение.
    pub image_url: Option<String>,
    /// Новый набор тегов (заменяет старый целиком).
    pub tags: Option<Vec<String>>,
    /// Новый автор.
    pub user_id: Option<String>,
    /// Новый локальный файл изображения.
    pub image: Option<PathBuf>,
}
