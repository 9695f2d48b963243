use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{ClientError, ClientResult};
use crate::models::{Comment, NewPost, Post, PostUpdate};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePostRequestDto<'a> {
    title: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    tags: &'a [String],
    user_id: &'a str,
    secret_key: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePostRequestDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    secret_key: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeletePostRequestDto<'a> {
    secret_key: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddCommentRequestDto<'a> {
    user_id: &'a str,
    comment: &'a str,
}

/// Общий конверт ответов сервера: `{ success, data?, message?, error? }`.
#[derive(Debug, Deserialize)]
struct EnvelopeDto<T> {
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorOnlyDto {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для REST API `trailtalk-server`.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub(crate) fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.endpoint(path))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        decode_data(status, &body)
    }

    pub(crate) async fn create_post(&self, post: &NewPost) -> ClientResult<Post> {
        let request = self.request(Method::POST, "/api/posts");

        let request = match &post.image {
            Some(path) => {
                let mut form = Form::new()
                    .text("title", post.title.clone())
                    .text("content", post.content.clone())
                    .text("userId", post.user_id.clone())
                    .text("secretKey", post.secret_key.clone())
                    .text("tags", tags_as_json(&post.tags)?);
                if let Some(image_url) = &post.image_url {
                    form = form.text("imageUrl", image_url.clone());
                }
                request.multipart(form.part("image", image_part(path).await?))
            }
            None => request.json(&CreatePostRequestDto {
                title: &post.title,
                content: &post.content,
                image_url: post.image_url.as_deref(),
                tags: &post.tags,
                user_id: &post.user_id,
                secret_key: &post.secret_key,
            }),
        };

        Self::send(request).await
    }

    pub(crate) async fn list_posts(&self) -> ClientResult<Vec<Post>> {
        Self::send(self.request(Method::GET, "/api/posts")).await
    }

    pub(crate) async fn get_post(&self, id: &str) -> ClientResult<Post> {
        Self::send(self.request(Method::GET, &format!("/api/posts/{id}"))).await
    }

    pub(crate) async fn update_post(&self, update: &PostUpdate) -> ClientResult<Post> {
        let request = self.request(Method::PUT, &format!("/api/posts/{}", update.id));

        let request = match &update.image {
            Some(path) => {
                let mut form = Form::new().text("secretKey", update.secret_key.clone());
                if let Some(title) = &update.title {
                    form = form.text("title", title.clone());
                }
                if let Some(content) = &update.content {
                    form = form.text("content", content.clone());
                }
                if let Some(image_url) = &update.image_url {
                    form = form.text("imageUrl", image_url.clone());
                }
                if let Some(tags) = &update.tags {
                    form = form.text("tags", tags_as_json(tags)?);
                }
                if let Some(user_id) = &update.user_id {
                    form = form.text("userId", user_id.clone());
                }
                request.multipart(form.part("image", image_part(path).await?))
            }
            None => request.json(&UpdatePostRequestDto {
                title: update.title.as_deref(),
                content: update.content.as_deref(),
                image_url: update.image_url.as_deref(),
                tags: update.tags.as_deref(),
                user_id: update.user_id.as_deref(),
                secret_key: &update.secret_key,
            }),
        };

        Self::send(request).await
    }

    pub(crate) async fn delete_post(&self, id: &str, secret_key: &str) -> ClientResult<String> {
        let request = self
            .request(Method::DELETE, &format!("/api/posts/{id}"))
            .json(&DeletePostRequestDto { secret_key });

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        decode_message(status, &body)
    }

    pub(crate) async fn upvote_post(&self, id: &str) -> ClientResult<Post> {
        Self::send(self.request(Method::POST, &format!("/api/posts/{id}/upvote"))).await
    }

    pub(crate) async fn add_comment(
        &self,
        id: &str,
        user_id: &str,
        comment: &str,
    ) -> ClientResult<Comment> {
        let request = self
            .request(Method::POST, &format!("/api/posts/{id}/comments"))
            .json(&AddCommentRequestDto { user_id, comment });

        Self::send(request).await
    }
}

fn tags_as_json(tags: &[String]) -> ClientResult<String> {
    serde_json::to_string(tags).map_err(|err| ClientError::InvalidRequest(err.to_string()))
}

/// Только форматы, которые примет сервер; остальное отсекается до отправки.
fn image_mime(path: &Path) -> ClientResult<mime::Mime> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => Ok(mime::IMAGE_PNG),
        Some("jpg") | Some("jpeg") => Ok(mime::IMAGE_JPEG),
        Some("gif") => Ok(mime::IMAGE_GIF),
        _ => Err(ClientError::InvalidRequest(format!(
            "unsupported image type: {} (jpeg, jpg, png, gif)",
            path.display()
        ))),
    }
}

async fn image_part(path: &Path) -> ClientResult<Part> {
    let content_type = image_mime(path)?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ClientError::InvalidRequest(format!("bad file name: {}", path.display())))?
        .to_string();
    let bytes = tokio::fs::read(path).await?;

    Ok(Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(content_type.as_ref())?)
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorOnlyDto>(body)
        .ok()
        .and_then(|dto| dto.error)
        .unwrap_or_else(|| format!("http status {status}"))
}

fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> ClientResult<EnvelopeDto<T>> {
    if !status.is_success() {
        return Err(ClientError::from_http_status(
            status,
            error_message(status, body),
        ));
    }
    if body.is_empty() {
        return Err(ClientError::EmptyResponse);
    }

    let envelope: EnvelopeDto<T> = serde_json::from_slice(body)
        .map_err(|err| ClientError::Server(format!("unexpected response body: {err}")))?;
    if let Some(error) = envelope.error {
        return Err(ClientError::Server(error));
    }
    Ok(envelope)
}

fn decode_data<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> ClientResult<T> {
    decode_envelope::<T>(status, body)?
        .data
        .ok_or(ClientError::EmptyResponse)
}

fn decode_message(status: StatusCode, body: &[u8]) -> ClientResult<String> {
    decode_envelope::<serde_json::Value>(status, body)?
        .message
        .ok_or(ClientError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use reqwest::StatusCode;

    use super::*;

    const POST_JSON: &str = r#"{
        "success": true,
        "data": {
            "_id": "64b7f0c2a1b2c3d4e5f60718",
            "title": "Ridge loop",
            "content": "",
            "imageUrl": null,
            "localImagePath": "/uploads/1700000000000-ab12cd34.png",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z",
            "upvotes": 3,
            "tags": ["Adventure", "Scenic View"],
            "comments": [
                { "userId": "u2", "comment": "nice", "createdAt": "2024-05-01T11:00:00Z" }
            ],
            "userId": "u1",
            "repostId": "5f0c0a4e-8d4b-4d6c-9a3e-0f2f2b1c9d11"
        }
    }"#;

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = HttpClient::new("http://localhost:5002/").expect("client");
        let full = client.endpoint("/api/posts");
        assert_eq!(full, "http://localhost:5002/api/posts");
    }

    #[test]
    fn success_envelope_decodes_post() {
        let post: Post = decode_data(StatusCode::OK, POST_JSON.as_bytes()).expect("post");
        assert_eq!(post.id, "64b7f0c2a1b2c3d4e5f60718");
        assert_eq!(post.upvotes, 3);
        assert_eq!(post.tags, vec!["Adventure", "Scenic View"]);
        assert_eq!(post.comments.len(), 1);
        assert_eq!(post.comments[0].user_id, "u2");
        assert!(post.image_url.is_none());
    }

    #[test]
    fn error_envelope_surfaces_server_message() {
        let body = br#"{"success":false,"error":"Invalid secret key"}"#;
        let err = decode_data::<Post>(StatusCode::FORBIDDEN, body).expect_err("must fail");
        match err {
            ClientError::Forbidden(message) => assert_eq!(message, "Invalid secret key"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_error_falls_back_to_status_text() {
        let err = decode_data::<Post>(StatusCode::BAD_GATEWAY, b"<html>").expect_err("must fail");
        match err {
            ClientError::Server(message) => assert!(message.contains("502")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn success_without_data_is_empty_response() {
        let err = decode_data::<Post>(StatusCode::OK, br#"{"success":true}"#).expect_err("empty");
        assert!(matches!(err, ClientError::EmptyResponse));

        let err = decode_data::<Post>(StatusCode::OK, b"").expect_err("empty");
        assert!(matches!(err, ClientError::EmptyResponse));
    }

    #[test]
    fn delete_message_is_read_from_envelope() {
        let body = br#"{"success":true,"message":"Post deleted"}"#;
        let message = decode_message(StatusCode::OK, body).expect("message");
        assert_eq!(message, "Post deleted");
    }

    #[test]
    fn update_body_skips_absent_fields() {
        let tags = vec!["Question".to_string()];
        let dto = UpdatePostRequestDto {
            title: None,
            content: Some("new"),
            image_url: None,
            tags: Some(&tags),
            user_id: None,
            secret_key: "s1",
        };
        let value = serde_json::to_value(&dto).expect("json");
        assert_eq!(
            value,
            serde_json::json!({ "content": "new", "tags": ["Question"], "secretKey": "s1" })
        );
    }

    #[test]
    fn image_mime_follows_extension() {
        assert_eq!(image_mime(Path::new("a/b.PNG")).expect("png"), mime::IMAGE_PNG);
        assert_eq!(image_mime(Path::new("b.jpeg")).expect("jpeg"), mime::IMAGE_JPEG);
        assert!(matches!(
            image_mime(Path::new("notes.txt")),
            Err(ClientError::InvalidRequest(_))
        ));
    }
}
