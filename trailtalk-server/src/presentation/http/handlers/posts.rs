use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::post::{AddCommentRequest, Comment, Post, PostId};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{PostBodyDto, PostForm, parse_json_body};
use crate::presentation::http::response::{ApiResponse, ErrorBody, MessageResponse};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image_url: Option<String>,
    pub(crate) local_image_path: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) upvotes: u64,
    pub(crate) tags: Vec<String>,
    pub(crate) comments: Vec<CommentDto>,
    pub(crate) user_id: String,
    pub(crate) repost_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentDto {
    pub(crate) user_id: String,
    pub(crate) comment: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeletePostDto {
    pub(crate) secret_key: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddCommentDto {
    pub(crate) user_id: Option<String>,
    pub(crate) comment: Option<String>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            user_id: comment.user_id,
            comment: comment.comment,
            created_at: comment.created_at,
        }
    }
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            local_image_path: post.local_image_path,
            created_at: post.created_at,
            updated_at: post.updated_at,
            upvotes: post.upvotes,
            tags: post.tags.iter().map(|tag| tag.as_str().to_string()).collect(),
            comments: post.comments.into_iter().map(CommentDto::from).collect(),
            user_id: post.user_id,
            repost_id: post.repost_id,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    request_body(
        content = PostBodyDto,
        description = "JSON body, or multipart/form-data with the same fields plus an optional image file"
    ),
    responses(
        (status = 201, description = "Post created", body = ApiResponse<PostDto>),
        (status = 400, description = "Missing field, invalid tag or rejected image", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    form: PostForm,
) -> AppResult<(StatusCode, Json<ApiResponse<PostDto>>)> {
    let (req, image) = form.into_create();
    let post = state.post_service.create_post(req, image).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(PostDto::from(post)))))
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    responses(
        (status = 200, description = "All posts, newest first", body = ApiResponse<Vec<PostDto>>),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<PostDto>>>> {
    let posts = state.post_service.list_posts().await?;

    Ok(Json(ApiResponse::new(
        posts.into_iter().map(PostDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id (24 hex chars)")
    ),
    responses(
        (status = 200, description = "Post found", body = ApiResponse<PostDto>),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<PostDto>>> {
    let id: PostId = id.parse()?;
    let post = state.post_service.get_post(&id).await?;

    Ok(Json(ApiResponse::new(PostDto::from(post))))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id (24 hex chars)")
    ),
    request_body(
        content = PostBodyDto,
        description = "Fields to replace; secretKey is mandatory. Multipart accepted for a new image"
    ),
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<PostDto>),
        (status = 400, description = "Malformed id or invalid field", body = ErrorBody),
        (status = 403, description = "Secret key mismatch", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> AppResult<Json<ApiResponse<PostDto>>> {
    // a malformed id is rejected before the body is read
    let id: PostId = id.parse()?;
    let form = PostForm::from_request(request, &state).await?;
    let (req, image) = form.into_update();
    let post = state.post_service.update_post(&id, req, image).await?;

    Ok(Json(ApiResponse::new(PostDto::from(post))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id (24 hex chars)")
    ),
    request_body = DeletePostDto,
    responses(
        (status = 200, description = "Post deleted", body = MessageResponse),
        (status = 400, description = "Malformed id or body", body = ErrorBody),
        (status = 403, description = "Secret key mismatch", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let id: PostId = id.parse()?;
    let dto: DeletePostDto = parse_json_body(&body)?;
    state
        .post_service
        .delete_post(&id, dto.secret_key.as_deref())
        .await?;

    Ok(Json(MessageResponse::new("Post deleted")))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/upvote",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id (24 hex chars)")
    ),
    responses(
        (status = 200, description = "Upvote counted", body = ApiResponse<PostDto>),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn upvote_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<PostDto>>> {
    let id: PostId = id.parse()?;
    let post = state.post_service.upvote_post(&id).await?;

    Ok(Json(ApiResponse::new(PostDto::from(post))))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id (24 hex chars)")
    ),
    request_body = AddCommentDto,
    responses(
        (status = 201, description = "Comment appended", body = ApiResponse<CommentDto>),
        (status = 400, description = "Malformed id or body", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ApiResponse<CommentDto>>)> {
    let id: PostId = id.parse()?;
    let dto: AddCommentDto = parse_json_body(&body)?;
    let req = AddCommentRequest {
        user_id: dto.user_id,
        comment: dto.comment,
    };
    let comment = state.post_service.add_comment(&id, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(CommentDto::from(comment))),
    ))
}
