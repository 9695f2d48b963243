use axum::Router;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    add_comment, create_post, delete_post, get_post, list_posts, update_post, upvote_post,
};

pub(crate) fn posts() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/{id}/upvote", post(upvote_post))
        .route("/{id}/comments", post(add_comment))
}
