use utoipa::OpenApi;

use crate::presentation::http::extract::PostBodyDto;
use crate::presentation::http::handlers::posts::{
    AddCommentDto, CommentDto, DeletePostDto, PostDto,
};
use crate::presentation::http::response::{ErrorBody, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::posts::upvote_post,
        crate::presentation::http::handlers::posts::add_comment
    ),
    components(
        schemas(
            PostBodyDto,
            PostDto,
            CommentDto,
            DeletePostDto,
            AddCommentDto,
            MessageResponse,
            ErrorBody
        )
    ),
    tags(
        (name = "posts", description = "Trail posts, upvotes and comments")
    )
)]
pub(crate) struct ApiDoc;
