use std::sync::Arc;

use crate::application::post_service::PostService;

pub(crate) mod http;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) post_service: Arc<PostService>,
    pub(crate) upload_max_bytes: usize,
}

impl AppState {
    pub(crate) fn new(post_service: Arc<PostService>, upload_max_bytes: usize) -> Self {
        Self {
            post_service,
            upload_max_bytes,
        }
    }
}
