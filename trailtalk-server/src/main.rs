use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::post_service::PostService;
use data::repositories::mongo::post_repository::MongoPostRepository;
use infrastructure::database::MongoStore;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use infrastructure::uploads::DiskImageStore;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let store = match MongoStore::connect(&settings.mongo_uri, &settings.db_name).await {
        Ok(store) => store,
        Err(err) => {
            error!(error = %format!("{err:#}"), "MongoDB connection failed");
            return Err(err);
        }
    };

    let repo = MongoPostRepository::new(store.database());
    repo.ensure_indexes().await?;

    let images = DiskImageStore::new(settings.upload_dir.clone(), settings.upload_max_bytes).await?;
    info!(dir = %settings.upload_dir.display(), "upload directory ready");

    let post_service = Arc::new(PostService::new(Arc::new(repo), Arc::new(images)));
    let state = AppState::new(post_service, settings.upload_max_bytes);

    let served = server::run_http(&settings, state).await;
    store.shutdown().await;
    served
}
