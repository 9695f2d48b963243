use anyhow::{Context, Result};
use mongodb::bson::doc;
use mongodb::{Client, Database};
use tracing::info;

/// Owns the single document store connection for the lifetime of the process.
///
/// A value only exists after a successful ping, so handing out the database
/// before the connection is up cannot happen.
#[derive(Debug, Clone)]
pub(crate) struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub(crate) async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .context("invalid MongoDB connection string")?;
        let db = client.database(db_name);

        db.run_command(doc! { "ping": 1 })
            .await
            .with_context(|| format!("failed to connect to MongoDB database '{db_name}'"))?;

        info!(db = db_name, "MongoDB connected");
        Ok(Self { client, db })
    }

    pub(crate) fn database(&self) -> &Database {
        &self.db
    }

    pub(crate) async fn shutdown(self) {
        self.client.shutdown().await;
        info!("MongoDB connection closed");
    }
}
