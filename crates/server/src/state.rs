use sea_orm::DatabaseConnection;
use std::sync::Arc;
use storage::BlobStore;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub blobs: Arc<BlobStore>,
}
