//! Shared application state, constructed once at startup.

use crate::auth::TokenSigner;
use crate::blob::BlobStore;
use crate::model::EntityRegistry;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub registry: Arc<EntityRegistry>,
    pub blobs: Arc<dyn BlobStore>,
    pub tokens: TokenSigner,
}
