//! civicms: content backend for a civic organization.
//!
//! A generic CRUD surface over six content entities, a password/token
//! credential subsystem, and a blob-backed upload gateway.

pub mod auth;
pub mod blob;
pub mod config;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod transform;

pub use auth::{AuthUser, TokenSigner};
pub use blob::{create_s3_client, BlobStore, S3BlobStore, StoredBlob};
pub use config::AppConfig;
pub use entities::registry;
pub use error::AppError;
pub use routes::build_router;
pub use service::CrudService;
pub use state::AppState;
pub use store::ensure_tables;
