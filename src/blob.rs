//! Key-addressed blob storage behind a trait, with an S3 implementation.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use crate::error::AppError;

/// A stored blob with the metadata needed to serve it back.
#[derive(Clone, Debug)]
pub struct StoredBlob {
    pub bytes: Bytes,
    pub content_type: String,
    /// Entity tag from the store, for client-side cache validation.
    pub etag: Option<String>,
}

/// Key -> bytes storage with content-type metadata. Objects are immutable
/// once stored; there is no delete.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError>;
    async fn get(&self, key: &str) -> Result<Option<StoredBlob>, AppError>;
}

/// S3 (or S3-compatible) blob store.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        S3BlobStore {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| AppError::Blob(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredBlob>, AppError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;
        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    return Ok(None);
                }
                return Err(AppError::Blob(e.to_string()));
            }
        };
        let content_type = resp
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let etag = resp.e_tag().map(String::from);
        let bytes = resp
            .body
            .collect()
            .await
            .map_err(|e| AppError::Blob(e.to_string()))?
            .into_bytes();
        Ok(Some(StoredBlob {
            bytes,
            content_type,
            etag,
        }))
    }
}

/// Create an S3 client with optional custom endpoint (MinIO and friends need
/// path-style addressing).
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);
    if let Some(endpoint) = endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    let sdk_config = loader.load().await;
    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };
    Client::from_conf(s3_config)
}
