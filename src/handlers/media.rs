//! Upload/serve gateway: multipart upload into blob storage under the
//! "images" prefix, and public serving by filename.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use regex::Regex;
use std::sync::OnceLock;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

const IMAGES_PREFIX: &str = "images";
const FALLBACK_NAME: &str = "file";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Keep only alphanumerics, '.', '_', '-'; fall back to "file" when nothing
/// survives.
pub fn sanitize_filename(name: &str) -> String {
    static STRIP: OnceLock<Regex> = OnceLock::new();
    let strip = STRIP.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid regex"));
    let cleaned = strip.replace_all(name, "").to_string();
    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub public_url: String,
}

/// POST /upload — multipart with a "file" part. Stored objects are immutable
/// and keyed `images/<generated-id>-<sanitized-name>`.
pub async fn upload(
    _auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or(FALLBACK_NAME).to_string();
        let content_type = field
            .content_type()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file = Some((original_name, content_type, bytes));
        break;
    }
    let (original_name, content_type, bytes) =
        file.ok_or_else(|| AppError::BadRequest("missing 'file' part in multipart body".into()))?;

    let name = sanitize_filename(&original_name);
    let filename = format!("{}-{}", uuid::Uuid::new_v4(), name);
    let key = format!("{IMAGES_PREFIX}/{filename}");
    state.blobs.put(&key, bytes, &content_type).await?;
    tracing::info!(key = %key, content_type = %content_type, "stored upload");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            public_url: format!("/{IMAGES_PREFIX}/{filename}"),
        }),
    ))
}

/// GET /images/ — the `:filename` segment never matches an empty segment,
/// so the missing-filename case gets its own route.
pub async fn serve_missing_name() -> AppError {
    AppError::BadRequest("filename is required".into())
}

/// GET /images/:filename — public, with content-type and entity-tag headers
/// for client-side cache validation.
pub async fn serve(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let key = format!("{IMAGES_PREFIX}/{filename}");
    let blob = state
        .blobs
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(key.clone()))?;

    let mut response = ([(header::CONTENT_TYPE, blob.content_type)], blob.bytes).into_response();
    if let Some(etag) = blob.etag {
        if let Ok(value) = etag.parse() {
            response.headers_mut().insert(header::ETAG, value);
        }
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_and_punctuation_are_stripped() {
        let out = sanitize_filename("../../evil name!.png");
        assert_eq!(out, "....evilname.png");
        assert!(out
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')));
    }

    #[test]
    fn allowed_characters_survive() {
        assert_eq!(sanitize_filename("photo_2024-01.jpg"), "photo_2024-01.jpg");
    }

    #[test]
    fn nothing_left_falls_back() {
        assert_eq!(sanitize_filename("<<>>??"), "file");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[tokio::test]
    async fn missing_filename_is_bad_request() {
        let err = serve_missing_name().await;
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
