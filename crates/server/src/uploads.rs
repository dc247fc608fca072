//! Image uploads
//!
//! Files are written to the configured uploads directory under their original
//! name and served back by the static `/uploads` route.

use std::path::Path;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};

/// Multipart field carrying the file
pub const UPLOAD_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /upload
pub async fn upload_image(
    State(state): State<AppState>,
    ctx: Ctx,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    info!("POST /upload - {}", ctx.user_id());

    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart field: {}", e);
        multipart_error(e)
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .and_then(sanitize_filename)
            .ok_or_else(|| Error::BadRequest("Missing file name".to_string()))?;
        let data = field.bytes().await.map_err(|e| {
            error!("Failed to read file data: {}", e);
            multipart_error(e)
        })?;

        upload = Some((filename, data));
    }

    let (filename, data) = upload
        .ok_or_else(|| Error::BadRequest(format!("Missing file field \"{UPLOAD_FIELD}\"")))?;

    let path = state.config.uploads_dir.join(&filename);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| Error::Internal(format!("failed to write {}: {e}", path.display())))?;

    info!("Stored upload {} ({} bytes)", filename, data.len());

    Ok(Json(UploadResponse {
        url: format!("/uploads/{filename}"),
    }))
}

/// Bodies cut off by the upload size limit surface as 413
fn multipart_error(err: MultipartError) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::UploadTooLarge
    } else {
        Error::BadRequest(err.body_text())
    }
}

/// Reduce a client-supplied name to its final path component
fn sanitize_filename(name: &str) -> Option<String> {
    let name = name.rsplit(['/', '\\']).next()?;
    let name = Path::new(name).file_name()?.to_str()?;
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("cat.png").as_deref(), Some("cat.png"));
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_filename("C:\\photos\\dog.jpg").as_deref(),
            Some("dog.jpg")
        );
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("dir/"), None);
    }
}
