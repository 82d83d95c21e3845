//! Admin file upload
//!
//! Files uploaded through the admin surface are correction artifacts, so they
//! are always classified as admin files and land in `projects`.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use staka_core::models::{NewStoredFile, StoredFile};
use staka_core::AppError;
use staka_storage::{generate_stored_name, FileCategory};
use std::sync::Arc;
use uuid::Uuid;

const DESCRIPTION_MAX_LEN: usize = 1000;

/// Parsed multipart form of an upload
#[derive(Debug)]
struct UploadForm {
    data: Bytes,
    original_name: String,
    mime_type: String,
    commande_id: Option<Uuid>,
    description: Option<String>,
}

fn multipart_error(e: MultipartError, max_size: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        ))
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", e))
    }
}

async fn read_upload_form(
    mut multipart: Multipart,
    max_size: usize,
) -> Result<UploadForm, AppError> {
    let mut file: Option<(Bytes, String, String)> = None;
    let mut commande_id = None;
    let mut description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let original_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let mime_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, max_size))?;
                file = Some((data, original_name, mime_type));
            }
            "commandeId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_size))?;
                let text = text.trim();
                if !text.is_empty() {
                    let id = Uuid::parse_str(text).map_err(|_| {
                        AppError::InvalidInput("commandeId must be a UUID".to_string())
                    })?;
                    commande_id = Some(id);
                }
            }
            "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_size))?;
                if text.chars().count() > DESCRIPTION_MAX_LEN {
                    return Err(AppError::InvalidInput(format!(
                        "description must be at most {} characters",
                        DESCRIPTION_MAX_LEN
                    )));
                }
                description = Some(text).filter(|t| !t.trim().is_empty());
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let (data, original_name, mime_type) =
        file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    if data.is_empty() {
        return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
    }
    if data.len() > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }

    Ok(UploadForm {
        data,
        original_name,
        mime_type,
        commande_id,
        description,
    })
}

#[utoipa::path(
    post,
    path = "/admin/files",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = StoredFile),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_admin_file"))]
pub async fn upload_admin_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_upload_form(multipart, state.config.max_upload_size_bytes).await?;

    let category = FileCategory::for_file(true, form.commande_id);
    let stored_name = generate_stored_name(&form.original_name);
    let size = form.data.len() as i64;

    let (storage_key, url) = state
        .storage
        .upload(category, &stored_name, form.data)
        .await?;

    let record = NewStoredFile {
        original_name: form.original_name,
        stored_name,
        mime_type: form.mime_type,
        size,
        url,
        commande_id: form.commande_id,
        is_admin_file: true,
        description: form.description,
    };

    let stored = match state.files.create(record).await {
        Ok(stored) => stored,
        Err(e) => {
            // No record points at the bytes; remove them.
            if let Err(cleanup) = state.storage.delete(&storage_key).await {
                tracing::warn!(
                    error = %cleanup,
                    storage_key = %storage_key,
                    "Failed to remove orphaned upload"
                );
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        file_id = %stored.id,
        category = %category,
        size = stored.size,
        "File uploaded"
    );

    Ok((StatusCode::CREATED, Json(stored)))
}
