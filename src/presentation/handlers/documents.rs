use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{BlobKey, DocumentId, DocumentStatus, MediaType, NewDocument};
use crate::presentation::state::AppState;

use super::responses::{
    bad_request, lifecycle_error_response, ChunkResponse, DocumentResponse, ErrorResponse,
};

#[derive(Serialize)]
pub struct SubmitResponse {
    pub document: DocumentResponse,
    pub message: String,
}

#[derive(Serialize)]
pub struct RequestChunkingResponse {
    pub job_id: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub status: Option<String>,
    pub owner_id: Option<Uuid>,
}

struct UploadedFile {
    filename: String,
    media_type: MediaType,
    data: Bytes,
}

/// Multipart upload: metadata fields (`title`, `owner_id`, optional `tags`,
/// `valid_from`, `valid_until`) plus one or more `file` parts. Blobs are
/// stored first; submission fails fast on unsupported media types and the
/// staged blobs are cleaned up best-effort.
#[tracing::instrument(skip(state, multipart))]
pub async fn submit_document_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut title: Option<String> = None;
    let mut owner_id: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut valid_from: Option<DateTime<Utc>> = None;
    let mut valid_until: Option<DateTime<Utc>> = None;
    let mut files: Vec<UploadedFile> = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => return bad_request(format!("Failed to read multipart: {}", e)),
        };

        match field.name().unwrap_or_default() {
            "title" => match field.text().await {
                Ok(v) => title = Some(v),
                Err(e) => return bad_request(format!("Failed to read title: {}", e)),
            },
            "owner_id" => match field.text().await {
                Ok(v) => owner_id = Some(v),
                Err(e) => return bad_request(format!("Failed to read owner_id: {}", e)),
            },
            "tags" => match field.text().await {
                Ok(v) => {
                    tags = v
                        .split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect();
                }
                Err(e) => return bad_request(format!("Failed to read tags: {}", e)),
            },
            "valid_from" => match parse_timestamp(field.text().await, "valid_from") {
                Ok(v) => valid_from = v,
                Err(r) => return r,
            },
            "valid_until" => match parse_timestamp(field.text().await, "valid_until") {
                Ok(v) => valid_until = v,
                Err(r) => return r,
            },
            "file" => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                let media_type = match MediaType::from_mime(&content_type) {
                    Some(mt) => mt,
                    None => {
                        tracing::warn!(content_type = %content_type, "Unsupported media type");
                        return (
                            StatusCode::UNSUPPORTED_MEDIA_TYPE,
                            Json(ErrorResponse {
                                error: format!("Unsupported media type: {}", content_type),
                            }),
                        )
                            .into_response();
                    }
                };

                let data = match field.bytes().await {
                    Ok(d) => d,
                    Err(e) => return bad_request(format!("Failed to read file: {}", e)),
                };

                files.push(UploadedFile {
                    filename,
                    media_type,
                    data,
                });
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let title = match title {
        Some(t) => t,
        None => return bad_request("Missing field: title"),
    };
    let owner_id = match owner_id.as_deref().map(Uuid::parse_str) {
        Some(Ok(id)) => id,
        Some(Err(_)) => return bad_request("owner_id must be a UUID"),
        None => return bad_request("Missing field: owner_id"),
    };
    if files.is_empty() {
        return bad_request("At least one file is required");
    }

    let media_type = files[0].media_type;
    if files.iter().any(|f| f.media_type != media_type) {
        return bad_request("All files in one document must share a media type");
    }

    let upload_id = Uuid::new_v4();
    let mut blob_keys = Vec::with_capacity(files.len());
    for file in &files {
        let key = BlobKey::for_upload(upload_id, &file.filename);
        if let Err(e) = state.blob_store.put(&key, file.data.clone()).await {
            tracing::error!(error = %e, key = %key, "Blob upload failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to store file: {}", e),
                }),
            )
                .into_response();
        }
        blob_keys.push(key);
    }

    let new = NewDocument {
        owner_id,
        title,
        tags,
        media_type,
        blob_keys: blob_keys.clone(),
        valid_from,
        valid_until,
    };

    match state.lifecycle.submit(new).await {
        Ok(document) => (
            StatusCode::CREATED,
            Json(SubmitResponse {
                document: DocumentResponse::from(&document),
                message: "Document submitted for approval".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            for key in &blob_keys {
                if let Err(del_err) = state.blob_store.delete(key).await {
                    tracing::warn!(error = %del_err, key = %key, "Failed to clean up staged blob");
                }
            }
            lifecycle_error_response(e)
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn get_document_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Response {
    let id = match parse_document_id(&document_id) {
        Ok(id) => id,
        Err(r) => return r,
    };

    match state.lifecycle.get_document(id).await {
        Ok(document) => {
            (StatusCode::OK, Json(DocumentResponse::from(&document))).into_response()
        }
        Err(e) => lifecycle_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn list_documents_handler(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Response {
    let status = match query.status.as_deref().map(str::parse::<DocumentStatus>) {
        Some(Ok(s)) => Some(s),
        Some(Err(e)) => return bad_request(e),
        None => None,
    };

    let filter = crate::application::ports::DocumentFilter {
        owner_id: query.owner_id,
        status,
    };

    match state.lifecycle.list_documents(&filter).await {
        Ok(documents) => {
            let body: Vec<DocumentResponse> =
                documents.iter().map(DocumentResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => lifecycle_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_document_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Response {
    let id = match parse_document_id(&document_id) {
        Ok(id) => id,
        Err(r) => return r,
    };

    match state.lifecycle.delete_document(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => lifecycle_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn approve_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Response {
    let id = match parse_document_id(&document_id) {
        Ok(id) => id,
        Err(r) => return r,
    };

    match state.lifecycle.approve(id).await {
        Ok(document) => {
            (StatusCode::OK, Json(DocumentResponse::from(&document))).into_response()
        }
        Err(e) => lifecycle_error_response(e),
    }
}

#[tracing::instrument(skip(state, request))]
pub async fn reject_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> Response {
    let id = match parse_document_id(&document_id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    if request.reason.trim().is_empty() {
        return bad_request("Rejection reason must not be empty");
    }

    match state.lifecycle.reject(id, &request.reason).await {
        Ok(document) => {
            (StatusCode::OK, Json(DocumentResponse::from(&document))).into_response()
        }
        Err(e) => lifecycle_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn request_chunking_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Response {
    let id = match parse_document_id(&document_id) {
        Ok(id) => id,
        Err(r) => return r,
    };

    match state.lifecycle.request_chunking(id).await {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(RequestChunkingResponse {
                job_id: job_id.as_uuid().to_string(),
                message: "Chunk job enqueued".to_string(),
            }),
        )
            .into_response(),
        Err(e) => lifecycle_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn list_chunks_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Response {
    let id = match parse_document_id(&document_id) {
        Ok(id) => id,
        Err(r) => return r,
    };

    match state.lifecycle.list_chunks(id).await {
        Ok(chunks) => {
            let body: Vec<ChunkResponse> = chunks.iter().map(ChunkResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => lifecycle_error_response(e),
    }
}

fn parse_document_id(raw: &str) -> Result<DocumentId, Response> {
    Uuid::parse_str(raw)
        .map(DocumentId::from_uuid)
        .map_err(|_| bad_request(format!("Invalid document ID: {}", raw)))
}

fn parse_timestamp(
    text: Result<String, axum::extract::multipart::MultipartError>,
    field: &str,
) -> Result<Option<DateTime<Utc>>, Response> {
    let text = text.map_err(|e| bad_request(format!("Failed to read {}: {}", field, e)))?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(text.trim())
        .map(|t| Some(t.with_timezone(&Utc)))
        .map_err(|_| bad_request(format!("{} must be an RFC 3339 timestamp", field)))
}
