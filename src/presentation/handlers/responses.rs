use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::services::LifecycleError;
use crate::domain::{Chunk, ChunkJob, Document};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct DocumentResponse {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub media_type: String,
    pub blob_keys: Vec<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub failure_detail: Option<String>,
    pub valid_from: Option<String>,
    pub valid_until: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Document> for DocumentResponse {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.as_uuid().to_string(),
            owner_id: doc.owner_id.to_string(),
            title: doc.title.clone(),
            tags: doc.tags.clone(),
            media_type: doc.media_type.as_mime().to_string(),
            blob_keys: doc.blob_keys.iter().map(|k| k.to_string()).collect(),
            status: doc.status.as_str().to_string(),
            rejection_reason: doc.rejection_reason.clone(),
            failure_detail: doc.failure_detail.clone(),
            valid_from: doc.valid_from.map(|t| t.to_rfc3339()),
            valid_until: doc.valid_until.map(|t| t.to_rfc3339()),
            created_at: doc.created_at.to_rfc3339(),
            updated_at: doc.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct ChunkResponse {
    pub id: String,
    pub document_id: String,
    pub ordinal: u32,
    pub text: String,
    pub vector_id: Option<String>,
}

impl From<&Chunk> for ChunkResponse {
    fn from(chunk: &Chunk) -> Self {
        Self {
            id: chunk.id.as_uuid().to_string(),
            document_id: chunk.document_id.as_uuid().to_string(),
            ordinal: chunk.ordinal,
            text: chunk.text.clone(),
            vector_id: chunk.vector_id.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct JobResponse {
    pub id: String,
    pub document_id: String,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&ChunkJob> for JobResponse {
    fn from(job: &ChunkJob) -> Self {
        Self {
            id: job.id.as_uuid().to_string(),
            document_id: job.document_id.as_uuid().to_string(),
            status: job.status.as_str().to_string(),
            error_message: job.error_message.clone(),
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

pub fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Maps the lifecycle error taxonomy onto HTTP statuses: caller-fixable
/// errors get 4xx, infrastructure failures 5xx.
pub fn lifecycle_error_response(error: LifecycleError) -> Response {
    let status = match &error {
        LifecycleError::Validation(_) => StatusCode::BAD_REQUEST,
        LifecycleError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        LifecycleError::InvalidState { .. } => StatusCode::CONFLICT,
        LifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
        LifecycleError::Queue(_) => StatusCode::SERVICE_UNAVAILABLE,
        LifecycleError::Repository(_) | LifecycleError::BlobStore(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status.is_server_error() {
        tracing::error!(error = %error, "Request failed");
    }

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}
