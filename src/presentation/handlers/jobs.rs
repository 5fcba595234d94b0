use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::application::ports::CancelOutcome;
use crate::application::services::LifecycleError;
use crate::domain::{JobId, JobStatus};
use crate::presentation::state::AppState;

use super::responses::{bad_request, ErrorResponse, JobResponse};

#[derive(Serialize)]
pub struct CancelResponse {
    pub job_id: String,
    pub message: String,
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(r) => return r,
    };

    match state.jobs.get_by_id(id).await {
        Ok(Some(job)) => (StatusCode::OK, Json(JobResponse::from(&job))).into_response(),
        Ok(None) => not_found(&job_id),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load chunk job");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to load job: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// Cancels a chunk job. A still-queued job is removed immediately and its
/// document moves to `chunk_failed`; a job already picked up by a worker is
/// flagged and the worker aborts at its next cancellation checkpoint.
#[tracing::instrument(skip(state))]
pub async fn cancel_job_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(r) => return r,
    };

    let job = match state.jobs.get_by_id(id).await {
        Ok(Some(job)) => job,
        Ok(None) => return not_found(&job_id),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load chunk job");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to load job: {}", e),
                }),
            )
                .into_response();
        }
    };

    match state.queue.cancel(id).await {
        Ok(CancelOutcome::Removed) => {
            if let Err(e) = state.jobs.update_status(id, JobStatus::Failed, Some("cancelled")).await
            {
                tracing::error!(error = %e, job_id = %job_id, "Failed to record cancellation");
            }
            match state
                .lifecycle
                .fail_chunking(job.document_id, "cancelled")
                .await
            {
                Ok(()) | Err(LifecycleError::InvalidState { .. }) => {}
                Err(e) => {
                    tracing::error!(error = %e, job_id = %job_id, "Failed to mark document after cancellation");
                }
            }
            (
                StatusCode::OK,
                Json(CancelResponse {
                    job_id,
                    message: "Job cancelled".to_string(),
                }),
            )
                .into_response()
        }
        Ok(CancelOutcome::Flagged) => (
            StatusCode::ACCEPTED,
            Json(CancelResponse {
                job_id,
                message: "Cancellation requested; job is in flight".to_string(),
            }),
        )
            .into_response(),
        Ok(CancelOutcome::NotFound) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Job already finished: {}", job.status),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: format!("Failed to cancel job: {}", e),
            }),
        )
            .into_response(),
    }
}

fn parse_job_id(raw: &str) -> Result<JobId, Response> {
    Uuid::parse_str(raw)
        .map(JobId::from_uuid)
        .map_err(|_| bad_request(format!("Invalid job ID: {}", raw)))
}

fn not_found(job_id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Job not found: {}", job_id),
        }),
    )
        .into_response()
}
