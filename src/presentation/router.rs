use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    approve_handler, cancel_job_handler, delete_document_handler, get_document_handler,
    health_handler, job_status_handler, list_chunks_handler, list_documents_handler,
    reject_handler, request_chunking_handler, submit_document_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/v1/documents",
            get(list_documents_handler).post(submit_document_handler),
        )
        .route(
            "/api/v1/documents/{id}",
            get(get_document_handler).delete(delete_document_handler),
        )
        .route("/api/v1/documents/{id}/approve", post(approve_handler))
        .route("/api/v1/documents/{id}/reject", post(reject_handler))
        .route("/api/v1/documents/{id}/chunk", post(request_chunking_handler))
        .route("/api/v1/documents/{id}/chunks", get(list_chunks_handler))
        .route("/api/v1/jobs/{job_id}", get(job_status_handler))
        .route("/api/v1/jobs/{job_id}/cancel", post(cancel_job_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
