/// Failures surfaced by the metadata repositories. Stringly payloads keep the
/// port free of driver types; adapters translate their native errors here.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository connection failed: {0}")]
    ConnectionFailed(String),
    #[error("repository query failed: {0}")]
    QueryFailed(String),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("constraint violated: {0}")]
    ConstraintViolation(String),
}
