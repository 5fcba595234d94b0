use sqlx::PgPool;

use crate::application::ports::RepositoryError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL,
        title TEXT NOT NULL,
        tags TEXT[] NOT NULL DEFAULT '{}',
        media_type TEXT NOT NULL,
        blob_keys TEXT[] NOT NULL,
        status TEXT NOT NULL,
        rejection_reason TEXT,
        failure_detail TEXT,
        valid_from TIMESTAMPTZ,
        valid_until TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chunks (
        id UUID PRIMARY KEY,
        document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
        ordinal INTEGER NOT NULL,
        chunk_text TEXT NOT NULL,
        vector_id TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        UNIQUE (document_id, ordinal)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chunk_jobs (
        id UUID PRIMARY KEY,
        document_id UUID NOT NULL,
        status TEXT NOT NULL,
        error_message TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status)",
    "CREATE INDEX IF NOT EXISTS idx_documents_owner_status ON documents(owner_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_documents_created_at ON documents(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_chunks_document_id ON chunks(document_id)",
    "CREATE INDEX IF NOT EXISTS idx_chunk_jobs_status ON chunk_jobs(status)",
];

/// Idempotent schema bootstrap, run once at startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
    }
    tracing::info!("Database schema ensured");
    Ok(())
}
