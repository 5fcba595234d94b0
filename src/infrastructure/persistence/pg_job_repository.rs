use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{ChunkJob, DocumentId, JobId, JobStatus};

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_job(row: &PgRow) -> Result<ChunkJob, RepositoryError> {
    let status: String = row
        .try_get("status")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
    let status = status
        .parse::<JobStatus>()
        .map_err(RepositoryError::QueryFailed)?;

    Ok(ChunkJob {
        id: JobId::from_uuid(
            row.try_get("id")
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
        ),
        document_id: DocumentId::from_uuid(
            row.try_get("document_id")
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
        ),
        status,
        error_message: row
            .try_get("error_message")
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
    })
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id.as_uuid()))]
    async fn create(&self, job: &ChunkJob) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chunk_jobs (id, document_id, status, error_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.document_id.as_uuid())
        .bind(job.status.as_str())
        .bind(&job.error_message)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn get_by_id(&self, id: JobId) -> Result<Option<ChunkJob>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, document_id, status, error_message, created_at, updated_at
            FROM chunk_jobs
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(row_to_job).transpose()
    }

    #[instrument(skip(self, error_message), fields(job_id = %id.as_uuid(), status = %status))]
    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE chunk_jobs
            SET status = $1, error_message = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(status.as_str())
        .bind(error_message)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.as_uuid().to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<ChunkJob>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, document_id, status, error_message, created_at, updated_at
            FROM chunk_jobs
            WHERE status = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.iter().map(row_to_job).collect()
    }
}
