use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{
    CasResult, DocumentFilter, DocumentRepository, RepositoryError,
};
use crate::domain::{BlobKey, Document, DocumentId, DocumentStatus, MediaType};

pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const DOCUMENT_COLUMNS: &str = "id, owner_id, title, tags, media_type, blob_keys, status, \
     rejection_reason, failure_detail, valid_from, valid_until, created_at, updated_at";

fn row_to_document(row: &PgRow) -> Result<Document, RepositoryError> {
    let status: String = get(row, "status")?;
    let status = status
        .parse::<DocumentStatus>()
        .map_err(RepositoryError::QueryFailed)?;

    let media_type: String = get(row, "media_type")?;
    let media_type = MediaType::from_mime(&media_type)
        .ok_or_else(|| RepositoryError::QueryFailed(format!("unknown media type: {media_type}")))?;

    let blob_keys: Vec<String> = get(row, "blob_keys")?;

    Ok(Document {
        id: DocumentId::from_uuid(get(row, "id")?),
        owner_id: get(row, "owner_id")?,
        title: get(row, "title")?,
        tags: get(row, "tags")?,
        media_type,
        blob_keys: blob_keys.into_iter().map(BlobKey::from_raw).collect(),
        status,
        rejection_reason: get(row, "rejection_reason")?,
        failure_detail: get(row, "failure_detail")?,
        valid_from: get(row, "valid_from")?,
        valid_until: get(row, "valid_until")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

fn get<'r, T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>>(
    row: &'r PgRow,
    column: &str,
) -> Result<T, RepositoryError> {
    row.try_get(column)
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    #[instrument(skip(self, document), fields(document_id = %document.id))]
    async fn create(&self, document: &Document) -> Result<(), RepositoryError> {
        let blob_keys: Vec<String> = document
            .blob_keys
            .iter()
            .map(|k| k.as_str().to_string())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO documents
                (id, owner_id, title, tags, media_type, blob_keys, status,
                 rejection_reason, failure_detail, valid_from, valid_until,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(document.id.as_uuid())
        .bind(document.owner_id)
        .bind(&document.title)
        .bind(&document.tags)
        .bind(document.media_type.as_mime())
        .bind(&blob_keys)
        .bind(document.status.as_str())
        .bind(&document.rejection_reason)
        .bind(&document.failure_detail)
        .bind(document.valid_from)
        .bind(document.valid_until)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(document_id = %id))]
    async fn get_by_id(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(row_to_document).transpose()
    }

    #[instrument(skip(self, filter))]
    async fn list(&self, filter: &DocumentFilter) -> Result<Vec<Document>, RepositoryError> {
        let owner: Option<Uuid> = filter.owner_id;
        let status: Option<&str> = filter.status.map(|s| s.as_str());

        let rows = sqlx::query(&format!(
            r#"
            SELECT {DOCUMENT_COLUMNS} FROM documents
            WHERE ($1::uuid IS NULL OR owner_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner)
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.iter().map(row_to_document).collect()
    }

    /// The conditional UPDATE commits only if the status precondition still
    /// holds, which makes concurrent transitions on one document resolve to
    /// exactly one winner.
    #[instrument(skip(self, detail), fields(document_id = %id, next = %next))]
    async fn compare_and_set_status(
        &self,
        id: DocumentId,
        expected: &[DocumentStatus],
        next: DocumentStatus,
        detail: Option<&str>,
    ) -> Result<CasResult, RepositoryError> {
        let expected: Vec<String> = expected.iter().map(|s| s.as_str().to_string()).collect();
        let now: DateTime<Utc> = Utc::now();

        let row = sqlx::query(&format!(
            r#"
            UPDATE documents
            SET status = $2,
                rejection_reason = CASE
                    WHEN $2 = 'rejected' THEN $3
                    ELSE rejection_reason
                END,
                failure_detail = CASE
                    WHEN $2 = 'chunk_failed' THEN $3
                    WHEN $2 IN ('chunking', 'chunked') THEN NULL
                    ELSE failure_detail
                END,
                updated_at = $4
            WHERE id = $1 AND status = ANY($5)
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(next.as_str())
        .bind(detail)
        .bind(now)
        .bind(&expected)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if let Some(row) = row {
            return Ok(CasResult::Updated(row_to_document(&row)?));
        }

        // Precondition failed; report what the status actually was.
        let actual = sqlx::query("SELECT status FROM documents WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        let actual: String = actual
            .try_get("status")
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
        let actual = actual
            .parse::<DocumentStatus>()
            .map_err(RepositoryError::QueryFailed)?;

        Ok(CasResult::Conflict(actual))
    }

    #[instrument(skip(self), fields(document_id = %id))]
    async fn delete(&self, id: DocumentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
