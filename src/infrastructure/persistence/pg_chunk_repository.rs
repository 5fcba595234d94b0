use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{ChunkRepository, RepositoryError};
use crate::domain::{Chunk, ChunkId, DocumentId};

pub struct PgChunkRepository {
    pool: PgPool,
}

impl PgChunkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChunkRepository for PgChunkRepository {
    /// Delete-then-insert inside one transaction, so readers never see a
    /// partial batch and a retried job converges on a single chunk set.
    #[instrument(skip(self, chunks), fields(document_id = %document_id, chunks = chunks.len()))]
    async fn replace_for_document(
        &self,
        document_id: DocumentId,
        chunks: &[Chunk],
    ) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM chunks WHERE document_id = $1")
            .bind(document_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        for chunk in chunks {
            sqlx::query(
                r#"
                INSERT INTO chunks (id, document_id, ordinal, chunk_text, vector_id, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(chunk.id.as_uuid())
            .bind(chunk.document_id.as_uuid())
            .bind(chunk.ordinal as i32)
            .bind(&chunk.text)
            .bind(&chunk.vector_id)
            .bind(chunk.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(document_id = %document_id))]
    async fn list_for_document(
        &self,
        document_id: DocumentId,
    ) -> Result<Vec<Chunk>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, document_id, ordinal, chunk_text, vector_id, created_at
            FROM chunks
            WHERE document_id = $1
            ORDER BY ordinal ASC
            "#,
        )
        .bind(document_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let ordinal: i32 = row
                    .try_get("ordinal")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
                Ok(Chunk {
                    id: ChunkId::from_uuid(
                        row.try_get("id")
                            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
                    ),
                    document_id: DocumentId::from_uuid(
                        row.try_get("document_id")
                            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
                    ),
                    ordinal: ordinal as u32,
                    text: row
                        .try_get("chunk_text")
                        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
                    vector_id: row
                        .try_get("vector_id")
                        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
                    created_at: row
                        .try_get("created_at")
                        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(document_id = %document_id))]
    async fn delete_for_document(&self, document_id: DocumentId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM chunks WHERE document_id = $1")
            .bind(document_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
        Ok(())
    }
}
