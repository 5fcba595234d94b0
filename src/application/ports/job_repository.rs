use async_trait::async_trait;

use crate::domain::{ChunkJob, JobId, JobStatus};

use super::RepositoryError;

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &ChunkJob) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<ChunkJob>, RepositoryError>;

    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError>;

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<ChunkJob>, RepositoryError>;
}
