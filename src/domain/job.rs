use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{DocumentId, JobStatus};

/// Ledger entry for one "chunk this document" job. The document's status is
/// the externally visible projection of the terminal outcome recorded here.
#[derive(Debug, Clone)]
pub struct ChunkJob {
    pub id: JobId,
    pub document_id: DocumentId,
    pub status: JobStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChunkJob {
    pub fn new(document_id: DocumentId) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            document_id,
            status: JobStatus::Queued,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}
