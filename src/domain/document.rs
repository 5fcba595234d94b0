use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{BlobKey, DocumentId, DocumentStatus, MediaType};

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub owner_id: Uuid,
    pub title: String,
    pub tags: Vec<String>,
    pub media_type: MediaType,
    /// One document may reference several stored files; all must exist in the
    /// blob store before the document leaves `pending`.
    pub blob_keys: Vec<BlobKey>,
    pub status: DocumentStatus,
    pub rejection_reason: Option<String>,
    pub failure_detail: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission payload; everything the caller provides before the lifecycle
/// manager assigns identity and status.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub owner_id: Uuid,
    pub title: String,
    pub tags: Vec<String>,
    pub media_type: MediaType,
    pub blob_keys: Vec<BlobKey>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl Document {
    pub fn submit(new: NewDocument) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new(),
            owner_id: new.owner_id,
            title: new.title,
            tags: new.tags,
            media_type: new.media_type,
            blob_keys: new.blob_keys,
            status: DocumentStatus::Pending,
            rejection_reason: None,
            failure_detail: None,
            valid_from: new.valid_from,
            valid_until: new.valid_until,
            created_at: now,
            updated_at: now,
        }
    }
}
