use std::fmt;

use uuid::Uuid;

/// Key addressing an immutable byte payload in the blob store.
///
/// Keys are scoped under a per-upload prefix so blobs can be stored durably
/// before the document row that references them exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey(String);

impl BlobKey {
    pub fn for_upload(upload_id: Uuid, filename: &str) -> Self {
        Self(format!("uploads/{}/{}", upload_id, filename))
    }

    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
