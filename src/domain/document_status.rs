use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a document.
///
/// `pending → approved → chunking → chunked`, with `rejected` as the terminal
/// alternative out of `pending` and `chunk_failed` re-enterable to `chunking`
/// on retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    Pending,
    Approved,
    Chunking,
    Chunked,
    Rejected,
    ChunkFailed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Chunking => "chunking",
            DocumentStatus::Chunked => "chunked",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::ChunkFailed => "chunk_failed",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DocumentStatus::Pending),
            "approved" => Ok(DocumentStatus::Approved),
            "chunking" => Ok(DocumentStatus::Chunking),
            "chunked" => Ok(DocumentStatus::Chunked),
            "rejected" => Ok(DocumentStatus::Rejected),
            "chunk_failed" => Ok(DocumentStatus::ChunkFailed),
            _ => Err(format!("Invalid document status: {}", s)),
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
