/// Splits extracted text into bounded, ordered segments.
///
/// Implementations must be deterministic: identical `(text, policy)` always
/// yields an identical ordered sequence, which is what makes re-chunking a
/// document idempotent.
pub trait TextSplitter: Send + Sync {
    fn split(&self, text: &str) -> Result<Vec<String>, TextSplitterError>;
}

/// Size policy for splitting. All limits are counted in Unicode scalar values
/// (chars), not bytes or tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    max_chunk_size: usize,
    overlap: usize,
    boundary_lookback: usize,
}

impl ChunkPolicy {
    /// Requires `max_chunk_size > 0` and `overlap < max_chunk_size`. The
    /// lookback window is additionally clamped so a boundary-adjusted cut can
    /// never shrink a chunk below `overlap + 1` chars, which keeps the
    /// splitter advancing.
    pub fn new(
        max_chunk_size: usize,
        overlap: usize,
        boundary_lookback: usize,
    ) -> Result<Self, PolicyError> {
        if max_chunk_size == 0 {
            return Err(PolicyError::ZeroChunkSize);
        }
        if overlap >= max_chunk_size {
            return Err(PolicyError::OverlapTooLarge {
                overlap,
                max_chunk_size,
            });
        }
        let boundary_lookback = boundary_lookback.min(max_chunk_size - overlap - 1);
        Ok(Self {
            max_chunk_size,
            overlap,
            boundary_lookback,
        })
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn boundary_lookback(&self) -> usize {
        self.boundary_lookback
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("max_chunk_size must be greater than zero")]
    ZeroChunkSize,
    #[error("overlap ({overlap}) must be smaller than max_chunk_size ({max_chunk_size})")]
    OverlapTooLarge {
        overlap: usize,
        max_chunk_size: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TextSplitterError {
    #[error("splitting failed: {0}")]
    SplittingFailed(String),
}
