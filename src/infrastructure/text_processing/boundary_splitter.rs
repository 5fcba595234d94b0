use crate::application::ports::{ChunkPolicy, TextSplitter, TextSplitterError};

/// Greedy left-to-right splitter over Unicode scalar values.
///
/// Each chunk covers at most `max_chunk_size` chars. The cut prefers the
/// position just after the last whitespace char within `boundary_lookback`
/// of the size limit, falling back to a hard cut when the window holds no
/// whitespace. The next chunk starts `overlap` chars before the previous
/// cut, so consecutive chunks share exactly `overlap` chars and
/// `chunks[0] + chunks[1..][overlap..]` reconstructs the input.
pub struct BoundaryCharacterSplitter {
    policy: ChunkPolicy,
}

impl BoundaryCharacterSplitter {
    pub fn new(policy: ChunkPolicy) -> Self {
        Self { policy }
    }

    fn cut_position(&self, chars: &[char], start: usize) -> usize {
        let total = chars.len();
        let hard_end = (start + self.policy.max_chunk_size()).min(total);
        if hard_end == total {
            return total;
        }

        // The floor keeps every chunk at least overlap + 1 chars long, so the
        // splitter always advances.
        let floor = (hard_end - self.policy.boundary_lookback()).max(start + self.policy.overlap() + 1);

        let mut end = hard_end;
        while end > floor {
            if chars[end - 1].is_whitespace() {
                return end;
            }
            end -= 1;
        }
        hard_end
    }
}

impl TextSplitter for BoundaryCharacterSplitter {
    fn split(&self, text: &str) -> Result<Vec<String>, TextSplitterError> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();

        let mut chunks = Vec::new();
        if total == 0 {
            return Ok(chunks);
        }

        let mut start = 0;
        loop {
            let end = self.cut_position(&chars, start);
            chunks.push(chars[start..end].iter().collect());

            if end == total {
                break;
            }
            start = end - self.policy.overlap();
        }

        Ok(chunks)
    }
}
