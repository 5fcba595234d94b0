use boardrag::application::ports::{ChunkPolicy, PolicyError, TextSplitter};
use boardrag::infrastructure::text_processing::BoundaryCharacterSplitter;

const MAX_CHUNK_SIZE: usize = 300;
const OVERLAP: usize = 50;
const BOUNDARY_LOOKBACK: usize = 100;

fn splitter(max: usize, overlap: usize, lookback: usize) -> BoundaryCharacterSplitter {
    let policy = ChunkPolicy::new(max, overlap, lookback).unwrap();
    BoundaryCharacterSplitter::new(policy)
}

fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Rebuilds the input from the first chunk plus each later chunk minus its
/// leading overlap.
fn reconstruct(chunks: &[String], overlap: usize) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            out.push_str(chunk);
        } else {
            out.extend(chunk.chars().skip(overlap));
        }
    }
    out
}

#[test]
fn given_empty_text_when_split_then_returns_no_chunks() {
    let splitter = splitter(MAX_CHUNK_SIZE, OVERLAP, BOUNDARY_LOOKBACK);

    let chunks = splitter.split("").unwrap();

    assert!(chunks.is_empty());
}

#[test]
fn given_text_shorter_than_limit_when_split_then_returns_single_identical_chunk() {
    let splitter = splitter(MAX_CHUNK_SIZE, OVERLAP, BOUNDARY_LOOKBACK);
    let text = "A short board meeting note.";

    let chunks = splitter.split(text).unwrap();

    assert_eq!(chunks, vec![text.to_string()]);
}

#[test]
fn given_unbroken_text_when_split_then_hard_cuts_into_expected_chunks() {
    let splitter = splitter(MAX_CHUNK_SIZE, OVERLAP, BOUNDARY_LOOKBACK);
    let text = "x".repeat(1000);

    let chunks = splitter.split(&text).unwrap();

    // 1000 chars at max 300 / overlap 50 advance 250 per chunk: cuts at
    // 300, 550, 800, 1000.
    assert_eq!(chunks.len(), 4);
    for chunk in &chunks {
        assert!(char_count(chunk) <= MAX_CHUNK_SIZE);
    }
    for pair in chunks.windows(2) {
        let prev: Vec<char> = pair[0].chars().collect();
        let next: Vec<char> = pair[1].chars().collect();
        assert_eq!(prev[prev.len() - OVERLAP..], next[..OVERLAP]);
    }
    assert_eq!(reconstruct(&chunks, OVERLAP), text);
}

#[test]
fn given_text_with_whitespace_when_split_then_cuts_land_after_whitespace() {
    let splitter = splitter(40, 8, 15);
    let text = "alpha bravo charlie delta echo foxtrot golf hotel india juliett kilo lima mike";

    let chunks = splitter.split(&text).unwrap();

    assert!(chunks.len() > 1);
    for chunk in &chunks[..chunks.len() - 1] {
        let last = chunk.chars().last().unwrap();
        assert!(
            last.is_whitespace(),
            "expected boundary cut, chunk ended with {:?}",
            last
        );
    }
    assert_eq!(reconstruct(&chunks, 8), text);
}

#[test]
fn given_multibyte_text_when_split_then_overlap_is_counted_in_chars() {
    let splitter = splitter(10, 3, 4);
    let text = "äöüßäöüßäöüßäöüßäöüß";

    let chunks = splitter.split(&text).unwrap();

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(char_count(chunk) <= 10);
    }
    assert_eq!(reconstruct(&chunks, 3), text);
}

#[test]
fn given_same_input_when_split_twice_then_output_is_identical() {
    let splitter = splitter(MAX_CHUNK_SIZE, OVERLAP, BOUNDARY_LOOKBACK);
    let text = "Board approved the Q3 budget. ".repeat(40);

    let first = splitter.split(&text).unwrap();
    let second = splitter.split(&text).unwrap();

    assert_eq!(first, second);
}

#[test]
fn given_zero_chunk_size_when_building_policy_then_fails() {
    let result = ChunkPolicy::new(0, 0, 0);

    assert!(matches!(result, Err(PolicyError::ZeroChunkSize)));
}

#[test]
fn given_overlap_at_least_chunk_size_when_building_policy_then_fails() {
    let result = ChunkPolicy::new(100, 100, 10);

    assert!(result.is_err());
}
