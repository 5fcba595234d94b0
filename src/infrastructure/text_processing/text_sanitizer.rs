/// Normalizes extractor output: trims lines, collapses internal whitespace
/// runs to a single space, and collapses blank-line runs to one paragraph
/// break. Deterministic, so sanitized text feeds the idempotent re-chunk
/// path safely.
pub fn sanitize_extracted_text(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut prev_was_blank = false;
    let mut first_content = true;

    for line in raw.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            prev_was_blank = true;
        } else {
            if !first_content && prev_was_blank {
                result.push_str("\n\n");
            } else if !first_content {
                result.push('\n');
            }
            collapse_internal_whitespace(trimmed, &mut result);
            prev_was_blank = false;
            first_content = false;
        }
    }

    result
}

fn collapse_internal_whitespace(line: &str, out: &mut String) {
    let mut prev_was_space = false;

    for ch in line.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                out.push(' ');
                prev_was_space = true;
            }
        } else if !ch.is_control() {
            out.push(ch);
            prev_was_space = false;
        }
    }
}
