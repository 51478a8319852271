//! Helpers for the textual (non-grammar) scanners.
//!
//! Scanners work on a masked copy of the source in which comments and string
//! contents are blanked out. Masking keeps byte offsets and newlines intact,
//! so positions found in the masked text index the original directly.

/// Comment syntax of a scanned language.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CommentStyle {
    pub line: &'static str,
    pub block: bool,
    /// `"""` block strings (GraphQL descriptions).
    pub triple_quoted: bool,
}

/// Blank out comments and the contents of string literals.
pub(crate) fn mask(content: &str, style: CommentStyle) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str(char),
        BlockStr,
    }

    let bytes = content.as_bytes();
    let mut out = String::with_capacity(content.len());
    let mut state = State::Code;
    let mut skip = 0usize;

    for (idx, ch) in content.char_indices() {
        if skip > 0 {
            skip -= 1;
            out.push(blank(ch));
            continue;
        }
        let rest = &content[idx..];
        match state {
            State::Code => {
                if rest.starts_with(style.line) {
                    state = State::LineComment;
                    out.push(' ');
                } else if style.block && rest.starts_with("/*") {
                    state = State::BlockComment;
                    skip = 1;
                    out.push(' ');
                } else if style.triple_quoted && rest.starts_with("\"\"\"") {
                    state = State::BlockStr;
                    skip = 2;
                    out.push('"');
                } else if ch == '"' || ch == '\'' {
                    state = State::Str(ch);
                    out.push(ch);
                } else {
                    out.push(ch);
                }
            }
            State::LineComment => {
                if ch == '\n' {
                    state = State::Code;
                }
                out.push(blank(ch));
            }
            State::BlockComment => {
                if rest.starts_with("*/") {
                    state = State::Code;
                    skip = 1;
                }
                out.push(blank(ch));
            }
            State::Str(quote) => {
                if ch == quote && !escaped(bytes, idx) {
                    state = State::Code;
                    out.push(ch);
                } else if ch == '\n' {
                    // Unterminated literal: stop masking at the line end.
                    state = State::Code;
                    out.push('\n');
                } else {
                    out.push(blank(ch));
                }
            }
            State::BlockStr => {
                if rest.starts_with("\"\"\"") {
                    state = State::Code;
                    skip = 2;
                    out.push('"');
                } else {
                    out.push(blank(ch));
                }
            }
        }
    }

    out
}

/// Same-width stand-in for a masked character.
fn blank(ch: char) -> char {
    if ch == '\n' {
        '\n'
    } else if ch.len_utf8() == 1 {
        ' '
    } else {
        // Keep byte width so offsets stay aligned with the original.
        ch
    }
}

fn escaped(bytes: &[u8], idx: usize) -> bool {
    let mut count = 0;
    let mut pos = idx;
    while pos > 0 && bytes[pos - 1] == b'\\' {
        count += 1;
        pos -= 1;
    }
    count % 2 == 1
}

/// 1-based line of a byte offset.
pub(crate) fn line_at(content: &str, offset: usize) -> u32 {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() as u32 + 1
}

/// Offset of the `}` matching the `{` at `open`.
pub(crate) fn block_end(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (idx, ch) in text[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Consecutive line comments directly above the line containing `offset`.
pub(crate) fn preceding_line_comments(content: &str, offset: usize, marker: &str) -> Option<String> {
    let line_start = content[..offset.min(content.len())]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);

    let mut lines: Vec<&str> = Vec::new();
    for line in content[..line_start].lines().rev() {
        let trimmed = line.trim();
        match trimmed.strip_prefix(marker) {
            Some(text) => lines.push(text.trim_start_matches(marker).trim()),
            None => break,
        }
    }

    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    let doc = lines.join("\n").trim().to_string();
    (!doc.is_empty()).then_some(doc)
}

/// Blank out the given inclusive byte ranges, e.g. nested blocks, so only a
/// body's own statements remain.
pub(crate) fn blank_ranges(text: &str, ranges: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, ch) in text.char_indices() {
        if ranges.iter().any(|(start, end)| idx >= *start && idx <= *end) {
            out.push(blank(ch));
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROTO: CommentStyle = CommentStyle {
        line: "//",
        block: true,
        triple_quoted: false,
    };

    #[test]
    fn test_mask_keeps_offsets() {
        let src = "a // x { y\nb /* { */ \"}\" c";
        let masked = mask(src, PROTO);
        assert_eq!(masked.len(), src.len());
        assert!(!masked.contains('{'));
        assert!(!masked.contains('}'));
        assert_eq!(masked.lines().count(), 2);
        assert!(masked.ends_with("\" \" c"));
    }

    #[test]
    fn test_block_end_and_lines() {
        let src = "x {\n a { b }\n}\n";
        assert_eq!(block_end(src, 2), Some(13));
        assert_eq!(line_at(src, 0), 1);
        assert_eq!(line_at(src, 5), 2);
    }

    #[test]
    fn test_preceding_line_comments() {
        let src = "// unrelated\n\n// A user.\n// Second line.\nmessage User {}";
        let offset = src.find("message").unwrap();
        assert_eq!(
            preceding_line_comments(src, offset, "//").as_deref(),
            Some("A user.\nSecond line.")
        );
    }
}
