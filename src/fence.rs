//! Code region detection for fenced blocks and inline code spans.
//!
//! Several passes must leave code untouched: heading detection for the
//! outline, math extraction and the strikethrough rewrite. They share the
//! fence state machine and segmentation defined here.

/// Tracks whether the current line is inside a fenced code block.
///
/// A fence opens on a line whose trimmed form starts with three or more
/// backticks or tildes. It closes on a line starting with a run of the
/// same character at least as long as the opening run.
#[derive(Debug, Default, Clone)]
pub struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line and reports whether it belongs to a fenced block.
    ///
    /// Returns true for the opening and closing fence lines as well as
    /// every line between them.
    pub fn is_code(&mut self, line: &str) -> bool {
        let marker = fence_marker(line.trim());

        match (self.open, marker) {
            (None, Some(run)) => {
                self.open = Some(run);
                true
            }
            (None, None) => false,
            (Some((ch, len)), Some((run_ch, run_len))) if ch == run_ch && run_len >= len => {
                self.open = None;
                true
            }
            (Some(_), _) => true,
        }
    }

    /// Returns true while a fence is open.
    pub fn in_fence(&self) -> bool {
        self.open.is_some()
    }
}

/// Returns the fence character and run length when the line opens a fence.
fn fence_marker(trimmed: &str) -> Option<(char, usize)> {
    let ch = trimmed.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }

    let run = trimmed.chars().take_while(|c| *c == ch).count();
    (run >= 3).then_some((ch, run))
}

/// Slice of markdown source classified as prose or code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Prose(&'a str),
    Code(&'a str),
}

/// Splits markdown into prose and code segments.
///
/// Fenced blocks (including their fence lines) and inline code spans
/// become `Code` segments. Concatenating all segments yields the input.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut result = Vec::new();
    let mut tracker = FenceTracker::new();
    let mut prose_start = 0;
    let mut code_start = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        if tracker.is_code(line) {
            if code_start.is_none() {
                split_code_spans(&text[prose_start..line_start], &mut result);
                code_start = Some(line_start);
            }
            if !tracker.in_fence() {
                if let Some(start) = code_start.take() {
                    result.push(Segment::Code(&text[start..offset]));
                }
                prose_start = offset;
            }
        }
    }

    match code_start {
        // Unterminated fence runs to the end of the document
        Some(start) => result.push(Segment::Code(&text[start..])),
        None => split_code_spans(&text[prose_start..], &mut result),
    }

    result
}

/// Applies a rewrite to prose segments, copying code segments verbatim.
pub fn map_prose(text: &str, mut rewrite: impl FnMut(&str) -> String) -> String {
    let mut result = String::with_capacity(text.len());
    for segment in segments(text) {
        match segment {
            Segment::Prose(prose) => result.push_str(&rewrite(prose)),
            Segment::Code(code) => result.push_str(code),
        }
    }
    result
}

/// Splits a prose region on inline code spans.
///
/// A run of N backticks opens a span closed by the next run of exactly N
/// backticks. Runs without a closing partner stay literal prose.
fn split_code_spans<'a>(prose: &'a str, out: &mut Vec<Segment<'a>>) {
    let bytes = prose.as_bytes();
    let mut start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'`' {
            pos += 1;
            continue;
        }

        let run_start = pos;
        while pos < bytes.len() && bytes[pos] == b'`' {
            pos += 1;
        }

        if let Some(span_end) = closing_run(bytes, pos, pos - run_start) {
            if run_start > start {
                out.push(Segment::Prose(&prose[start..run_start]));
            }
            out.push(Segment::Code(&prose[run_start..span_end]));
            start = span_end;
            pos = span_end;
        }
    }

    if start < prose.len() {
        out.push(Segment::Prose(&prose[start..]));
    }
}

/// Finds the end of the next backtick run with exactly `len` backticks.
///
/// Code spans never cross a paragraph break, so the search stops at the
/// first blank line.
fn closing_run(bytes: &[u8], from: usize, len: usize) -> Option<usize> {
    let mut pos = from;
    while pos < bytes.len() {
        match bytes[pos] {
            b'`' => {
                let run_start = pos;
                while pos < bytes.len() && bytes[pos] == b'`' {
                    pos += 1;
                }
                if pos - run_start == len {
                    return Some(pos);
                }
            }
            b'\n' if is_blank_line(&bytes[pos + 1..]) => return None,
            _ => pos += 1,
        }
    }
    None
}

/// True when the line starting at `rest` holds only whitespace.
fn is_blank_line(rest: &[u8]) -> bool {
    rest.iter()
        .take_while(|&&byte| byte != b'\n')
        .all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_backtick_fence() {
        // Arrange
        let mut tracker = FenceTracker::new();

        // Act
        let flags: Vec<bool> = ["text", "```rust", "# code", "```", "after"]
            .iter()
            .map(|line| tracker.is_code(line))
            .collect();

        // Assert
        assert_eq!(flags, vec![false, true, true, true, false]);
    }

    #[test]
    fn test_tracker_requires_matching_character() {
        // Arrange
        let mut tracker = FenceTracker::new();

        // Act
        tracker.is_code("~~~");
        let tilde_inside = tracker.is_code("```");
        let still_open = tracker.in_fence();
        tracker.is_code("~~~");

        // Assert
        assert!(tilde_inside, "Backtick line inside tilde fence is code");
        assert!(still_open, "Backticks must not close a tilde fence");
        assert!(!tracker.in_fence(), "Tildes close the tilde fence");
    }

    #[test]
    fn test_tracker_requires_minimum_run_length() {
        // Arrange
        let mut tracker = FenceTracker::new();

        // Act
        tracker.is_code("````");
        tracker.is_code("```");
        let open_after_short = tracker.in_fence();
        tracker.is_code("````");

        // Assert
        assert!(open_after_short, "Shorter run must not close the fence");
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_tracker_ignores_two_backticks() {
        let mut tracker = FenceTracker::new();
        assert!(!tracker.is_code("``not a fence``"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_segments_fenced_block() {
        // Arrange
        let text = "before\n```\n$x$\n```\nafter\n";

        // Act
        let parts = segments(text);

        // Assert
        assert_eq!(
            parts,
            vec![
                Segment::Prose("before\n"),
                Segment::Code("```\n$x$\n```\n"),
                Segment::Prose("after\n"),
            ]
        );
    }

    #[test]
    fn test_segments_inline_code_span() {
        // Arrange
        let text = "use `$PATH` and ``a ` b`` here";

        // Act
        let parts = segments(text);

        // Assert
        assert_eq!(
            parts,
            vec![
                Segment::Prose("use "),
                Segment::Code("`$PATH`"),
                Segment::Prose(" and "),
                Segment::Code("``a ` b``"),
                Segment::Prose(" here"),
            ]
        );
    }

    #[test]
    fn test_segments_unclosed_backtick_is_prose() {
        let parts = segments("a ` b");
        assert_eq!(parts, vec![Segment::Prose("a ` b")]);
    }

    #[test]
    fn test_code_span_stops_at_blank_line() {
        // Arrange
        let text = "A stray ` tick.\n\nEnergy $E$.\n \nAnother ` tick.\n";

        // Act
        let parts = segments(text);

        // Assert
        assert_eq!(parts, vec![Segment::Prose(text)]);
    }

    #[test]
    fn test_code_span_across_soft_break() {
        // Arrange
        let text = "see `a\nb` here";

        // Act
        let parts = segments(text);

        // Assert
        assert_eq!(
            parts,
            vec![
                Segment::Prose("see "),
                Segment::Code("`a\nb`"),
                Segment::Prose(" here"),
            ]
        );
    }

    #[test]
    fn test_segments_unterminated_fence() {
        let parts = segments("a\n```\ncode");
        assert_eq!(parts, vec![Segment::Prose("a\n"), Segment::Code("```\ncode")]);
    }

    #[test]
    fn test_map_prose_preserves_code() {
        // Arrange
        let text = "x `x` x\n```\nx\n```\n";

        // Act
        let result = map_prose(text, |prose| prose.replace('x', "y"));

        // Assert
        assert_eq!(result, "y `x` y\n```\nx\n```\n");
    }

    #[test]
    fn test_segments_empty_input() {
        assert!(segments("").is_empty());
    }
}
