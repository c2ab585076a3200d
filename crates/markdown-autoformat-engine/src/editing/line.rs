//! Line location inside a block's flattened text.

use serde::{Deserialize, Serialize};

/// The chars of one line: `start..end`, where `end` is the index of the
/// terminating `\n` or the text length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Index of the line's last character, `None` for an empty line
    pub fn last(&self) -> Option<usize> {
        self.end.checked_sub(1).filter(|&last| last >= self.start)
    }

    /// Whether a cursor at `offset` sits on this line
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// Find the line enclosing `offset`.
///
/// Offsets past the end of `text` are clamped to its length.
pub fn locate_line(text: &[char], offset: usize) -> LineRange {
    let offset = offset.min(text.len());

    let start = text[..offset]
        .iter()
        .rposition(|&c| c == '\n')
        .map_or(0, |newline| newline + 1);
    let end = text[offset..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(text.len(), |newline| offset + newline);

    LineRange { start, end }
}

/// Slice the chars of a located line
pub fn line_text(text: &[char], line: LineRange) -> &[char] {
    &text[line.start..line.end]
}
