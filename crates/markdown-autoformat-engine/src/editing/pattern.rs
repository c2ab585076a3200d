//! Header prefix recognition.
//!
//! Evaluated when Space is about to be inserted, so a line made only of `#`
//! characters is a complete `# `-style prefix.

use crate::model::HeaderLevel;

pub const HEADER_MARKER: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMatch {
    /// Number of `#` characters on the line
    pub hashes: usize,
    pub level: HeaderLevel,
}

/// Match a line consisting of one or more `#` characters and nothing else.
pub fn match_header_prefix(line: &[char]) -> Option<HeaderMatch> {
    let hashes = line.iter().take_while(|&&c| c == HEADER_MARKER).count();
    if hashes == 0 || hashes != line.len() {
        return None;
    }
    Some(HeaderMatch {
        hashes,
        level: HeaderLevel::clamped(hashes),
    })
}
