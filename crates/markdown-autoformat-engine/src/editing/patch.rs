/// Result of applying operations to a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Span of block indices (in the edited document) touched by the edit
    pub changed: std::ops::Range<usize>,
    pub version: u64,
}
