use crate::editing::Op;
use crate::model::Selection;

/// Operations to apply for one key event and where the caret goes afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    pub ops: Vec<Op>,
    pub selection: Selection,
}

impl Transform {
    pub fn new(ops: Vec<Op>, selection: Selection) -> Self {
        Self { ops, selection }
    }
}

/// Why a key was left to the host's default handling.
///
/// None of these are failures: the key simply behaves as ordinary input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Fallthrough {
    #[error("no block at index {block} (document has {blocks} blocks)")]
    NoEnclosingBlock { block: usize, blocks: usize },
    #[error("focus offset {offset} is outside the text of block {block} (length {len})")]
    DetachedFocus {
        block: usize,
        offset: usize,
        len: usize,
    },
    #[error("{kind} blocks have no autoformat handler")]
    UnsupportedBlockType { kind: &'static str },
    #[error("current line is not a header prefix")]
    NoPatternMatch,
    #[error("key does not trigger autoformatting")]
    NotATrigger,
    #[error("selection is empty")]
    EmptySelection,
}

/// Result of dispatching one key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Apply the transform and swallow the key
    Transform(Transform),
    /// Let the key through unchanged
    PassThrough(Fallthrough),
}

impl Outcome {
    pub fn suppresses_default(&self) -> bool {
        matches!(self, Outcome::Transform(_))
    }

    pub fn transform(&self) -> Option<&Transform> {
        match self {
            Outcome::Transform(transform) => Some(transform),
            Outcome::PassThrough(_) => None,
        }
    }

    pub fn into_transform(self) -> Option<Transform> {
        match self {
            Outcome::Transform(transform) => Some(transform),
            Outcome::PassThrough(_) => None,
        }
    }

    pub fn fallthrough(&self) -> Option<&Fallthrough> {
        match self {
            Outcome::Transform(_) => None,
            Outcome::PassThrough(reason) => Some(reason),
        }
    }
}
