use serde::{Deserialize, Serialize};

use crate::editing::{Op, Patch, TransformError, ops::apply_op};
use crate::model::{Block, BlockKind, HeaderLevel};

/// A position inside the document: a block index and a char offset into
/// that block's flattened text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub block: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Anchor/focus pair. The focus is where the caret is drawn and where keys apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self::new(point, point)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// (start, end) in document order
    pub fn ordered(&self) -> (Point, Point) {
        if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("block {block} has no text runs")]
    BlockWithoutRuns { block: usize },
    #[error("block {block} has header level {level}, outside 1..=6")]
    HeaderLevelOutOfRange { block: usize, level: u8 },
}

/// The rich-text tree: blocks in reading order.
///
/// The document is owned by the host. The dispatcher only reads it and emits
/// [`Op`]s; the host commits them through [`Document::apply_all`], which is
/// the only way blocks change shape after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    blocks: Vec<Block>,
    /// Incremented on each successful edit (enables change detection)
    #[serde(skip)]
    version: u64,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks, version: 0 }
    }

    /// A document holding a single empty paragraph
    pub fn empty() -> Self {
        Self::new(vec![Block::paragraph("")])
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Pull a point back inside the document, or `None` if there are no blocks.
    pub fn clamp_point(&self, point: Point) -> Option<Point> {
        let last = self.blocks.len().checked_sub(1)?;
        let block = point.block.min(last);
        let offset = point.offset.min(self.blocks[block].len());
        Some(Point::new(block, offset))
    }

    pub fn check_invariants(&self) -> Result<(), ModelError> {
        for (index, block) in self.blocks.iter().enumerate() {
            if block.runs().is_empty() {
                return Err(ModelError::BlockWithoutRuns { block: index });
            }
            if let BlockKind::Header { level } = block.kind()
                && !(HeaderLevel::MIN..=HeaderLevel::MAX).contains(level)
            {
                return Err(ModelError::HeaderLevelOutOfRange {
                    block: index,
                    level: level.get(),
                });
            }
        }
        Ok(())
    }

    /// Apply one operation atomically
    pub fn apply(&mut self, op: &Op) -> Result<Patch, TransformError> {
        self.apply_all(std::slice::from_ref(op))
    }

    /// Apply a sequence of operations as one edit.
    ///
    /// The operations run against a staged copy of the blocks; the document
    /// only changes when every one of them succeeds.
    pub fn apply_all(&mut self, ops: &[Op]) -> Result<Patch, TransformError> {
        let mut staged = self.blocks.clone();
        let mut changed: Option<std::ops::Range<usize>> = None;

        for op in ops {
            let touched = apply_op(&mut staged, op).inspect_err(|e| {
                log::warn!("rejected {op:?}: {e}");
            })?;
            changed = Some(match changed {
                Some(prev) => prev.start.min(touched.start)..prev.end.max(touched.end),
                None => touched,
            });
        }

        if !ops.is_empty() {
            self.blocks = staged;
            self.version += 1;
            log::debug!("applied {} op(s), version {}", ops.len(), self.version);
        }

        Ok(Patch {
            changed: changed.unwrap_or(0..0),
            version: self.version,
        })
    }
}

impl From<Vec<Block>> for Document {
    fn from(blocks: Vec<Block>) -> Self {
        Self::new(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_ordered() {
        let a = Point::new(1, 4);
        let b = Point::new(0, 9);
        let selection = Selection::new(a, b);
        assert_eq!(selection.ordered(), (b, a));
        assert!(!selection.is_collapsed());
        assert!(Selection::collapsed(a).is_collapsed());
    }

    #[test]
    fn test_clamp_point() {
        let doc = Document::new(vec![Block::paragraph("abc"), Block::paragraph("de")]);
        assert_eq!(doc.clamp_point(Point::new(5, 10)), Some(Point::new(1, 2)));
        assert_eq!(doc.clamp_point(Point::new(0, 1)), Some(Point::new(0, 1)));
        assert_eq!(Document::default().clamp_point(Point::new(0, 0)), None);
    }

    #[test]
    fn test_failed_apply_leaves_document_untouched() {
        let mut doc = Document::new(vec![Block::paragraph("abc")]);
        let ops = [
            Op::InsertText {
                block: 0,
                at: 3,
                text: "!".to_string(),
            },
            Op::SplitBlock { block: 4, at: 0 },
        ];

        let result = doc.apply_all(&ops);

        assert!(matches!(
            result,
            Err(TransformError::BlockOutOfRange { index: 4, .. })
        ));
        assert_eq!(doc.blocks()[0].text(), "abc");
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_apply_bumps_version_and_reports_changed_blocks() {
        let mut doc = Document::new(vec![Block::paragraph("a"), Block::paragraph("bc")]);
        let patch = doc.apply(&Op::SplitBlock { block: 1, at: 1 }).unwrap();

        assert_eq!(patch.version, 1);
        assert_eq!(patch.changed, 1..3);
        assert_eq!(doc.len(), 3);
        assert!(doc.check_invariants().is_ok());
    }

    #[test]
    fn test_document_serializes_as_block_array() {
        let doc = Document::new(vec![Block::paragraph("hi")]);
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"[{"type":"paragraph","children":[{"text":"hi"}]}]"#);

        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.blocks(), doc.blocks());
    }
}
