use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::editing::line::LineRange;
use crate::editing::pattern::HEADER_MARKER;
use crate::model::{Block, BlockKind, Mark, TextRun};

/// Structural edits the host applies to its document.
///
/// Block indices and offsets refer to the document as it stands when the
/// operation runs, so a list of ops is applied in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    InsertText {
        block: usize,
        at: usize,
        text: String,
    },
    DeleteText {
        block: usize,
        range: Range<usize>,
    },
    /// Remove the `#` run at the start of `line`, plus the newline before
    /// the line when there is one.
    DeletePrefix {
        block: usize,
        line: LineRange,
        matched: usize,
    },
    /// Move everything from `at` onward into a new block of the same kind
    /// placed right after `block`.
    SplitBlock {
        block: usize,
        at: usize,
    },
    /// Insert a block at `index`; with `replace` it takes the place of the
    /// block currently there.
    InsertBlock {
        index: usize,
        kind: BlockKind,
        runs: Vec<TextRun>,
        replace: bool,
    },
    SetBlockKind {
        block: usize,
        kind: BlockKind,
    },
    SetMark {
        block: usize,
        range: Range<usize>,
        mark: Mark,
        value: bool,
    },
    /// Append `block`'s runs to the block before it and remove `block`
    MergeWithPrevious {
        block: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("block {index} does not exist (document has {len} blocks)")]
    BlockOutOfRange { index: usize, len: usize },
    #[error("offset {offset} is outside block {block} (length {len})")]
    OffsetOutOfRange {
        block: usize,
        offset: usize,
        len: usize,
    },
    #[error("range {start}..{end} is outside block {block} (length {len})")]
    RangeOutOfRange {
        block: usize,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("chars {start}..{end} of block {block} are not a run of '#'")]
    NotAHeaderPrefix {
        block: usize,
        start: usize,
        end: usize,
    },
    #[error("block {block} has no previous block to merge into")]
    NothingToMergeInto { block: usize },
}

/// Char range removed by a `DeletePrefix` of `matched` chars at `line`.
///
/// The newline ending the previous line goes too, so the text after the
/// deletion does not gain a blank line.
pub fn prefix_deletion(text: &[char], line: LineRange, matched: usize) -> Range<usize> {
    let start = if line.start > 0 && text.get(line.start - 1) == Some(&'\n') {
        line.start - 1
    } else {
        line.start
    };
    start..line.start + matched
}

fn block_mut(blocks: &mut [Block], index: usize) -> Result<&mut Block, TransformError> {
    let len = blocks.len();
    blocks
        .get_mut(index)
        .ok_or(TransformError::BlockOutOfRange { index, len })
}

fn check_offset(block: &Block, index: usize, offset: usize) -> Result<(), TransformError> {
    let len = block.len();
    if offset > len {
        return Err(TransformError::OffsetOutOfRange {
            block: index,
            offset,
            len,
        });
    }
    Ok(())
}

fn check_range(block: &Block, index: usize, range: &Range<usize>) -> Result<(), TransformError> {
    let len = block.len();
    if range.start > range.end || range.end > len {
        return Err(TransformError::RangeOutOfRange {
            block: index,
            start: range.start,
            end: range.end,
            len,
        });
    }
    Ok(())
}

/// Apply one op to a block list, returning the block indices it touched.
pub(crate) fn apply_op(blocks: &mut Vec<Block>, op: &Op) -> Result<Range<usize>, TransformError> {
    match op {
        Op::InsertText { block, at, text } => {
            let target = block_mut(blocks, *block)?;
            check_offset(target, *block, *at)?;
            target.insert_text(*at, text);
            Ok(*block..*block + 1)
        }
        Op::DeleteText { block, range } => {
            let target = block_mut(blocks, *block)?;
            check_range(target, *block, range)?;
            target.delete_range(range.clone());
            Ok(*block..*block + 1)
        }
        Op::DeletePrefix {
            block,
            line,
            matched,
        } => {
            let target = block_mut(blocks, *block)?;
            let chars = target.chars();
            let prefix = line.start..line.start + matched;
            check_range(target, *block, &prefix)?;
            if *matched == 0 || chars[prefix.clone()].iter().any(|&c| c != HEADER_MARKER) {
                return Err(TransformError::NotAHeaderPrefix {
                    block: *block,
                    start: prefix.start,
                    end: prefix.end,
                });
            }
            target.delete_range(prefix_deletion(&chars, *line, *matched));
            Ok(*block..*block + 1)
        }
        Op::SplitBlock { block, at } => {
            let target = block_mut(blocks, *block)?;
            check_offset(target, *block, *at)?;
            let tail = target.split_off(*at);
            let kind = target.kind().clone();
            blocks.insert(block + 1, Block::new(kind, tail));
            Ok(*block..*block + 2)
        }
        Op::InsertBlock {
            index,
            kind,
            runs,
            replace,
        } => {
            let new_block = Block::new(kind.clone(), runs.clone());
            if *replace {
                *block_mut(blocks, *index)? = new_block;
            } else if *index <= blocks.len() {
                blocks.insert(*index, new_block);
            } else {
                return Err(TransformError::BlockOutOfRange {
                    index: *index,
                    len: blocks.len(),
                });
            }
            Ok(*index..*index + 1)
        }
        Op::SetBlockKind { block, kind } => {
            block_mut(blocks, *block)?.set_kind(kind.clone());
            Ok(*block..*block + 1)
        }
        Op::SetMark {
            block,
            range,
            mark,
            value,
        } => {
            let target = block_mut(blocks, *block)?;
            check_range(target, *block, range)?;
            target.set_mark(range.clone(), *mark, *value);
            Ok(*block..*block + 1)
        }
        Op::MergeWithPrevious { block } => {
            if *block == 0 {
                return Err(TransformError::NothingToMergeInto { block: 0 });
            }
            block_mut(blocks, *block)?;
            let merged = blocks.remove(*block);
            let previous = &mut blocks[block - 1];
            previous.append_runs(merged.runs().to_vec());
            Ok(block - 1..*block)
        }
    }
}
