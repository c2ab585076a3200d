//! Per-context behaviours built from the block operations.
//!
//! Each function reads the document and returns the [`Transform`] a handler
//! emits; nothing here mutates the document.

use std::ops::Range;

use crate::editing::line::locate_line;
use crate::editing::ops::{Op, prefix_deletion};
use crate::editing::outcome::{Fallthrough, Transform};
use crate::editing::pattern::match_header_prefix;
use crate::model::{Block, BlockKind, Document, Mark, Point, Selection, TextRun};

fn enclosing_block(doc: &Document, point: Point) -> Result<&Block, Fallthrough> {
    doc.block(point.block).ok_or(Fallthrough::NoEnclosingBlock {
        block: point.block,
        blocks: doc.len(),
    })
}

/// Turn a `#`-only line into a header when Space is pressed at its end.
///
/// The `#` run (and the newline before it) is deleted, the block is split at
/// the caret when text precedes it, and an empty header is inserted at the
/// split. An empty half left by the deletion is replaced by the header.
pub fn header_autoformat(doc: &Document, point: Point) -> Result<Transform, Fallthrough> {
    let block = enclosing_block(doc, point)?;
    let chars = block.chars();
    let line = locate_line(&chars, point.offset);
    // The space lands at the caret, so only a caret right after the run can complete it
    if point.offset != line.end {
        return Err(Fallthrough::NoPatternMatch);
    }
    let before_caret = &chars[line.start..point.offset];
    let matched = match_header_prefix(before_caret).ok_or(Fallthrough::NoPatternMatch)?;

    let deletion = prefix_deletion(&chars, line, matched.hashes);
    let split_at = deletion.start;
    let remaining = chars.len() - deletion.len();

    let mut ops = vec![Op::DeletePrefix {
        block: point.block,
        line,
        matched: matched.hashes,
    }];
    let index = if split_at > 0 {
        ops.push(Op::SplitBlock {
            block: point.block,
            at: split_at,
        });
        point.block + 1
    } else {
        point.block
    };
    ops.push(Op::InsertBlock {
        index,
        kind: BlockKind::header(matched.level),
        runs: vec![TextRun::default()],
        replace: split_at == remaining,
    });

    log::debug!(
        "header prefix of {} '#' in block {} -> level {}",
        matched.hashes,
        point.block,
        matched.level.get()
    );
    Ok(Transform::new(
        ops,
        Selection::collapsed(Point::new(index, 0)),
    ))
}

/// Insert a literal newline at the caret without splitting the block
pub fn soft_break(point: Point) -> Transform {
    Transform::new(
        vec![Op::InsertText {
            block: point.block,
            at: point.offset,
            text: "\n".to_string(),
        }],
        Selection::collapsed(Point::new(point.block, point.offset + 1)),
    )
}

/// Leave a heading: an empty paragraph goes right after it, wherever the caret is
pub fn exit_heading(point: Point) -> Transform {
    let index = point.block + 1;
    Transform::new(
        vec![Op::InsertBlock {
            index,
            kind: BlockKind::Paragraph,
            runs: vec![TextRun::default()],
            replace: false,
        }],
        Selection::collapsed(Point::new(index, 0)),
    )
}

/// Per-block char ranges covered by a selection, skipping empty ones
fn selected_spans(doc: &Document, selection: &Selection) -> Result<Vec<(usize, Range<usize>)>, Fallthrough> {
    let (start, end) = selection.ordered();
    enclosing_block(doc, end)?;

    let spans = (start.block..=end.block)
        .filter_map(|index| {
            let block = doc.block(index)?;
            let len = block.len();
            let from = if index == start.block { start.offset.min(len) } else { 0 };
            let to = if index == end.block { end.offset.min(len) } else { len };
            (from < to).then_some((index, from..to))
        })
        .collect();
    Ok(spans)
}

/// Set or clear `mark` over the selection.
///
/// The mark is cleared when every selected char already carries it,
/// otherwise it is set on the whole selection.
pub fn toggle_mark(doc: &Document, selection: &Selection, mark: Mark) -> Result<Transform, Fallthrough> {
    if selection.is_collapsed() {
        return Err(Fallthrough::EmptySelection);
    }
    let spans = selected_spans(doc, selection)?;
    if spans.is_empty() {
        return Err(Fallthrough::EmptySelection);
    }

    let active = spans
        .iter()
        .all(|(index, range)| doc.blocks()[*index].has_mark(range.clone(), mark));
    let ops = spans
        .into_iter()
        .map(|(block, range)| Op::SetMark {
            block,
            range,
            mark,
            value: !active,
        })
        .collect();

    Ok(Transform::new(ops, *selection))
}

/// Flip the focus block between code and paragraph
pub fn toggle_code_block(doc: &Document, selection: &Selection) -> Result<Transform, Fallthrough> {
    let block = enclosing_block(doc, selection.focus)?;
    let kind = match block.kind() {
        BlockKind::Code => BlockKind::Paragraph,
        BlockKind::Paragraph | BlockKind::Header { .. } => BlockKind::Code,
        BlockKind::Unsupported => {
            return Err(Fallthrough::UnsupportedBlockType {
                kind: BlockKind::Unsupported.name(),
            });
        }
    };
    Ok(Transform::new(
        vec![Op::SetBlockKind {
            block: selection.focus.block,
            kind,
        }],
        *selection,
    ))
}
