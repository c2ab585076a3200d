use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::model::text::{Mark, Marks, TextRun, byte_index};

/// Heading rank, always within `1..=6`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct HeaderLevel(u8);

impl HeaderLevel {
    pub const MIN: HeaderLevel = HeaderLevel(1);
    pub const MAX: HeaderLevel = HeaderLevel(6);

    /// Build a level from any count, clamping into `1..=6`.
    ///
    /// Counts above six collapse to six rather than failing: seven or more
    /// `#` characters still produce the deepest heading.
    pub fn clamped(n: usize) -> Self {
        let n = n.clamp(Self::MIN.0 as usize, Self::MAX.0 as usize);
        HeaderLevel(n as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for HeaderLevel {
    fn from(value: u8) -> Self {
        Self::clamped(value as usize)
    }
}

impl From<HeaderLevel> for u8 {
    fn from(level: HeaderLevel) -> Self {
        level.0
    }
}

/// Block type tag.
///
/// Unknown `type` tags coming from a host deserialize to `Unsupported`, which
/// the dispatcher treats as a no-op branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockKind {
    Paragraph,
    Header { level: HeaderLevel },
    Code,
    #[serde(other)]
    Unsupported,
}

impl BlockKind {
    pub fn header(level: HeaderLevel) -> Self {
        BlockKind::Header { level }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Header { .. } => "header",
            BlockKind::Code => "code",
            BlockKind::Unsupported => "unsupported",
        }
    }
}

/// A top-level structural unit holding one or more text runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BlockRepr", into = "BlockRepr")]
pub struct Block {
    kind: BlockKind,
    runs: Vec<TextRun>,
}

#[derive(Serialize, Deserialize)]
struct BlockRepr {
    #[serde(flatten)]
    kind: BlockKind,
    #[serde(default)]
    children: Vec<TextRun>,
}

impl From<BlockRepr> for Block {
    fn from(repr: BlockRepr) -> Self {
        Block::new(repr.kind, repr.children)
    }
}

impl From<Block> for BlockRepr {
    fn from(block: Block) -> Self {
        BlockRepr {
            kind: block.kind,
            children: block.runs,
        }
    }
}

impl Block {
    /// Create a block; an empty run list becomes a single empty run.
    pub fn new(kind: BlockKind, runs: Vec<TextRun>) -> Self {
        let mut block = Self { kind, runs };
        block.ensure_run();
        block
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, vec![TextRun::new(text)])
    }

    pub fn header(level: HeaderLevel, text: impl Into<String>) -> Self {
        Self::new(BlockKind::header(level), vec![TextRun::new(text)])
    }

    pub fn code(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Code, vec![TextRun::new(text)])
    }

    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    pub fn set_kind(&mut self, kind: BlockKind) {
        self.kind = kind;
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Flattened text: the concatenation of every run
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn chars(&self) -> Vec<char> {
        self.runs.iter().flat_map(|run| run.text.chars()).collect()
    }

    /// Length of the flattened text in chars
    pub fn len(&self) -> usize {
        self.runs.iter().map(TextRun::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(TextRun::is_empty)
    }

    /// True when every char in `range` carries `mark`. Empty ranges are never marked.
    pub fn has_mark(&self, range: Range<usize>, mark: Mark) -> bool {
        if range.is_empty() {
            return false;
        }
        let mut start = 0;
        let mut covered = false;
        for run in &self.runs {
            let end = start + run.char_len();
            if !run.is_empty() && start < range.end && end > range.start {
                if !run.marks.get(mark) {
                    return false;
                }
                covered = true;
            }
            start = end;
        }
        covered
    }

    fn ensure_run(&mut self) {
        if self.runs.is_empty() {
            self.runs.push(TextRun::default());
        }
    }

    /// Make sure a run boundary exists at `at`, returning the index of the
    /// first run starting at or after it.
    fn boundary_at(&mut self, at: usize) -> usize {
        let mut start = 0;
        for i in 0..self.runs.len() {
            let len = self.runs[i].char_len();
            if at == start {
                return i;
            }
            if at < start + len {
                let (head, tail) = self.runs[i].split_at_char(at - start);
                self.runs[i] = head;
                self.runs.insert(i + 1, tail);
                return i + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    /// Marks of the run a new character at `at` would join
    fn marks_at(&self, at: usize) -> Marks {
        let mut start = 0;
        for run in &self.runs {
            let end = start + run.char_len();
            if at <= end {
                return run.marks;
            }
            start = end;
        }
        self.runs.last().map(|run| run.marks).unwrap_or_default()
    }

    pub(crate) fn insert_text(&mut self, at: usize, text: &str) {
        let mut start = 0;
        for run in &mut self.runs {
            let len = run.char_len();
            if at <= start + len {
                let byte = byte_index(&run.text, at - start);
                run.text.insert_str(byte, text);
                return;
            }
            start += len;
        }
        if let Some(run) = self.runs.last_mut() {
            run.text.push_str(text);
        }
    }

    pub(crate) fn delete_range(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let marks = self.marks_at(range.start);
        let first = self.boundary_at(range.start);
        let last = self.boundary_at(range.end);
        self.runs.drain(first..last);
        if self.runs.is_empty() {
            self.runs.push(TextRun::empty_with(marks));
        }
    }

    /// Detach everything from `at` onward, leaving both sides with at least one run.
    pub(crate) fn split_off(&mut self, at: usize) -> Vec<TextRun> {
        let marks = self.marks_at(at);
        let index = self.boundary_at(at);
        let mut tail = self.runs.split_off(index);
        if self.runs.is_empty() {
            self.runs.push(TextRun::empty_with(marks));
        }
        if tail.is_empty() {
            tail.push(TextRun::empty_with(marks));
        }
        tail
    }

    pub(crate) fn set_mark(&mut self, range: Range<usize>, mark: Mark, value: bool) {
        if range.is_empty() {
            return;
        }
        let first = self.boundary_at(range.start);
        let last = self.boundary_at(range.end);
        for run in &mut self.runs[first..last] {
            run.marks.set(mark, value);
        }
    }

    /// Append another block's runs, dropping empty placeholder runs on either side.
    pub(crate) fn append_runs(&mut self, runs: Vec<TextRun>) {
        let incoming: Vec<TextRun> = runs.into_iter().filter(|run| !run.is_empty()).collect();
        if incoming.is_empty() {
            return;
        }
        if self.is_empty() {
            self.runs = incoming;
        } else {
            self.runs.extend(incoming);
        }
    }
}
