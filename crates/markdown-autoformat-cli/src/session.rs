//! An editing session: the document, the selection and the host-side
//! default editing that runs when the autoformat dispatcher lets a key through.

use markdown_autoformat_engine::{
    Dispatcher, Document, IoError, Key, KeyEvent, LineRange, Op, Outcome, Point, Selection,
    TransformError, io, locate_line,
};
use std::path::{Path, PathBuf};

/// What a key did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// The dispatcher emitted a transform
    Autoformat,
    /// Default editing changed the text
    Edit,
    /// Only the selection moved
    Move,
    Ignored,
}

pub struct Session {
    doc: Document,
    selection: Selection,
    dispatcher: Dispatcher,
    path: Option<PathBuf>,
    dirty: bool,
}

impl Session {
    pub fn new(doc: Document, dispatcher: Dispatcher, path: Option<PathBuf>) -> Self {
        let doc = if doc.is_empty() { Document::empty() } else { doc };
        Self {
            doc,
            selection: Selection::default(),
            dispatcher,
            path,
            dirty: false,
        }
    }

    /// Open `path` if it exists; a missing file starts an empty document saved there later
    pub fn open(path: Option<PathBuf>, dispatcher: Dispatcher) -> Result<Self, IoError> {
        let doc = match &path {
            Some(path) if path.exists() => io::read_document(path)?,
            _ => Document::empty(),
        };
        Ok(Self::new(doc, dispatcher, path))
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the document to its path. Returns `None` when the session has no path.
    pub fn save(&mut self) -> Result<Option<&Path>, IoError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(None);
        };
        io::write_document(path, &self.doc)?;
        self.dirty = false;
        Ok(Some(path))
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> Result<Handled, TransformError> {
        match self.dispatcher.handle_key(&self.doc, &self.selection, event) {
            Outcome::Transform(transform) => {
                self.commit(&transform.ops, transform.selection)?;
                Ok(Handled::Autoformat)
            }
            Outcome::PassThrough(_) => self.default_edit(event),
        }
    }

    fn commit(&mut self, ops: &[Op], selection: Selection) -> Result<(), TransformError> {
        self.doc.apply_all(ops)?;
        if !ops.is_empty() {
            self.dirty = true;
        }
        self.set_selection(selection);
        Ok(())
    }

    fn set_selection(&mut self, selection: Selection) {
        let anchor = self.doc.clamp_point(selection.anchor);
        let focus = self.doc.clamp_point(selection.focus);
        if let (Some(anchor), Some(focus)) = (anchor, focus) {
            self.selection = Selection::new(anchor, focus);
        }
    }

    fn default_edit(&mut self, event: &KeyEvent) -> Result<Handled, TransformError> {
        if !event.is_plain() {
            return Ok(Handled::Ignored);
        }
        let extend = event.modifiers.shift;
        let target = match event.key {
            Key::Left => self.step_left(),
            Key::Right => self.step_right(),
            Key::Up => self.line_up(),
            Key::Down => self.line_down(),
            Key::Home => self.line_edge(|line| line.start),
            Key::End => self.line_edge(|line| line.end),
            Key::Backspace => return self.backspace(),
            Key::Delete => return self.delete_forward(),
            key => {
                return match key.text() {
                    Some(c) => self.insert(c),
                    None => Ok(Handled::Ignored),
                };
            }
        };
        let Some(target) = target else {
            return Ok(Handled::Ignored);
        };
        self.selection = if extend {
            Selection::new(self.selection.anchor, target)
        } else {
            Selection::collapsed(target)
        };
        Ok(Handled::Move)
    }

    /// Delete a selection inside one block and return the caret left behind.
    /// Selections spanning blocks collapse to the focus instead.
    fn take_selection(&mut self) -> Result<Point, TransformError> {
        if self.selection.is_collapsed() {
            return Ok(self.selection.focus);
        }
        let (start, end) = self.selection.ordered();
        if start.block != end.block {
            return Ok(self.selection.focus);
        }
        self.commit(
            &[Op::DeleteText {
                block: start.block,
                range: start.offset..end.offset,
            }],
            Selection::collapsed(start),
        )?;
        Ok(start)
    }

    fn insert(&mut self, c: char) -> Result<Handled, TransformError> {
        let caret = self.take_selection()?;
        self.commit(
            &[Op::InsertText {
                block: caret.block,
                at: caret.offset,
                text: c.to_string(),
            }],
            Selection::collapsed(Point::new(caret.block, caret.offset + 1)),
        )?;
        Ok(Handled::Edit)
    }

    fn backspace(&mut self) -> Result<Handled, TransformError> {
        if !self.selection.is_collapsed() {
            self.take_selection()?;
            return Ok(Handled::Edit);
        }
        let caret = self.selection.focus;
        if caret.offset > 0 {
            self.commit(
                &[Op::DeleteText {
                    block: caret.block,
                    range: caret.offset - 1..caret.offset,
                }],
                Selection::collapsed(Point::new(caret.block, caret.offset - 1)),
            )?;
            return Ok(Handled::Edit);
        }
        let Some(previous) = caret.block.checked_sub(1) else {
            return Ok(Handled::Ignored);
        };
        let joined_at = self.block_len(previous);
        self.commit(
            &[Op::MergeWithPrevious { block: caret.block }],
            Selection::collapsed(Point::new(previous, joined_at)),
        )?;
        Ok(Handled::Edit)
    }

    fn delete_forward(&mut self) -> Result<Handled, TransformError> {
        if !self.selection.is_collapsed() {
            self.take_selection()?;
            return Ok(Handled::Edit);
        }
        let caret = self.selection.focus;
        let op = if caret.offset < self.block_len(caret.block) {
            Op::DeleteText {
                block: caret.block,
                range: caret.offset..caret.offset + 1,
            }
        } else if caret.block + 1 < self.doc.len() {
            Op::MergeWithPrevious {
                block: caret.block + 1,
            }
        } else {
            return Ok(Handled::Ignored);
        };
        self.commit(&[op], Selection::collapsed(caret))?;
        Ok(Handled::Edit)
    }

    fn block_len(&self, index: usize) -> usize {
        self.doc.block(index).map_or(0, |block| block.len())
    }

    fn focus_line(&self) -> Option<(Vec<char>, LineRange)> {
        let focus = self.selection.focus;
        let chars = self.doc.block(focus.block)?.chars();
        let line = locate_line(&chars, focus.offset);
        Some((chars, line))
    }

    fn step_left(&self) -> Option<Point> {
        let focus = self.selection.focus;
        if focus.offset > 0 {
            return Some(Point::new(focus.block, focus.offset - 1));
        }
        let previous = focus.block.checked_sub(1)?;
        Some(Point::new(previous, self.block_len(previous)))
    }

    fn step_right(&self) -> Option<Point> {
        let focus = self.selection.focus;
        if focus.offset < self.block_len(focus.block) {
            return Some(Point::new(focus.block, focus.offset + 1));
        }
        (focus.block + 1 < self.doc.len()).then(|| Point::new(focus.block + 1, 0))
    }

    fn line_edge(&self, edge: impl Fn(LineRange) -> usize) -> Option<Point> {
        let (_, line) = self.focus_line()?;
        Some(Point::new(self.selection.focus.block, edge(line)))
    }

    fn line_up(&self) -> Option<Point> {
        let focus = self.selection.focus;
        let (chars, line) = self.focus_line()?;
        let column = focus.offset - line.start;
        if line.start > 0 {
            let above = locate_line(&chars, line.start - 1);
            return Some(Point::new(focus.block, above.start + column.min(above.len())));
        }
        let previous = focus.block.checked_sub(1)?;
        let previous_chars = self.doc.block(previous)?.chars();
        let above = locate_line(&previous_chars, previous_chars.len());
        Some(Point::new(previous, above.start + column.min(above.len())))
    }

    fn line_down(&self) -> Option<Point> {
        let focus = self.selection.focus;
        let (chars, line) = self.focus_line()?;
        let column = focus.offset - line.start;
        if line.end < chars.len() {
            let below = locate_line(&chars, line.end + 1);
            return Some(Point::new(focus.block, below.start + column.min(below.len())));
        }
        let next = focus.block + 1;
        let next_chars = self.doc.block(next)?.chars();
        let below = locate_line(&next_chars, 0);
        Some(Point::new(next, column.min(below.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown_autoformat_engine::{Block, BlockKind, HeaderLevel, Mark, Modifiers};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn session(blocks: Vec<Block>) -> Session {
        Session::new(Document::new(blocks), Dispatcher::default(), None)
    }

    fn type_text(session: &mut Session, text: &str) {
        for c in text.chars() {
            session.handle_key(&KeyEvent::plain(Key::from_char(c))).unwrap();
        }
    }

    fn press(session: &mut Session, key: Key) -> Handled {
        session.handle_key(&KeyEvent::plain(key)).unwrap()
    }

    fn shift(key: Key) -> KeyEvent {
        KeyEvent::new(
            key,
            Modifiers {
                shift: true,
                ..Modifiers::NONE
            },
        )
    }

    fn texts(session: &Session) -> Vec<String> {
        session.document().blocks().iter().map(|b| b.text()).collect()
    }

    #[test]
    fn test_typing_a_heading() {
        let mut s = session(vec![Block::paragraph("")]);
        type_text(&mut s, "## Title");

        assert_eq!(
            s.document().blocks(),
            &[Block::header(HeaderLevel::clamped(2), "Title")]
        );
        assert!(s.is_dirty());
    }

    #[test]
    fn test_typing_hash_mid_paragraph_then_heading() {
        let mut s = session(vec![Block::paragraph("")]);
        type_text(&mut s, "Intro\n### Part\nbody");

        assert_eq!(
            s.document().blocks(),
            &[
                Block::paragraph("Intro"),
                Block::header(HeaderLevel::clamped(3), "Part"),
                Block::paragraph("body"),
            ]
        );
        assert_eq!(s.selection(), Selection::collapsed(Point::new(2, 4)));
    }

    #[test]
    fn test_code_block_takes_enter_and_space_literally() {
        let mut s = session(vec![Block::code("#")]);
        s.handle_key(&KeyEvent::plain(Key::End)).unwrap();
        type_text(&mut s, " x\ny");

        assert_eq!(s.document().blocks(), &[Block::code("# x\ny")]);
    }

    #[test]
    fn test_backspace_at_block_start_merges() {
        let mut s = session(vec![Block::paragraph("ab"), Block::paragraph("cd")]);
        press(&mut s, Key::Down);
        press(&mut s, Key::Home);
        assert_eq!(press(&mut s, Key::Backspace), Handled::Edit);

        assert_eq!(texts(&s), vec!["abcd"]);
        assert_eq!(s.selection(), Selection::collapsed(Point::new(0, 2)));
    }

    #[test]
    fn test_delete_at_block_end_merges_next() {
        let mut s = session(vec![Block::paragraph("ab"), Block::paragraph("cd")]);
        press(&mut s, Key::End);
        press(&mut s, Key::Delete);

        assert_eq!(texts(&s), vec!["abcd"]);
        assert_eq!(press(&mut s, Key::Right), Handled::Move);
    }

    #[test]
    fn test_backspace_at_document_start_is_ignored() {
        let mut s = session(vec![Block::paragraph("ab")]);
        assert_eq!(press(&mut s, Key::Backspace), Handled::Ignored);
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_shift_arrows_select_and_bold() {
        let mut s = session(vec![Block::paragraph("abcd")]);
        press(&mut s, Key::Right);
        s.handle_key(&shift(Key::Right)).unwrap();
        s.handle_key(&shift(Key::Right)).unwrap();

        let ctrl_b = KeyEvent::new(
            Key::Char('b'),
            Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        );
        assert_eq!(s.handle_key(&ctrl_b).unwrap(), Handled::Autoformat);
        assert!(s.document().blocks()[0].has_mark(1..3, Mark::Bold));
        assert!(!s.document().blocks()[0].has_mark(0..1, Mark::Bold));
    }

    #[test]
    fn test_typing_replaces_selection() {
        let mut s = session(vec![Block::paragraph("abcd")]);
        s.handle_key(&shift(Key::End)).unwrap();
        type_text(&mut s, "z");

        assert_eq!(texts(&s), vec!["z"]);
    }

    #[test]
    fn test_vertical_movement_keeps_column() {
        let mut s = session(vec![Block::paragraph("abc\nde"), Block::paragraph("fghij")]);
        press(&mut s, Key::End);
        assert_eq!(s.selection().focus, Point::new(0, 3));

        press(&mut s, Key::Down);
        assert_eq!(s.selection().focus, Point::new(0, 6));
        press(&mut s, Key::Down);
        assert_eq!(s.selection().focus, Point::new(1, 2));
        press(&mut s, Key::Up);
        assert_eq!(s.selection().focus, Point::new(0, 6));
        press(&mut s, Key::Up);
        assert_eq!(s.selection().focus, Point::new(0, 2));
    }

    #[test]
    fn test_enter_in_header_then_type() {
        let mut s = session(vec![Block::header(HeaderLevel::MIN, "Top")]);
        press(&mut s, Key::End);
        type_text(&mut s, "\nnext");

        assert_eq!(
            s.document().blocks()[1].kind(),
            &BlockKind::Paragraph
        );
        assert_eq!(texts(&s), vec!["Top", "next"]);
    }

    #[test]
    fn test_open_missing_file_and_save() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("new.md");

        let mut s = Session::open(Some(path.clone()), Dispatcher::default()).unwrap();
        type_text(&mut s, "# Saved");
        assert_eq!(s.save().unwrap(), Some(path.as_path()));
        assert!(!s.is_dirty());

        let reopened = Session::open(Some(path), Dispatcher::default()).unwrap();
        assert_eq!(reopened.document().blocks(), s.document().blocks());
    }

    #[test]
    fn test_save_without_path() {
        let mut s = session(vec![Block::paragraph("x")]);
        assert_eq!(s.save().unwrap(), None);
    }
}
