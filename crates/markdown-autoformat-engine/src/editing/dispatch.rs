use crate::editing::keys::{FormatCommand, Key, KeyEvent, Keymap};
use crate::editing::outcome::{Fallthrough, Outcome, Transform};
use crate::editing::transform;
use crate::model::{BlockKind, Document, Selection};

/// Routes key events to the handler for the block under the focus.
///
/// Holds only the keymap: every call reads the document fresh and keeps no
/// state between events.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    keymap: Keymap,
}

impl Dispatcher {
    pub fn new(keymap: Keymap) -> Self {
        Self { keymap }
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Decide what one key event does.
    ///
    /// Returns the operations to apply (the key's default effect must then be
    /// suppressed) or the reason the key falls through to default handling.
    pub fn handle_key(&self, doc: &Document, selection: &Selection, event: &KeyEvent) -> Outcome {
        match self.route(doc, selection, event) {
            Ok(transform) => {
                log::debug!("{:?} -> {} op(s)", event.key, transform.ops.len());
                Outcome::Transform(transform)
            }
            Err(reason) => {
                log::debug!("{:?} passes through: {reason}", event.key);
                Outcome::PassThrough(reason)
            }
        }
    }

    fn route(&self, doc: &Document, selection: &Selection, event: &KeyEvent) -> Result<Transform, Fallthrough> {
        let focus = selection.focus;
        let block = doc.block(focus.block).ok_or(Fallthrough::NoEnclosingBlock {
            block: focus.block,
            blocks: doc.len(),
        })?;
        let len = block.len();
        if focus.offset > len {
            return Err(Fallthrough::DetachedFocus {
                block: focus.block,
                offset: focus.offset,
                len,
            });
        }

        let command = self.keymap.lookup(event);
        match block.kind() {
            BlockKind::Paragraph => self.on_key_paragraph(doc, selection, event, command),
            BlockKind::Header { .. } => self.on_key_header(doc, selection, event, command),
            BlockKind::Code => self.on_key_code(doc, selection, command),
            BlockKind::Unsupported => Err(Fallthrough::UnsupportedBlockType {
                kind: BlockKind::Unsupported.name(),
            }),
        }
    }

    fn on_key_paragraph(
        &self,
        doc: &Document,
        selection: &Selection,
        event: &KeyEvent,
        command: Option<FormatCommand>,
    ) -> Result<Transform, Fallthrough> {
        if let Some(command) = command {
            return self.run_command(doc, selection, command);
        }
        match typed_key(selection, event)? {
            Key::Space => transform::header_autoformat(doc, selection.focus),
            Key::Enter => Ok(transform::soft_break(selection.focus)),
            _ => Err(Fallthrough::NotATrigger),
        }
    }

    fn on_key_header(
        &self,
        doc: &Document,
        selection: &Selection,
        event: &KeyEvent,
        command: Option<FormatCommand>,
    ) -> Result<Transform, Fallthrough> {
        if let Some(command) = command {
            return self.run_command(doc, selection, command);
        }
        // Enter leaves the heading even over a range; the paragraph goes after its end
        if event.key == Key::Enter && event.is_plain() {
            let (_, end) = selection.ordered();
            return match doc.block(end.block) {
                Some(_) => Ok(transform::exit_heading(end)),
                None => Err(Fallthrough::NoEnclosingBlock {
                    block: end.block,
                    blocks: doc.len(),
                }),
            };
        }
        match typed_key(selection, event)? {
            Key::Space => transform::header_autoformat(doc, selection.focus),
            _ => Err(Fallthrough::NotATrigger),
        }
    }

    /// Code blocks only react to explicit formatting commands
    fn on_key_code(
        &self,
        doc: &Document,
        selection: &Selection,
        command: Option<FormatCommand>,
    ) -> Result<Transform, Fallthrough> {
        match command {
            Some(command) => self.run_command(doc, selection, command),
            None => Err(Fallthrough::UnsupportedBlockType {
                kind: BlockKind::Code.name(),
            }),
        }
    }

    fn run_command(
        &self,
        doc: &Document,
        selection: &Selection,
        command: FormatCommand,
    ) -> Result<Transform, Fallthrough> {
        match command {
            FormatCommand::ToggleMark(mark) => transform::toggle_mark(doc, selection, mark),
            FormatCommand::ToggleCodeBlock => transform::toggle_code_block(doc, selection),
        }
    }
}

/// The key of an unmodified keystroke at a caret; anything else never autoformats.
fn typed_key(selection: &Selection, event: &KeyEvent) -> Result<Key, Fallthrough> {
    if !event.is_plain() || !selection.is_collapsed() {
        return Err(Fallthrough::NotATrigger);
    }
    Ok(event.key)
}
