/*!
 * # Editing Core
 *
 * Live autoformatting for a block-structured document: recognize markdown
 * style prefixes while the user types and rewrite the block tree in place.
 *
 * ## Architecture Overview
 *
 * ### 1. Pure Command Emitter
 * - The host owns the [`Document`](crate::model::Document) and the selection
 * - [`Dispatcher::handle_key`] borrows both and returns an [`Outcome`]:
 *   either a [`Transform`] (ops + new selection, key suppressed) or a
 *   [`Fallthrough`] reason (key handled as ordinary input)
 * - No state is carried between key events
 *
 * ### 2. Operations
 * - Every structural edit is an [`Op`]: `DeletePrefix`, `SplitBlock`,
 *   `InsertBlock`, `SetMark` and the text-level ops hosts need for default
 *   editing
 * - The host commits ops with `Document::apply_all`, which is atomic
 *
 * ### 3. Per-Block Handlers
 * - Paragraph: `#`-only line + Space becomes a header; Enter inserts a soft
 *   line break
 * - Header: same prefix rule (level escalation); Enter exits into a new
 *   paragraph
 * - Code: only explicit formatting commands
 *
 * ## Module Structure
 *
 * - **`line`**: locate the line around the caret
 * - **`pattern`**: match a `#` prefix and derive the header level
 * - **`ops`**: `Op` and its application to block lists
 * - **`transform`**: per-context behaviours composed from ops
 * - **`keys`**: key events, hotkeys and the formatting keymap
 * - **`dispatch`**: the key event entry point
 * - **`outcome`** / **`patch`**: results handed back to the host
 *
 * ## Usage Pattern
 *
 * ```rust
 * use markdown_autoformat_engine::{
 *     Block, Dispatcher, Document, Key, KeyEvent, Point, Selection,
 * };
 *
 * let mut doc = Document::new(vec![Block::paragraph("##")]);
 * let selection = Selection::collapsed(Point::new(0, 2));
 *
 * let outcome = Dispatcher::default().handle_key(&doc, &selection, &KeyEvent::plain(Key::Space));
 * assert!(outcome.suppresses_default());
 *
 * let transform = outcome.into_transform().unwrap();
 * doc.apply_all(&transform.ops).unwrap();
 * assert_eq!(doc.len(), 1);
 * ```
 */

pub mod dispatch;
pub mod keys;
pub mod line;
pub mod ops;
pub mod outcome;
pub mod patch;
pub mod pattern;
pub mod transform;

pub use dispatch::Dispatcher;
pub use keys::{FormatCommand, Hotkey, HotkeyParseError, Key, KeyEvent, Keymap, Modifiers};
pub use line::{LineRange, line_text, locate_line};
pub use ops::{Op, TransformError, prefix_deletion};
pub use outcome::{Fallthrough, Outcome, Transform};
pub use patch::Patch;
pub use pattern::{HEADER_MARKER, HeaderMatch, match_header_prefix};
