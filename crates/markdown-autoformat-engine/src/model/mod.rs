pub mod block;
pub mod document;
pub mod text;

pub use block::{Block, BlockKind, HeaderLevel};
pub use document::{Document, ModelError, Point, Selection};
pub use text::{Mark, Marks, TextRun};
