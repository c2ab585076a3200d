//! Export of a [`Document`](crate::model::Document) back to text formats.

pub mod html;
pub mod markdown;

pub use html::{markdown_to_html, to_html};
pub use markdown::to_markdown;
