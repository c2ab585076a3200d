//! Markdown import: builds a [`Document`] from CommonMark text.
//!
//! Only the structure the model knows survives. List items and block quotes
//! flatten into paragraphs; links and images keep their text.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::model::{Block, BlockKind, Document, HeaderLevel, Marks, TextRun};

pub fn parser_options() -> Options {
    Options::ENABLE_STRIKETHROUGH
}

/// Parse markdown into a document. Empty input yields one empty paragraph.
pub fn parse_markdown(source: &str) -> Document {
    let mut builder = DocumentBuilder::default();
    for event in Parser::new_ext(source, parser_options()) {
        builder.push(event);
    }
    builder.finish()
}

#[derive(Default)]
struct DocumentBuilder {
    blocks: Vec<Block>,
    current: Option<(BlockKind, Vec<TextRun>)>,
    strong: usize,
    emphasis: usize,
    strikethrough: usize,
}

impl DocumentBuilder {
    fn marks(&self) -> Marks {
        Marks {
            bold: self.strong > 0,
            italic: self.emphasis > 0,
            strikethrough: self.strikethrough > 0,
        }
    }

    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.open(BlockKind::header(HeaderLevel::clamped(level as usize)));
            }
            Event::Start(Tag::Paragraph | Tag::Item) => self.open(BlockKind::Paragraph),
            Event::Start(Tag::CodeBlock(_)) => self.open(BlockKind::Code),
            Event::Start(Tag::Strong) => self.strong += 1,
            Event::Start(Tag::Emphasis) => self.emphasis += 1,
            Event::Start(Tag::Strikethrough) => self.strikethrough += 1,
            Event::End(TagEnd::Strong) => self.strong = self.strong.saturating_sub(1),
            Event::End(TagEnd::Emphasis) => self.emphasis = self.emphasis.saturating_sub(1),
            Event::End(TagEnd::Strikethrough) => {
                self.strikethrough = self.strikethrough.saturating_sub(1);
            }
            Event::End(
                TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::Item | TagEnd::CodeBlock,
            ) => self.close(),
            Event::Text(text) | Event::Code(text) | Event::InlineHtml(text) => self.push_text(&text),
            Event::SoftBreak | Event::HardBreak => self.push_text("\n"),
            _ => {}
        }
    }

    /// Start a block, flushing a non-empty one still open (tight list items
    /// nest their content without paragraph events).
    fn open(&mut self, kind: BlockKind) {
        if let Some((_, runs)) = &self.current
            && runs.iter().any(|run| !run.is_empty())
        {
            self.close();
        }
        self.current = Some((kind, Vec::new()));
    }

    fn close(&mut self) {
        let Some((kind, mut runs)) = self.current.take() else {
            return;
        };
        if kind == BlockKind::Code
            && let Some(last) = runs.last_mut()
            && last.text.ends_with('\n')
        {
            last.text.pop();
        }
        self.blocks.push(Block::new(kind, runs));
    }

    fn push_text(&mut self, text: &str) {
        let marks = self.marks();
        let (_, runs) = self
            .current
            .get_or_insert_with(|| (BlockKind::Paragraph, Vec::new()));
        match runs.last_mut() {
            Some(last) if last.marks == marks => last.text.push_str(text),
            _ => runs.push(TextRun::styled(text, marks)),
        }
    }

    fn finish(mut self) -> Document {
        self.close();
        if self.blocks.is_empty() {
            return Document::empty();
        }
        Document::new(self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mark;
    use pretty_assertions::assert_eq;

    fn summary(doc: &Document) -> Vec<(String, String)> {
        doc.blocks()
            .iter()
            .map(|block| {
                let kind = match block.kind() {
                    BlockKind::Header { level } => format!("h{}", level.get()),
                    other => other.name().to_string(),
                };
                (kind, block.text())
            })
            .collect()
    }

    #[test]
    fn test_parse_blocks() {
        let doc = parse_markdown("# Title\n\nFirst line\nsecond line\n\n```rust\nfn main() {}\n```\n");
        assert_eq!(
            summary(&doc),
            vec![
                ("h1".to_string(), "Title".to_string()),
                ("paragraph".to_string(), "First line\nsecond line".to_string()),
                ("code".to_string(), "fn main() {}".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_marks() {
        let doc = parse_markdown("plain **bold *both*** ~~gone~~");
        let runs = doc.blocks()[0].runs();

        assert_eq!(runs[0], TextRun::new("plain "));
        assert_eq!(runs[1], TextRun::new("bold ").with_mark(Mark::Bold));
        assert_eq!(
            runs[2],
            TextRun::new("both").with_mark(Mark::Bold).with_mark(Mark::Italic)
        );
        assert_eq!(runs[3], TextRun::new(" "));
        assert_eq!(runs[4], TextRun::new("gone").with_mark(Mark::Strikethrough));
    }

    #[test]
    fn test_parse_lists_flatten_to_paragraphs() {
        let doc = parse_markdown("- one\n- two\n  - nested\n\n> quoted");
        assert_eq!(
            summary(&doc),
            vec![
                ("paragraph".to_string(), "one".to_string()),
                ("paragraph".to_string(), "two".to_string()),
                ("paragraph".to_string(), "nested".to_string()),
                ("paragraph".to_string(), "quoted".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_deep_heading_and_empty_input() {
        let doc = parse_markdown("###### Six");
        assert_eq!(
            doc.blocks()[0].kind(),
            &BlockKind::header(HeaderLevel::MAX)
        );

        let empty = parse_markdown("");
        assert_eq!(empty.len(), 1);
        assert!(empty.blocks()[0].is_empty());
    }
}
