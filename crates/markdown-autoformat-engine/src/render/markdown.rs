use crate::model::{Block, BlockKind, Document, Mark, TextRun};

/// Serialize a document to markdown, blocks separated by a blank line.
///
/// Marks wrap the run text (`**bold**`, `*italic*`, `~~struck~~`) with any
/// surrounding whitespace kept outside the delimiters so the output parses
/// back to the same runs.
pub fn to_markdown(doc: &Document) -> String {
    let mut out = doc
        .blocks()
        .iter()
        .map(block_to_markdown)
        .collect::<Vec<_>>()
        .join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn block_to_markdown(block: &Block) -> String {
    match block.kind() {
        BlockKind::Header { level } => {
            let text = inline_markdown(block.runs()).replace('\n', " ");
            let hashes = "#".repeat(usize::from(level.get()));
            if text.is_empty() {
                hashes
            } else {
                format!("{hashes} {text}")
            }
        }
        BlockKind::Code => {
            let text = block.text();
            let fence = "`".repeat(longest_backtick_run(&text).max(2) + 1);
            format!("{fence}\n{text}\n{fence}")
        }
        BlockKind::Paragraph | BlockKind::Unsupported => {
            let text = inline_markdown(block.runs());
            // A block split after a `#` line keeps that line's newline at its start
            let lines: Vec<String> = text
                .strip_prefix('\n')
                .unwrap_or(&text)
                .split('\n')
                .map(escape_line_start)
                .collect();
            lines.join("\n")
        }
    }
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// A paragraph line starting with `#` would read back as a heading
fn escape_line_start(line: &str) -> String {
    if line.starts_with('#') {
        format!("\\{line}")
    } else {
        line.to_string()
    }
}

const DELIMITERS: [(Mark, &str); 3] = [
    (Mark::Strikethrough, "~~"),
    (Mark::Bold, "**"),
    (Mark::Italic, "*"),
];

fn inline_markdown(runs: &[TextRun]) -> String {
    let mut out = String::new();
    for run in runs {
        let core = run.text.trim();
        if run.marks.is_plain() || core.is_empty() {
            out.push_str(&run.text);
            continue;
        }
        let leading = &run.text[..run.text.len() - run.text.trim_start().len()];
        let trailing = &run.text[run.text.trim_end().len()..];

        let active: Vec<&str> = DELIMITERS
            .iter()
            .filter(|(mark, _)| run.marks.get(*mark))
            .map(|(_, delimiter)| *delimiter)
            .collect();
        out.push_str(leading);
        active.iter().for_each(|d| out.push_str(d));
        out.push_str(core);
        active.iter().rev().for_each(|d| out.push_str(d));
        out.push_str(trailing);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeaderLevel;
    use crate::parsing::parse_markdown;
    use insta::assert_snapshot;

    #[test]
    fn test_blocks_to_markdown() {
        let doc = Document::new(vec![
            Block::header(HeaderLevel::clamped(2), "Title"),
            Block::paragraph("one\ntwo"),
            Block::code("let x = 1;"),
            Block::header(HeaderLevel::MIN, ""),
        ]);
        assert_snapshot!(to_markdown(&doc), @r"
        ## Title

        one
        two

        ```
        let x = 1;
        ```

        #
        ");
    }

    #[test]
    fn test_marks_keep_whitespace_outside() {
        let doc = Document::new(vec![Block::new(
            BlockKind::Paragraph,
            vec![
                TextRun::new("a"),
                TextRun::new(" bold ").with_mark(Mark::Bold),
                TextRun::new("both")
                    .with_mark(Mark::Italic)
                    .with_mark(Mark::Strikethrough),
            ],
        )]);
        assert_eq!(to_markdown(&doc), "a **bold** ~~*both*~~\n");
    }

    #[test]
    fn test_paragraph_hash_is_escaped() {
        let doc = Document::new(vec![Block::paragraph("# not a heading")]);
        let markdown = to_markdown(&doc);
        assert_eq!(markdown, "\\# not a heading\n");
        assert_eq!(parse_markdown(&markdown).blocks(), doc.blocks());
    }

    #[test]
    fn test_split_remainder_drops_leading_newline() {
        let doc = Document::new(vec![
            Block::paragraph("one"),
            Block::header(HeaderLevel::clamped(2), ""),
            Block::paragraph("\ntwo"),
        ]);
        let markdown = to_markdown(&doc);
        assert_eq!(markdown, "one\n\n##\n\ntwo\n");
        assert_eq!(parse_markdown(&markdown).blocks().last(), Some(&Block::paragraph("two")));
    }

    #[test]
    fn test_code_fence_outgrows_content() {
        let doc = Document::new(vec![Block::code("```\nnested\n```")]);
        let markdown = to_markdown(&doc);
        assert!(markdown.starts_with("````\n"));
        assert_eq!(parse_markdown(&markdown).blocks(), doc.blocks());
    }

    #[test]
    fn test_reimport_preserves_structure() {
        let source = "# Notes\n\nsome **bold** and *italic* text\n\n```\ncode\n```\n";
        let doc = parse_markdown(source);
        assert_eq!(to_markdown(&doc), source);
    }
}
