//! HTML rendering for the preview pane and the sample checks.

use pulldown_cmark::{Options, Parser};

use crate::model::{Block, BlockKind, Document, TextRun};

/// Render markdown source the way a CommonMark renderer would.
pub fn markdown_to_html(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH);
    let mut html = String::with_capacity(source.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// Render a document model directly, one element per block.
pub fn to_html(doc: &Document) -> String {
    doc.blocks().iter().map(block_to_html).collect()
}

fn block_to_html(block: &Block) -> String {
    match block.kind() {
        BlockKind::Paragraph => format!("<p>{}</p>\n", inline_html(block.runs())),
        BlockKind::Header { level } => {
            let n = level.get();
            format!("<h{n}>{}</h{n}>\n", inline_html(block.runs()))
        }
        BlockKind::Code => format!(
            "<pre><code>{}</code></pre>\n",
            html_escape::encode_text(&block.text())
        ),
        BlockKind::Unsupported => format!("<div>{}</div>\n", inline_html(block.runs())),
    }
}

fn inline_html(runs: &[TextRun]) -> String {
    let mut out = String::new();
    for run in runs.iter().filter(|run| !run.is_empty()) {
        let tags: Vec<&str> = [
            (run.marks.strikethrough, "del"),
            (run.marks.bold, "strong"),
            (run.marks.italic, "em"),
        ]
        .into_iter()
        .filter_map(|(on, tag)| on.then_some(tag))
        .collect();

        for tag in &tags {
            out.push_str(&format!("<{tag}>"));
        }
        out.push_str(&html_escape::encode_text(&run.text).replace('\n', "<br />\n"));
        for tag in tags.iter().rev() {
            out.push_str(&format!("</{tag}>"));
        }
    }
    out
}
