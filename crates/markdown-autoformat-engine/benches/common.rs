// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use markdown_autoformat_engine::{Block, Document};

/// One paragraph of `lines` soft-broken lines, the last being a `#` prefix
#[allow(dead_code)]
pub fn long_paragraph(lines: usize, hashes: usize) -> String {
    let mut text = "Some paragraph content with multiple words.\n".repeat(lines);
    text.push_str(&"#".repeat(hashes));
    text
}

#[allow(dead_code)]
pub fn generate_document(blocks: usize) -> Document {
    let blocks = (0..blocks)
        .map(|i| Block::paragraph(long_paragraph(i % 20, 1 + i % 8)))
        .collect();
    Document::new(blocks)
}

#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with **bold** and *italic* content.\n\n- Bullet point\n- Another item\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}
