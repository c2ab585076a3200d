use std::path::PathBuf;

use markdown_autoformat_engine::render::{markdown_to_html, to_html};
use markdown_autoformat_engine::{load_samples, parse_markdown};

fn samples_dir() -> PathBuf {
    PathBuf::from(format!("{}/tests/fixtures/samples", env!("CARGO_MANIFEST_DIR")))
}

#[test]
fn fixture_samples_render_as_expected() {
    let samples = load_samples(&samples_dir()).unwrap();
    assert_eq!(samples.len(), 4);

    for sample in &samples {
        let report = sample.check();
        assert!(
            report.passed,
            "sample {} rendered:\n{}\nexpected:\n{}",
            report.name, report.rendered, report.expected
        );
    }
}

/// Importing a sample and rendering the model gives the same HTML as the
/// CommonMark renderer, for the constructs the model represents.
#[test]
fn model_html_matches_commonmark_for_headers() {
    let samples = load_samples(&samples_dir()).unwrap();
    let headers = samples.iter().find(|s| s.name == "headers").unwrap();

    let doc = parse_markdown(&headers.markdown);
    assert_eq!(to_html(&doc), markdown_to_html(&headers.markdown));
}
