use crate::model::Document;
use crate::parsing::parse_markdown;
use crate::render::{markdown_to_html, to_markdown};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid samples directory: {0}")]
    InvalidSamplesDir(PathBuf),
}

/// On-disk representation of a document, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Markdown,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Markdown,
        }
    }
}

/// Read a document; `.json` files hold the serialized block list, anything
/// else is imported as markdown
pub fn read_document(path: &Path) -> Result<Document, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    match DocumentFormat::from_path(path) {
        DocumentFormat::Json => serde_json::from_str(&content).map_err(|source| IoError::Json {
            path: path.to_path_buf(),
            source,
        }),
        DocumentFormat::Markdown => Ok(parse_markdown(&content)),
    }
}

/// Write a document in the format its extension selects
pub fn write_document(path: &Path, doc: &Document) -> Result<(), IoError> {
    let content = match DocumentFormat::from_path(path) {
        DocumentFormat::Json => serde_json::to_string_pretty(doc).map_err(|source| IoError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        DocumentFormat::Markdown => to_markdown(doc),
    };

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, content)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// A markdown input paired with the HTML a CommonMark renderer produces for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub name: String,
    pub markdown: String,
    pub expected_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleReport {
    pub name: String,
    pub rendered: String,
    pub expected: String,
    pub passed: bool,
}

impl Sample {
    /// Render the markdown and compare with the expected output, ignoring
    /// surrounding whitespace
    pub fn check(&self) -> SampleReport {
        let rendered = markdown_to_html(&self.markdown);
        let passed = rendered.trim() == self.expected_html.trim();
        SampleReport {
            name: self.name.clone(),
            rendered,
            expected: self.expected_html.clone(),
            passed,
        }
    }
}

/// Load every `<name>.md` in `dir` that has a sibling `<name>.out`, sorted by name
pub fn load_samples(dir: &Path) -> Result<Vec<Sample>, IoError> {
    if !dir.is_dir() {
        return Err(IoError::InvalidSamplesDir(dir.to_path_buf()));
    }

    let mut samples = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }

        let expected_path = path.with_extension("out");
        if !expected_path.exists() {
            log::warn!("Sample {} has no {}", path.display(), expected_path.display());
            continue;
        }

        samples.push(Sample {
            name: name.to_string(),
            markdown: fs::read_to_string(&path)?,
            expected_html: fs::read_to_string(&expected_path)?,
        });
    }

    samples.sort_by(|a, b| a.name.cmp(&b.name));
    log::debug!("Loaded {} sample(s) from {}", samples.len(), dir.display());
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, HeaderLevel};
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.md");
        assert!(matches!(read_document(&path), Err(IoError::NotFound(p)) if p == path));
    }

    #[test]
    fn test_write_and_read_json_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/doc.json");
        let doc = Document::new(vec![
            Block::header(HeaderLevel::clamped(2), "Title"),
            Block::paragraph("body"),
        ]);

        write_document(&path, &doc).unwrap();
        let loaded = read_document(&path).unwrap();
        assert_eq!(loaded.blocks(), doc.blocks());
    }

    #[test]
    fn test_write_and_read_markdown_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.md");
        let doc = Document::new(vec![Block::header(HeaderLevel::MIN, "Hi"), Block::paragraph("there")]);

        write_document(&path, &doc).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Hi\n\nthere\n");
        assert_eq!(read_document(&path).unwrap().blocks(), doc.blocks());
    }

    #[test]
    fn test_invalid_json_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(read_document(&path), Err(IoError::Json { .. })));
    }

    #[test]
    fn test_load_samples_pairs_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("b.md"), "# B").unwrap();
        fs::write(dir.join("b.out"), "<h1>B</h1>\n").unwrap();
        fs::write(dir.join("a.md"), "*a*").unwrap();
        fs::write(dir.join("a.out"), "<p><em>a</em></p>").unwrap();
        fs::write(dir.join("orphan.md"), "no expected output").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let samples = load_samples(dir).unwrap();
        let names: Vec<&str> = samples.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(samples.iter().all(|sample| sample.check().passed));
    }

    #[test]
    fn test_failing_sample_reports_rendered_html() {
        let sample = Sample {
            name: "wrong".to_string(),
            markdown: "## Two".to_string(),
            expected_html: "<h1>Two</h1>".to_string(),
        };
        let report = sample.check();
        assert!(!report.passed);
        assert_eq!(report.rendered, "<h2>Two</h2>\n");
    }

    #[test]
    fn test_load_samples_rejects_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        assert!(matches!(load_samples(&missing), Err(IoError::InvalidSamplesDir(_))));
    }
}
