pub mod editing;
pub mod io;
pub mod model;
pub mod parsing;
pub mod render;

// Re-export key types for easier usage
pub use editing::*;
pub use io::{IoError, Sample, SampleReport, load_samples, read_document, write_document};
pub use model::*;
pub use parsing::parse_markdown;
