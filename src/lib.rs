//! Side-by-side viewer for a source program and its annotated ANF form.
//!
//! Each token of the ANF form carries the source span it came from; hovering
//! a token cuts the source into the text before, inside and after that span.

pub mod config;
pub mod error;
pub mod parser;
pub mod protocol;
pub mod repl;
pub mod span;
pub mod viewer;

pub use config::ViewerConfig;
pub use error::{ComparatorError, ComparatorResult};
pub use parser::{parse_document, Document, Position, Word, WordClass};
pub use span::{reconstruct, Highlight};
pub use viewer::Viewer;
