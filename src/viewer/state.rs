use std::path::{Path, PathBuf};

use tracing::info;

use super::hover::{self, HoverPolicy, HoverResult};
use crate::config::ViewerConfig;
use crate::error::{ComparatorError, ComparatorResult};
use crate::parser::{self, Document};

/// The currently displayed document. Each load replaces it wholesale.
pub struct Viewer {
    config: ViewerConfig,
    document: Document,
    source_path: Option<PathBuf>,
    loaded: bool,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            document: Document::default(),
            source_path: None,
            loaded: false,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// True once a load succeeded, even if the file was empty.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn load_file(&mut self, path: &Path) -> ComparatorResult<&Document> {
        let text = std::fs::read_to_string(path).map_err(|source| ComparatorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_text(&text);
        self.source_path = Some(path.to_path_buf());
        Ok(&self.document)
    }

    pub fn load_text(&mut self, text: &str) -> &Document {
        self.document = parser::parse_document(text, &self.config.parse_options());
        self.source_path = None;
        self.loaded = true;
        info!(
            source_lines = self.document.source_lines.len(),
            annotated_lines = self.document.annotated_lines.len(),
            words = self.document.word_count(),
            "document loaded"
        );
        &self.document
    }

    pub fn clear(&mut self) {
        self.document = Document::default();
        self.source_path = None;
        self.loaded = false;
    }

    pub fn policy(&self) -> HoverPolicy {
        HoverPolicy {
            redirect_indentation: self.config.redirect_indentation_hover,
            indent_marker: self.config.indent_marker.clone(),
        }
    }

    pub fn hover(&self, line: usize, word: usize) -> ComparatorResult<HoverResult> {
        if !self.loaded {
            return Err(ComparatorError::NoDocument);
        }
        hover::hover(&self.document, line, word, &self.policy())
    }
}
