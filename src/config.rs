//! Viewer configuration.
//!
//! Resolution: explicit `--config` path, else `anf-comparator.yaml` in the
//! working directory, else built-in defaults. Command-line flags override.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ComparatorError, ComparatorResult};
use crate::parser::{ParseOptions, DEFAULT_INDENT_MARKER, SECTION_DELIMITER};

pub const DEFAULT_CONFIG_FILE: &str = "anf-comparator.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Line separating the source section from the annotated section.
    pub delimiter: String,
    /// Also accept the delimiter with bare `\n` line endings.
    pub accept_lf_delimiter: bool,
    /// Repeated once per leading space in indentation pseudo-words.
    pub indent_marker: String,
    /// Hovering a line's indentation highlights the line's first token.
    pub redirect_indentation_hover: bool,
    /// Markers around the span in plain-text output.
    pub highlight_open: String,
    pub highlight_close: String,
    /// ANSI colors in terminal output.
    pub color: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            delimiter: SECTION_DELIMITER.to_string(),
            accept_lf_delimiter: true,
            indent_marker: DEFAULT_INDENT_MARKER.to_string(),
            redirect_indentation_hover: true,
            highlight_open: "[[".to_string(),
            highlight_close: "]]".to_string(),
            color: true,
            log_file: None,
        }
    }
}

impl ViewerConfig {
    /// Load from `path`, or from the default file if present, or defaults.
    pub fn load(path: Option<&Path>) -> ComparatorResult<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> ComparatorResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ComparatorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text).map_err(|source| ComparatorError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            delimiter: self.delimiter.clone(),
            accept_lf_delimiter: self.accept_lf_delimiter,
            indent_marker: self.indent_marker.clone(),
        }
    }
}
