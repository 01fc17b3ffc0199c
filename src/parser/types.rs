use serde::Serialize;

/// Source range a token of the derived form came from.
///
/// Lines are 1-based, columns are 0-based byte offsets. All four fields zero
/// means the token has no source mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub lineno: usize,
    pub col_offset: usize,
    pub end_lineno: usize,
    pub end_col_offset: usize,
}

impl Position {
    pub const UNMAPPED: Position = Position {
        lineno: 0,
        col_offset: 0,
        end_lineno: 0,
        end_col_offset: 0,
    };

    pub fn new(lineno: usize, col_offset: usize, end_lineno: usize, end_col_offset: usize) -> Self {
        Self {
            lineno,
            col_offset,
            end_lineno,
            end_col_offset,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.lineno != 0
    }

    pub fn is_single_line(&self) -> bool {
        self.lineno == self.end_lineno
    }
}

/// One token of the derived form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    pub text: String,
    pub pos: Position,
}

impl Word {
    pub fn new(text: impl Into<String>, pos: Position) -> Self {
        Self {
            text: text.into(),
            pos,
        }
    }

    pub fn unmapped(text: impl Into<String>) -> Self {
        Self::new(text, Position::UNMAPPED)
    }

    /// True for the pseudo-word standing in for a line's indentation.
    pub fn is_indentation(&self, marker: &str) -> bool {
        !marker.is_empty() && !self.text.is_empty() && self.text.trim_start_matches(marker).is_empty()
    }
}

/// A loaded file: the original source and the annotated derived form.
///
/// `annotated_lines` is not aligned with `source_lines`; each word's position
/// indexes into `source_lines`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub source_lines: Vec<String>,
    pub annotated_lines: Vec<Vec<Word>>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.source_lines.is_empty() && self.annotated_lines.is_empty()
    }

    /// Source text as it was loaded.
    pub fn source_text(&self) -> String {
        self.source_lines.join("\n")
    }

    pub fn word_count(&self) -> usize {
        self.annotated_lines.iter().map(Vec::len).sum()
    }
}
