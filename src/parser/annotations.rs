use tracing::debug;

use super::classify::is_comment_text;
use super::types::{Document, Position, Word};

pub const SECTION_DELIMITER: &str = "\r\n##########\r\n";
pub const LF_SECTION_DELIMITER: &str = "\n##########\n";
pub const DEFAULT_INDENT_MARKER: &str = "\u{a0}";

/// Knobs for splitting and tokenizing a loaded file.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub delimiter: String,
    pub accept_lf_delimiter: bool,
    pub indent_marker: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: SECTION_DELIMITER.to_string(),
            accept_lf_delimiter: true,
            indent_marker: DEFAULT_INDENT_MARKER.to_string(),
        }
    }
}

/// Split file text into the source section and the annotated section.
pub fn split_sections<'a>(text: &'a str, opts: &ParseOptions) -> (&'a str, Option<&'a str>) {
    if let Some((source, annotated)) = text.split_once(opts.delimiter.as_str()) {
        return (source, Some(annotated));
    }
    if opts.accept_lf_delimiter {
        if let Some((source, annotated)) = text.split_once(LF_SECTION_DELIMITER) {
            return (source, Some(annotated));
        }
    }
    (text, None)
}

/// Parse a whole file. Never fails: malformed annotation lines degrade to
/// unmapped words.
pub fn parse_document(text: &str, opts: &ParseOptions) -> Document {
    let (source, annotated) = split_sections(text, opts);

    if annotated.is_none() && !text.is_empty() {
        debug!("no section delimiter found, loading source only");
    }

    let source_lines = if source.is_empty() {
        Vec::new()
    } else {
        source.split('\n').map(str::to_string).collect()
    };

    let annotated_lines = annotated
        .map(|a| {
            a.split('\n')
                .enumerate()
                .filter_map(|(i, line)| {
                    let words = parse_annotated_line(line, &opts.indent_marker);
                    if words.is_none() {
                        debug!(line = i + 1, "skipping blank annotated line");
                    }
                    words
                })
                .collect()
        })
        .unwrap_or_default();

    Document {
        source_lines,
        annotated_lines,
    }
}

/// Tokenize one line of the derived form. Returns `None` for blank lines.
pub fn parse_annotated_line(line: &str, indent_marker: &str) -> Option<Vec<Word>> {
    if line.trim().is_empty() {
        return None;
    }

    if is_comment_text(line) {
        let text = match line.rfind("--") {
            Some(idx) => &line[..idx],
            None => line.trim_end_matches(['\r', '\n']),
        };
        return Some(vec![Word::unmapped(text)]);
    }

    let mut words = Vec::new();

    let indentation = line.len() - line.trim_start_matches(' ').len();
    if indentation > 0 {
        words.push(Word::unmapped(indent_marker.repeat(indentation)));
    }

    let (code, info) = match line.trim().split_once("--") {
        Some((code, info)) => (code, Some(info)),
        None => {
            debug!(line, "annotated line has no `--` marker");
            (line.trim(), None)
        }
    };

    let positions: Vec<Position> = info.map(parse_info).unwrap_or_default();
    let tokens: Vec<&str> = code.trim().split(' ').filter(|t| !t.is_empty()).collect();

    if info.is_some() && positions.len() != tokens.len() {
        debug!(
            tokens = tokens.len(),
            chunks = positions.len(),
            "token and metadata counts differ"
        );
    }

    for (i, token) in tokens.into_iter().enumerate() {
        let pos = positions.get(i).copied().unwrap_or(Position::UNMAPPED);
        words.push(Word::new(token, pos));
    }

    Some(words)
}

/// One Position per `|`-separated chunk of the metadata part.
fn parse_info(info: &str) -> Vec<Position> {
    info.split('|')
        .map(|chunk| match chunk.split(';').nth(1) {
            Some(range) => range.parse().unwrap_or_else(|e| {
                debug!(chunk, error = %e, "unparsable position, treating as unmapped");
                Position::UNMAPPED
            }),
            None => Position::UNMAPPED,
        })
        .collect()
}
