use serde::Serialize;

use super::types::Word;

pub const KEYWORDS: [&str; 7] = ["let", "letrec", "=", "in", "if", "else", "then"];

/// Prefix of compiler-generated names that look like calls but are not.
pub const RESERVED_CALL_PREFIX: &str = "_SSA";

/// Display class of a derived-form token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordClass {
    Comment,
    String,
    Keyword,
    BlockLabel,
    FunctionCall,
    BufferVariable,
    Constant,
    Plain,
}

impl WordClass {
    /// Name used for CSS classes and protocol payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            WordClass::Comment => "comment",
            WordClass::String => "string",
            WordClass::Keyword => "keyword",
            WordClass::BlockLabel => "block-label",
            WordClass::FunctionCall => "function-call",
            WordClass::BufferVariable => "buffer-variable",
            WordClass::Constant => "constant",
            WordClass::Plain => "plain",
        }
    }
}

pub fn is_keyword(w: &Word) -> bool {
    KEYWORDS.contains(&w.text.as_str())
}

pub fn is_fun_call(w: &Word) -> bool {
    w.text.starts_with('_') && !w.text.starts_with(RESERVED_CALL_PREFIX) && w.text != "_"
}

/// `L` followed by at least one digit, anywhere in the token (`L3`, `x.L12`).
pub fn is_block_label(w: &Word) -> bool {
    let bytes = w.text.as_bytes();
    bytes
        .windows(2)
        .any(|pair| pair[0] == b'L' && pair[1].is_ascii_digit())
}

pub fn is_buffer_variable(w: &Word) -> bool {
    w.text.starts_with('%')
}

pub fn is_constant(w: &Word) -> bool {
    w.text.starts_with(|c: char| c.is_ascii_digit()) || w.text == "True" || w.text == "False"
}

pub fn is_comment(w: &Word) -> bool {
    is_comment_text(&w.text)
}

/// Optional leading spaces, then `#`.
pub fn is_comment_text(text: &str) -> bool {
    text.trim_start_matches(' ').starts_with('#')
}

pub fn is_string(w: &Word) -> bool {
    match w.text.find('\'') {
        Some(open) => w.text[open + 1..].contains('\''),
        None => false,
    }
}

/// First matching class in display precedence order.
pub fn classify(w: &Word) -> WordClass {
    if is_comment(w) {
        WordClass::Comment
    } else if is_string(w) {
        WordClass::String
    } else if is_keyword(w) {
        WordClass::Keyword
    } else if is_block_label(w) {
        WordClass::BlockLabel
    } else if is_fun_call(w) {
        WordClass::FunctionCall
    } else if is_buffer_variable(w) {
        WordClass::BufferVariable
    } else if is_constant(w) {
        WordClass::Constant
    } else {
        WordClass::Plain
    }
}
