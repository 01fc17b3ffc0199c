mod annotations;
mod classify;
mod position;
mod types;

pub use annotations::{
    parse_annotated_line, parse_document, split_sections, ParseOptions, DEFAULT_INDENT_MARKER,
    LF_SECTION_DELIMITER, SECTION_DELIMITER,
};
pub use classify::{
    classify, is_block_label, is_buffer_variable, is_comment, is_constant, is_fun_call,
    is_keyword, is_string, WordClass, KEYWORDS, RESERVED_CALL_PREFIX,
};
pub use position::PositionError;
pub use types::{Document, Position, Word};
