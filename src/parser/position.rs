use std::str::FromStr;

use thiserror::Error;

use super::types::Position;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("expected `start,end`, got {0:?}")]
    MissingEnd(String),

    #[error("expected `line:col`, got {0:?}")]
    MalformedBound(String),

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("range {0}:{1},{2}:{3} is not a valid source span")]
    InvalidRange(usize, usize, usize, usize),
}

fn parse_bound(text: &str) -> Result<(usize, usize), PositionError> {
    let (line, col) = text
        .split_once(':')
        .ok_or_else(|| PositionError::MalformedBound(text.to_string()))?;
    Ok((parse_number(line)?, parse_number(col)?))
}

fn parse_number(text: &str) -> Result<usize, PositionError> {
    text.trim()
        .parse()
        .map_err(|_| PositionError::InvalidNumber(text.trim().to_string()))
}

/// Parses `startLine:startCol,endLine:endCol`.
impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (start, end) = s
            .split_once(',')
            .ok_or_else(|| PositionError::MissingEnd(s.to_string()))?;

        let (lineno, col_offset) = parse_bound(start)?;
        let (end_lineno, end_col_offset) = parse_bound(end)?;
        let pos = Position::new(lineno, col_offset, end_lineno, end_col_offset);

        if pos == Position::UNMAPPED {
            return Ok(pos);
        }
        if lineno == 0 || (lineno, col_offset) > (end_lineno, end_col_offset) {
            return Err(PositionError::InvalidRange(
                lineno,
                col_offset,
                end_lineno,
                end_col_offset,
            ));
        }
        Ok(pos)
    }
}
