//! Rebuilds the source text around a token's span.
//!
//! Given a [`Position`] and the source split into lines, [`reconstruct`]
//! returns the text before the span, the span itself and the text after it.
//! Concatenating the three yields the source unchanged for any mapped
//! position; out-of-range positions are clamped, never rejected.

use crate::parser::Position;

/// The source cut into three fragments around a highlighted span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    pub before: String,
    pub highlighted: String,
    pub after: String,
    /// Leading spaces of the span's first line.
    pub indentation: usize,
    pub mapped: bool,
}

impl Highlight {
    fn unmapped(source: String) -> Self {
        Self {
            before: source,
            ..Self::default()
        }
    }

    /// The span with `indentation` characters cut from the front of every
    /// following line (shorter lines become empty), for rendering the span
    /// as an inline block.
    pub fn dedented(&self) -> String {
        if self.indentation == 0 {
            return self.highlighted.clone();
        }

        self.highlighted
            .split('\n')
            .enumerate()
            .map(|(i, line)| {
                if i == 0 {
                    return line;
                }
                line.char_indices()
                    .nth(self.indentation)
                    .map_or("", |(at, _)| &line[at..])
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `before + highlighted + after`.
    pub fn reassemble(&self) -> String {
        let mut out =
            String::with_capacity(self.before.len() + self.highlighted.len() + self.after.len());
        out.push_str(&self.before);
        out.push_str(&self.highlighted);
        out.push_str(&self.after);
        out
    }
}

/// Largest char boundary in `line` that is `<= idx`.
fn floor_boundary(line: &str, idx: usize) -> usize {
    if idx >= line.len() {
        return line.len();
    }
    let mut idx = idx;
    while !line.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::<str>::as_ref)
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Split the source around `pos`.
pub fn reconstruct<S: AsRef<str>>(pos: &Position, source_lines: &[S]) -> Highlight {
    if !pos.is_mapped() || source_lines.is_empty() {
        return Highlight::unmapped(join_lines(source_lines));
    }

    let count = source_lines.len();
    let start = pos.lineno.min(count);
    let end = pos.end_lineno.clamp(start, count);

    let first: &str = source_lines[start - 1].as_ref();
    let last: &str = source_lines[end - 1].as_ref();

    let start_col = floor_boundary(first, pos.col_offset);
    let mut end_col = floor_boundary(last, pos.end_col_offset);
    if start == end {
        end_col = end_col.max(start_col);
    }

    let indentation = first.len() - first.trim_start_matches(' ').len();

    let mut before = String::new();
    if start > 1 {
        before.push_str(&join_lines(&source_lines[..start - 1]));
        before.push('\n');
    }
    before.push_str(&first[..start_col]);

    let mut highlighted = String::new();
    if start == end {
        highlighted.push_str(&first[start_col..end_col]);
    } else {
        highlighted.push_str(&first[start_col..]);
        highlighted.push('\n');
        for line in &source_lines[start..end - 1] {
            highlighted.push_str(line.as_ref());
            highlighted.push('\n');
        }
        highlighted.push_str(&last[..end_col]);
    }

    let mut after = String::new();
    if end_col < last.len() {
        after.push_str(&last[end_col..]);
    }
    if end < count {
        after.push('\n');
        after.push_str(&join_lines(&source_lines[end..]));
    }

    Highlight {
        before,
        highlighted,
        after,
        indentation,
        mapped: true,
    }
}
