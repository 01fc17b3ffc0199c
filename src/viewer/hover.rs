use crate::error::{ComparatorError, ComparatorResult};
use crate::parser::{classify, Document, Word, WordClass};
use crate::span::{self, Highlight};

/// UI rule for which word a hover actually targets.
#[derive(Debug, Clone)]
pub struct HoverPolicy {
    /// Hovering a leading indentation pseudo-word targets the next word.
    pub redirect_indentation: bool,
    pub indent_marker: String,
}

/// Outcome of hovering one word of the annotated pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    pub line: usize,
    /// Index of the word the policy resolved to.
    pub word: usize,
    pub text: String,
    pub class: WordClass,
    pub highlight: Highlight,
}

/// Index of the word a hover on `idx` resolves to.
pub fn resolve_index(words: &[Word], idx: usize, policy: &HoverPolicy) -> usize {
    if policy.redirect_indentation
        && idx == 0
        && words.len() > 1
        && words[0].is_indentation(&policy.indent_marker)
    {
        return 1;
    }
    idx
}

/// Hover word `word` of annotated line `line` (both 0-based).
pub fn hover(
    doc: &Document,
    line: usize,
    word: usize,
    policy: &HoverPolicy,
) -> ComparatorResult<HoverResult> {
    let words = doc
        .annotated_lines
        .get(line)
        .ok_or(ComparatorError::LineOutOfRange {
            line,
            count: doc.annotated_lines.len(),
        })?;

    let idx = resolve_index(words, word, policy);
    let target = words.get(idx).ok_or(ComparatorError::WordOutOfRange {
        line,
        word,
        count: words.len(),
    })?;

    Ok(HoverResult {
        line,
        word: idx,
        text: target.text.clone(),
        class: classify(target),
        highlight: span::reconstruct(&target.pos, &doc.source_lines),
    })
}
