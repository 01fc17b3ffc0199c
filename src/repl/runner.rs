use std::io::{BufRead, Write};

use tracing::{debug, warn};

use super::commands::{parse_command, ReplCommand, HELP};
use crate::error::{ComparatorError, ComparatorResult};
use crate::parser::{classify, Document};
use crate::viewer::{render_target, OutputFormat, RenderTarget, Viewer};

/// Interactive two-pane viewer driven by typed commands.
pub struct Repl {
    viewer: Viewer,
    target: Box<dyn RenderTarget>,
}

impl Repl {
    pub fn new(viewer: Viewer, format: OutputFormat) -> Self {
        let target = render_target(format, viewer.config());
        Self { viewer, target }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Read commands until `quit` or end of input. Command errors are
    /// reported and the loop continues.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> ComparatorResult<()> {
        let mut line = String::new();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }

            let keep_going = match parse_command(&line) {
                Ok(cmd) => match self.execute(&cmd, &mut out) {
                    Ok(keep_going) => keep_going,
                    Err(ComparatorError::Io(e)) => return Err(e.into()),
                    Err(e) => {
                        warn!(error = %e, "command failed");
                        writeln!(out, "error: {e}")?;
                        true
                    }
                },
                Err(e) => {
                    writeln!(out, "error: {e}")?;
                    true
                }
            };
            if !keep_going {
                break;
            }
        }
        Ok(())
    }

    /// Run one command. Returns false when the session should end.
    pub fn execute<W: Write>(&mut self, cmd: &ReplCommand, out: &mut W) -> ComparatorResult<bool> {
        debug!(?cmd, "repl command");

        match cmd {
            ReplCommand::Empty => {}
            ReplCommand::Load(path) => {
                let doc = self.viewer.load_file(path)?;
                writeln!(
                    out,
                    "loaded {}: {} source lines, {} annotated lines",
                    path.display(),
                    doc.source_lines.len(),
                    doc.annotated_lines.len()
                )?;
            }
            ReplCommand::Source => {
                let doc = self.require_document()?;
                for (i, line) in doc.source_lines.iter().enumerate() {
                    writeln!(out, "{:>4} | {}", i + 1, line.trim_end_matches('\r'))?;
                }
            }
            ReplCommand::Anf => {
                let doc = self.require_document()?;
                for (i, words) in doc.annotated_lines.iter().enumerate() {
                    writeln!(out, "{:>4} | {}", i + 1, self.target.annotated_line(words))?;
                }
            }
            ReplCommand::Words(line) => {
                let doc = self.require_document()?;
                let words = doc.annotated_lines.get(line - 1).ok_or(
                    ComparatorError::LineOutOfRange {
                        line: *line,
                        count: doc.annotated_lines.len(),
                    },
                )?;
                let marker = &self.viewer.config().indent_marker;
                for (i, w) in words.iter().enumerate() {
                    let shown = if w.is_indentation(marker) {
                        format!("<indent {}>", w.text.matches(marker.as_str()).count())
                    } else {
                        w.text.clone()
                    };
                    let pos = if w.pos.is_mapped() {
                        format!(
                            "{}:{}-{}:{}",
                            w.pos.lineno, w.pos.col_offset, w.pos.end_lineno, w.pos.end_col_offset
                        )
                    } else {
                        "-".to_string()
                    };
                    writeln!(out, "{i:>3}  {shown:<20} {:<16} {pos}", classify(w).as_str())?;
                }
            }
            ReplCommand::Hover { line, word } => {
                let count = self.require_document()?.annotated_lines.len();
                if *line > count {
                    return Err(ComparatorError::LineOutOfRange { line: *line, count });
                }
                let result = self.viewer.hover(line - 1, *word)?;
                writeln!(
                    out,
                    "-- line {} word {} `{}` ({})",
                    line,
                    result.word,
                    result.text.trim_end(),
                    result.class.as_str()
                )?;
                if !result.highlight.mapped {
                    writeln!(out, "(no source mapping)")?;
                }
                writeln!(out, "{}", self.target.highlight(&result.highlight))?;
            }
            ReplCommand::Clear => {
                self.viewer.clear();
                writeln!(out, "cleared")?;
            }
            ReplCommand::Help => writeln!(out, "{HELP}")?,
            ReplCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn require_document(&self) -> ComparatorResult<&Document> {
        if !self.viewer.is_loaded() {
            return Err(ComparatorError::NoDocument);
        }
        Ok(self.viewer.document())
    }
}
