use std::path::PathBuf;

use crate::error::{ComparatorError, ComparatorResult};

/// One command typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Load(PathBuf),
    Source,
    Anf,
    /// 1-based annotated line.
    Words(usize),
    /// 1-based annotated line, 0-based word index.
    Hover { line: usize, word: usize },
    Clear,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  load <path>          load an annotated file
  source               show the source pane
  anf                  show the annotated pane
  words <line>         list the words of an annotated line
  hover <line> <word>  highlight the source span of a word (word 0 is the indentation)
  clear                forget the loaded document
  help                 show this text
  quit                 leave";

fn bad(command: &str, reason: impl Into<String>) -> ComparatorError {
    ComparatorError::BadArguments {
        command: command.to_string(),
        reason: reason.into(),
    }
}

fn number(command: &str, arg: Option<&String>, what: &str) -> ComparatorResult<usize> {
    let arg = arg.ok_or_else(|| bad(command, format!("missing {what}")))?;
    arg.parse()
        .map_err(|_| bad(command, format!("{what} must be a number, got {arg:?}")))
}

fn line_number(command: &str, arg: Option<&String>) -> ComparatorResult<usize> {
    match number(command, arg, "line")? {
        0 => Err(bad(command, "lines are numbered from 1")),
        n => Ok(n),
    }
}

/// Split a prompt line shell-style and decode it.
pub fn parse_command(input: &str) -> ComparatorResult<ReplCommand> {
    let args = shlex::split(input).ok_or_else(|| bad("input", "unbalanced quotes"))?;
    let Some((name, rest)) = args.split_first() else {
        return Ok(ReplCommand::Empty);
    };

    let cmd = match name.to_lowercase().as_str() {
        "load" | "open" => {
            let path = rest.first().ok_or_else(|| bad("load", "missing path"))?;
            ReplCommand::Load(PathBuf::from(path))
        }
        "source" | "src" => ReplCommand::Source,
        "anf" => ReplCommand::Anf,
        "words" => ReplCommand::Words(line_number("words", rest.first())?),
        "hover" | "h" => ReplCommand::Hover {
            line: line_number("hover", rest.first())?,
            word: number("hover", rest.get(1), "word")?,
        },
        "clear" => ReplCommand::Clear,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(bad(other, "unknown command, try `help`")),
    };
    Ok(cmd)
}
