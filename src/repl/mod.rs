mod commands;
mod runner;

pub use commands::{parse_command, ReplCommand, HELP};
pub use runner::Repl;
