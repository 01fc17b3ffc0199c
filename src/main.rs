use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use anf_comparator::repl::Repl;
use anf_comparator::viewer::{render_target, OutputFormat};
use anf_comparator::{protocol, Viewer, ViewerConfig};

#[derive(Parser)]
#[command(
    name = "anf-comparator",
    about = "Compare a program with its annotated ANF form, one span at a time."
)]
struct Cli {
    /// Config file (defaults to ./anf-comparator.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Interactive viewer, optionally loading a file first
    View { path: Option<PathBuf> },
    /// Highlight the source span of one word and exit
    Hover {
        path: PathBuf,
        /// Annotated line, numbered from 1
        line: usize,
        /// Word index within the line, 0 is the indentation
        word: usize,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Ansi)]
        format: OutputFormat,
    },
    /// Serve a frontend over Content-Length framed JSON on stdin/stdout
    Serve,
}

const DEFAULT_LOG_FILTER: &str = "anf_comparator=info";

/// `RUST_LOG` when set and valid, else the crate at `info`.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(rust_log.as_deref());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ViewerConfig::load(cli.config.as_deref()).context("failed to load config")?;
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }
    if cli.no_color {
        config.color = false;
    }

    init_logging(config.log_file.as_ref())?;

    let mut viewer = Viewer::new(config);

    match cli.mode {
        Mode::View { path } => {
            if let Some(path) = path {
                viewer.load_file(&path)?;
            }
            info!("starting interactive viewer");
            let mut repl = Repl::new(viewer, OutputFormat::Ansi);
            repl.run(io::stdin().lock(), io::stdout().lock())?;
        }
        Mode::Hover {
            path,
            line,
            word,
            format,
        } => {
            anyhow::ensure!(line > 0, "lines are numbered from 1");
            viewer.load_file(&path)?;
            let result = viewer
                .hover(line - 1, word)
                .with_context(|| format!("cannot hover line {line} word {word}"))?;
            let target = render_target(format, viewer.config());
            println!("{}", target.highlight(&result.highlight));
        }
        Mode::Serve => protocol::run_stdio(viewer)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn rust_log_directives_are_honored() {
        let filter = log_filter(Some("anf_comparator=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(filter.to_string(), "anf_comparator=debug");

        assert_eq!(log_filter(Some("trace")).max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn falls_back_to_info_for_the_crate() {
        for rust_log in [None, Some(""), Some("anf_comparator=loud")] {
            let filter = log_filter(rust_log);
            assert_eq!(filter.to_string(), DEFAULT_LOG_FILTER, "{rust_log:?}");
            assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        }
    }
}
