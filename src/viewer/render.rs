use serde::Deserialize;

use crate::config::ViewerConfig;
use crate::parser::{classify, Word, WordClass};
use crate::span::Highlight;

/// Output flavor of a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Ansi,
    Html,
    Plain,
}

/// Turns highlight fragments and classified words into display text.
pub trait RenderTarget {
    fn highlight(&self, fragments: &Highlight) -> String;

    fn word(&self, word: &Word, class: WordClass) -> String;

    fn indent_marker(&self) -> &str;

    /// One annotated line. No separator follows the indentation pseudo-word.
    fn annotated_line(&self, words: &[Word]) -> String {
        let mut out = String::new();
        for (i, w) in words.iter().enumerate() {
            if i > 0 && !words[i - 1].is_indentation(self.indent_marker()) {
                out.push(' ');
            }
            out.push_str(&self.word(w, classify(w)));
        }
        out
    }
}

pub fn render_target(format: OutputFormat, config: &ViewerConfig) -> Box<dyn RenderTarget> {
    match format {
        OutputFormat::Ansi if config.color => Box::new(AnsiTerminal::new(&config.indent_marker)),
        OutputFormat::Html => Box::new(Html::new(&config.indent_marker)),
        OutputFormat::Ansi | OutputFormat::Plain => Box::new(PlainText::new(
            &config.indent_marker,
            &config.highlight_open,
            &config.highlight_close,
        )),
    }
}

fn strip_cr(text: &str) -> String {
    text.replace('\r', "")
}

const RESET: &str = "\x1b[0m";
const REVERSE: &str = "\x1b[7m";

fn ansi_color(class: WordClass) -> Option<&'static str> {
    match class {
        WordClass::Keyword => Some("\x1b[1;35m"),
        WordClass::FunctionCall => Some("\x1b[34m"),
        WordClass::BlockLabel => Some("\x1b[33m"),
        WordClass::BufferVariable => Some("\x1b[36m"),
        WordClass::Constant => Some("\x1b[31m"),
        WordClass::String => Some("\x1b[32m"),
        WordClass::Comment => Some("\x1b[2m"),
        WordClass::Plain => None,
    }
}

/// Terminal output: span in reverse video, words colored by class.
pub struct AnsiTerminal {
    indent_marker: String,
}

impl AnsiTerminal {
    pub fn new(indent_marker: &str) -> Self {
        Self {
            indent_marker: indent_marker.to_string(),
        }
    }
}

impl RenderTarget for AnsiTerminal {
    fn highlight(&self, fragments: &Highlight) -> String {
        if !fragments.mapped {
            return strip_cr(&fragments.before);
        }
        // Reverse video does not survive a newline in every terminal.
        let span = strip_cr(&fragments.highlighted)
            .split('\n')
            .map(|line| format!("{REVERSE}{line}{RESET}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "{}{}{}",
            strip_cr(&fragments.before),
            span,
            strip_cr(&fragments.after)
        )
    }

    fn word(&self, word: &Word, class: WordClass) -> String {
        let text = strip_cr(&word.text.replace(&self.indent_marker, " "));
        match ansi_color(class) {
            Some(color) => format!("{color}{text}{RESET}"),
            None => text,
        }
    }

    fn indent_marker(&self) -> &str {
        &self.indent_marker
    }
}

/// Uncolored output with textual span markers.
pub struct PlainText {
    indent_marker: String,
    open: String,
    close: String,
}

impl PlainText {
    pub fn new(indent_marker: &str, open: &str, close: &str) -> Self {
        Self {
            indent_marker: indent_marker.to_string(),
            open: open.to_string(),
            close: close.to_string(),
        }
    }
}

impl RenderTarget for PlainText {
    fn highlight(&self, fragments: &Highlight) -> String {
        if !fragments.mapped {
            return strip_cr(&fragments.before);
        }
        strip_cr(&format!(
            "{}{}{}{}{}",
            fragments.before, self.open, fragments.highlighted, self.close, fragments.after
        ))
    }

    fn word(&self, word: &Word, _class: WordClass) -> String {
        strip_cr(&word.text.replace(&self.indent_marker, " "))
    }

    fn indent_marker(&self) -> &str {
        &self.indent_marker
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Markup for a browser pane. The span is dedented because it is styled as
/// an inline block.
pub struct Html {
    indent_marker: String,
}

impl Html {
    pub fn new(indent_marker: &str) -> Self {
        Self {
            indent_marker: indent_marker.to_string(),
        }
    }
}

impl RenderTarget for Html {
    fn highlight(&self, fragments: &Highlight) -> String {
        if !fragments.mapped {
            return escape_html(&fragments.before);
        }
        format!(
            "{}<span class=\"highlight\">{}</span>{}",
            escape_html(&fragments.before),
            escape_html(&fragments.dedented()),
            escape_html(&fragments.after)
        )
    }

    fn word(&self, word: &Word, class: WordClass) -> String {
        let text = if self.indent_marker.is_empty() {
            escape_html(&word.text)
        } else {
            word.text
                .split(self.indent_marker.as_str())
                .map(escape_html)
                .collect::<Vec<_>>()
                .join("&nbsp;")
        };
        format!("<span class=\"{}\">{}</span>", class.as_str(), text)
    }

    fn indent_marker(&self) -> &str {
        &self.indent_marker
    }
}
