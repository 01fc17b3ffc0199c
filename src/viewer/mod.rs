mod hover;
mod render;
mod state;

pub use hover::{hover, resolve_index, HoverPolicy, HoverResult};
pub use render::{
    escape_html, render_target, AnsiTerminal, Html, OutputFormat, PlainText, RenderTarget,
};
pub use state::Viewer;
