mod message;
mod server;

use std::io;

pub use message::{Message, MessageContent};
pub use server::{ProtocolServer, MAX_MESSAGE_BYTES};

use crate::error::ComparatorResult;
use crate::viewer::Viewer;

/// Serve on stdin/stdout until the frontend disconnects.
pub fn run_stdio(viewer: Viewer) -> ComparatorResult<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut server = ProtocolServer::new(viewer, stdin.lock(), stdout.lock());
    server.run()
}
