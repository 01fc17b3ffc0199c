use std::io::{self, BufRead, Read, Write};
use std::path::Path;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::message::{Message, MessageContent};
use crate::error::{ComparatorError, ComparatorResult};
use crate::parser::{classify, Word};
use crate::viewer::{render_target, OutputFormat, Viewer};

/// Largest message body the server will buffer.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

/// Serves a viewer frontend over Content-Length framed JSON.
pub struct ProtocolServer<R, W> {
    seq: u64,
    max_message_bytes: usize,
    viewer: Viewer,
    reader: R,
    writer: W,
}

fn bad_args(command: &str, reason: &str) -> ComparatorError {
    ComparatorError::BadArguments {
        command: command.to_string(),
        reason: reason.to_string(),
    }
}

fn arg_index(args: Option<&Value>, key: &str, command: &str) -> ComparatorResult<usize> {
    args.and_then(|v| v.get(key))
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| bad_args(command, &format!("missing integer `{key}`")))
}

fn word_json(w: &Word) -> Value {
    let pos = if w.pos.is_mapped() {
        json!(w.pos)
    } else {
        Value::Null
    };
    json!({
        "text": w.text,
        "class": classify(w).as_str(),
        "pos": pos,
    })
}

impl<R: BufRead, W: Write> ProtocolServer<R, W> {
    pub fn new(viewer: Viewer, reader: R, writer: W) -> Self {
        Self {
            seq: 0,
            max_message_bytes: MAX_MESSAGE_BYTES,
            viewer,
            reader,
            writer,
        }
    }

    pub fn with_max_message_bytes(mut self, limit: usize) -> Self {
        self.max_message_bytes = limit;
        self
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn send_response(
        &mut self,
        request_seq: u64,
        command: String,
        success: bool,
        message: Option<String>,
        body: Option<Value>,
    ) -> ComparatorResult<()> {
        let msg = Message {
            seq: self.next_seq(),
            msg_type: "response".to_string(),
            content: MessageContent::Response {
                request_seq,
                success,
                command,
                message,
                body,
            },
        };
        self.send_message(&msg)
    }

    pub fn send_event(&mut self, event: &str, body: Option<Value>) -> ComparatorResult<()> {
        let msg = Message {
            seq: self.next_seq(),
            msg_type: "event".to_string(),
            content: MessageContent::Event {
                event: event.to_string(),
                body,
            },
        };
        self.send_message(&msg)
    }

    fn send_message(&mut self, msg: &Message) -> ComparatorResult<()> {
        let json = serde_json::to_string(msg)?;
        write!(self.writer, "Content-Length: {}\r\n\r\n{}", json.len(), json)?;
        self.writer.flush()?;
        debug!(bytes = json.len(), "sent message");
        Ok(())
    }

    /// Next framed message, or `None` once the input is exhausted.
    pub fn read_message(&mut self) -> ComparatorResult<Option<Message>> {
        let mut content_length = 0usize;

        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                if content_length > 0 {
                    break;
                }
                continue;
            }
            if let Some(value) = line.strip_prefix("Content-Length:") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }

        if content_length > self.max_message_bytes {
            io::copy(
                &mut (&mut self.reader).take(content_length as u64),
                &mut io::sink(),
            )?;
            return Err(bad_args(
                "message",
                &format!(
                    "Content-Length {content_length} exceeds the limit of {} bytes",
                    self.max_message_bytes
                ),
            ));
        }

        let mut buffer = vec![0u8; content_length];
        self.reader.read_exact(&mut buffer)?;
        Ok(Some(serde_json::from_slice(&buffer)?))
    }

    /// Answer requests until `disconnect` or end of input.
    pub fn run(&mut self) -> ComparatorResult<()> {
        info!("protocol server started");

        loop {
            let msg = match self.read_message() {
                Ok(Some(msg)) => msg,
                Ok(None) => break,
                Err(ComparatorError::Json(e)) => {
                    warn!(error = %e, "dropping malformed message");
                    continue;
                }
                Err(e @ ComparatorError::BadArguments { .. }) => {
                    warn!(error = %e, "rejecting message");
                    self.send_response(0, "message".to_string(), false, Some(e.to_string()), None)?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match msg.content {
                MessageContent::Request { command, arguments } => {
                    if !self.dispatch(msg.seq, command, arguments)? {
                        break;
                    }
                }
                other => debug!(?other, "ignoring non-request message"),
            }
        }

        info!("protocol server stopped");
        Ok(())
    }

    /// Handle one request. Returns false when the session should end.
    fn dispatch(
        &mut self,
        seq: u64,
        command: String,
        args: Option<Value>,
    ) -> ComparatorResult<bool> {
        debug!(seq, command = %command, "request");

        let result = match command.as_str() {
            "initialize" => Ok(Some(json!({
                "formats": ["ansi", "html", "plain"],
                "supportsTextLoad": true,
                "redirectsIndentationHover": self.viewer.config().redirect_indentation_hover,
            }))),
            "load" => self.handle_load(args.as_ref()),
            "document" => Ok(Some(self.handle_document())),
            "hover" => self.handle_hover(args.as_ref()),
            "classify" => self.handle_classify(args.as_ref()),
            "disconnect" => {
                self.send_response(seq, command.clone(), true, None, None)?;
                return Ok(false);
            }
            _ => Err(bad_args(&command, "unknown command")),
        };

        match result {
            Ok(body) => {
                self.send_response(seq, command.clone(), true, None, body.clone())?;
                match command.as_str() {
                    "initialize" => self.send_event("initialized", None)?,
                    "load" => self.send_event("loaded", body)?,
                    _ => {}
                }
            }
            Err(e) => {
                warn!(command = %command, error = %e, "request failed");
                self.send_response(seq, command, false, Some(e.to_string()), None)?;
            }
        }
        Ok(true)
    }

    fn handle_load(&mut self, args: Option<&Value>) -> ComparatorResult<Option<Value>> {
        let path = args.and_then(|v| v.get("path")).and_then(Value::as_str);
        let text = args.and_then(|v| v.get("text")).and_then(Value::as_str);

        match (path, text) {
            (Some(path), _) => {
                self.viewer.load_file(Path::new(path))?;
            }
            (None, Some(text)) => {
                self.viewer.load_text(text);
            }
            (None, None) => return Err(bad_args("load", "expected `path` or `text`")),
        }

        let doc = self.viewer.document();
        Ok(Some(json!({
            "path": path,
            "sourceLines": doc.source_lines.len(),
            "annotatedLines": doc.annotated_lines.len(),
        })))
    }

    fn handle_document(&self) -> Value {
        let doc = self.viewer.document();
        let annotated: Vec<Vec<Value>> = doc
            .annotated_lines
            .iter()
            .map(|line| line.iter().map(word_json).collect())
            .collect();
        json!({
            "source": doc.source_lines,
            "annotated": annotated,
        })
    }

    fn handle_hover(&mut self, args: Option<&Value>) -> ComparatorResult<Option<Value>> {
        let line = arg_index(args, "line", "hover")?;
        let word = arg_index(args, "word", "hover")?;
        let format = match args.and_then(|v| v.get("format")) {
            Some(f) => serde_json::from_value(f.clone())
                .map_err(|_| bad_args("hover", "`format` must be ansi, html or plain"))?,
            None => OutputFormat::Html,
        };

        let result = self.viewer.hover(line, word)?;
        let target = render_target(format, self.viewer.config());
        let h = &result.highlight;

        Ok(Some(json!({
            "line": result.line,
            "word": result.word,
            "text": result.text,
            "class": result.class,
            "mapped": h.mapped,
            "before": h.before,
            "highlighted": h.highlighted,
            "dedented": h.dedented(),
            "after": h.after,
            "rendered": target.highlight(h),
        })))
    }

    fn handle_classify(&self, args: Option<&Value>) -> ComparatorResult<Option<Value>> {
        let text = args
            .and_then(|v| v.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| bad_args("classify", "missing string `text`"))?;
        Ok(Some(json!({ "class": classify(&Word::unmapped(text)) })))
    }
}
