// Drives the interactive viewer and the protocol server with scripted input

use std::fs;
use std::io::Cursor;

use anf_comparator::protocol::ProtocolServer;
use anf_comparator::repl::Repl;
use anf_comparator::viewer::OutputFormat;
use anf_comparator::{Viewer, ViewerConfig};
use serde_json::{json, Value};
use tempfile::TempDir;

const FIXTURE: &str = "def f(a):
    if a > 0:
        return a
    return 0\r\n##########\r\n\
letrec _f = λa . -- ;1:0,4:12|;1:4,1:5|;1:0,4:12|;1:6,1:7|
  if a > 0 then -- ;2:4,3:16|;2:7,2:8|;2:9,2:10|;2:11,2:12|;2:4,3:16
    a -- ;3:15,3:16
# done -- 
";

fn plain_config() -> ViewerConfig {
    ViewerConfig {
        color: false,
        ..ViewerConfig::default()
    }
}

#[cfg(test)]
mod repl_tests {
    use super::*;

    fn run_script(script: &str) -> String {
        let mut repl = Repl::new(Viewer::new(plain_config()), OutputFormat::Plain);
        let mut out = Vec::new();
        repl.run(Cursor::new(script.to_string()), &mut out)
            .expect("repl failed");
        String::from_utf8(out).unwrap()
    }

    fn write_fixture(dir: &TempDir) -> String {
        let path = dir.path().join("session.txt");
        fs::write(&path, FIXTURE).expect("Failed to write test file");
        path.display().to_string()
    }

    #[test]
    fn test_commands_before_load_report_errors() {
        let out = run_script("anf\nhover 1 1\n");
        assert_eq!(out.matches("error: no document loaded").count(), 2);
    }

    #[test]
    fn test_load_and_show_panes() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);
        let out = run_script(&format!("load \"{path}\"\nsource\nanf\nquit\n"));

        assert!(out.contains("4 source lines, 4 annotated lines"), "{out}");
        assert!(out.contains("   2 |     if a > 0:"));
        assert!(out.contains("   2 |   if a > 0 then"));
        assert!(out.contains("   4 | # done "));
    }

    #[test]
    fn test_hover_on_indentation_highlights_first_token() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);
        let out = run_script(&format!("load \"{path}\"\nhover 2 0\n"));

        assert!(out.contains("-- line 2 word 1 `if` (keyword)"), "{out}");
        assert!(out.contains("def f(a):\n    [[if a > 0:\n        return a]]\n    return 0"));
    }

    #[test]
    fn test_hover_unmapped_word_shows_plain_source() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);
        let out = run_script(&format!("load \"{path}\"\nhover 1 4\n"));

        assert!(out.contains("(no source mapping)"));
        assert!(!out.contains("[["));
    }

    #[test]
    fn test_load_records_source_path() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);
        let mut repl = Repl::new(Viewer::new(plain_config()), OutputFormat::Plain);
        let mut out = Vec::new();
        repl.run(Cursor::new(format!("load \"{path}\"\n")), &mut out)
            .expect("repl failed");

        assert_eq!(
            repl.viewer().source_path().map(|p| p.display().to_string()),
            Some(path)
        );
        assert_eq!(repl.viewer().document().annotated_lines.len(), 4);
    }

    #[test]
    fn test_empty_file_shows_empty_panes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").expect("Failed to write test file");
        let out = run_script(&format!("load \"{}\"\nsource\nanf\nhover 1 0\n", path.display()));

        assert!(out.contains("0 source lines, 0 annotated lines"), "{out}");
        assert!(!out.contains("no document loaded"), "{out}");
        assert!(out.contains("error: annotated line 1 out of range (document has 0)"));
    }

    #[test]
    fn test_words_listing() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);
        let out = run_script(&format!("load \"{path}\"\nwords 2\n"));

        assert!(out.contains("<indent 2>"));
        assert!(out.contains("keyword"));
        assert!(out.contains("2:4-3:16"));
    }

    #[test]
    fn test_bad_input_does_not_end_session() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);
        let out = run_script(&format!("load \"{path}\"\nbogus\nhover 9 1\nhover 3 1\nquit\nanf\n"));

        assert!(out.contains("error: bad arguments for `bogus`"));
        assert!(out.contains("error: annotated line 9 out of range (document has 4)"));
        assert!(out.contains("[[a]]"));
        assert!(!out.contains("letrec"), "commands after quit must not run");
    }
}

#[cfg(test)]
mod protocol_tests {
    use super::*;

    fn frame(seq: u64, command: &str, arguments: Option<Value>) -> String {
        let mut msg = json!({ "seq": seq, "type": "request", "command": command });
        if let Some(args) = arguments {
            msg["arguments"] = args;
        }
        let body = msg.to_string();
        format!("Content-Length: {}\r\n\r\n{}", body.len(), body)
    }

    fn read_frames(bytes: &[u8]) -> Vec<Value> {
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        let mut frames = Vec::new();
        let mut rest = text.as_str();
        while let Some(header_end) = rest.find("\r\n\r\n") {
            let len: usize = rest[..header_end]
                .trim_start_matches("Content-Length:")
                .trim()
                .parse()
                .unwrap();
            let start = header_end + 4;
            frames.push(serde_json::from_str(&rest[start..start + len]).unwrap());
            rest = &rest[start + len..];
        }
        frames
    }

    fn serve(input: String) -> Vec<Value> {
        let mut server = ProtocolServer::new(
            Viewer::new(plain_config()),
            Cursor::new(input.into_bytes()),
            Vec::new(),
        );
        server.run().expect("server failed");
        read_frames(&server.into_writer())
    }

    #[test]
    fn test_full_session() {
        let input = [
            frame(1, "initialize", None),
            frame(2, "load", Some(json!({ "text": FIXTURE }))),
            frame(3, "hover", Some(json!({ "line": 1, "word": 0, "format": "plain" }))),
            frame(4, "classify", Some(json!({ "text": "_print" }))),
            frame(5, "document", None),
            frame(6, "disconnect", None),
            frame(7, "initialize", None),
        ]
        .concat();

        let frames = serve(input);
        assert_eq!(frames.len(), 8, "{frames:#?}");

        assert_eq!(frames[0]["type"], "response");
        assert_eq!(frames[0]["request_seq"], 1);
        assert_eq!(frames[0]["success"], true);
        assert_eq!(frames[1]["event"], "initialized");

        assert_eq!(frames[2]["body"]["annotatedLines"], 4);
        assert_eq!(frames[3]["event"], "loaded");
        assert_eq!(frames[3]["body"]["sourceLines"], 4);

        let hover = &frames[4]["body"];
        assert_eq!(hover["word"], 1);
        assert_eq!(hover["text"], "if");
        assert_eq!(hover["class"], "keyword");
        assert_eq!(hover["mapped"], true);
        assert_eq!(hover["before"], "def f(a):\n    ");
        assert_eq!(hover["highlighted"], "if a > 0:\n        return a");
        assert_eq!(hover["dedented"], "if a > 0:\n    return a");
        assert_eq!(hover["after"], "\n    return 0");
        assert_eq!(
            hover["rendered"],
            "def f(a):\n    [[if a > 0:\n        return a]]\n    return 0"
        );

        assert_eq!(frames[5]["body"]["class"], "function-call");

        let doc = &frames[6]["body"];
        assert_eq!(doc["source"].as_array().unwrap().len(), 4);
        assert_eq!(doc["annotated"][2][1]["text"], "a");
        assert_eq!(doc["annotated"][2][1]["pos"]["lineno"], 3);
        assert_eq!(doc["annotated"][0][4]["pos"], Value::Null);

        assert_eq!(frames[7]["command"], "disconnect");
        let seqs: Vec<u64> = frames.iter().map(|f| f["seq"].as_u64().unwrap()).collect();
        assert_eq!(seqs, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_failures_are_reported_not_fatal() {
        let input = [
            frame(1, "hover", Some(json!({ "line": 0, "word": 0 }))),
            frame(2, "load", Some(json!({}))),
            frame(3, "load", Some(json!({ "path": "/nonexistent/anf.txt" }))),
            frame(4, "frobnicate", None),
            frame(5, "hover", Some(json!({ "line": 0 }))),
            frame(6, "load", Some(json!({ "text": FIXTURE }))),
            frame(7, "hover", Some(json!({ "line": 0, "word": 0, "format": "pdf" }))),
        ]
        .concat();

        let frames = serve(input);
        let responses: Vec<&Value> = frames.iter().filter(|f| f["type"] == "response").collect();
        assert_eq!(responses.len(), 7);

        let failed: Vec<u64> = responses
            .iter()
            .filter(|r| r["success"] == false)
            .map(|r| r["request_seq"].as_u64().unwrap())
            .collect();
        assert_eq!(failed, [1, 2, 3, 4, 5, 7]);

        assert_eq!(responses[0]["message"], "no document loaded");
        assert!(responses[3]["message"]
            .as_str()
            .unwrap()
            .contains("unknown command"));
    }

    #[test]
    fn test_malformed_json_is_skipped() {
        let garbage = "{not json";
        let input = format!(
            "Content-Length: {}\r\n\r\n{}{}",
            garbage.len(),
            garbage,
            frame(2, "classify", Some(json!({ "text": "L3" })))
        );

        let frames = serve(input);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["body"]["class"], "block-label");
    }

    #[test]
    fn test_oversized_message_is_rejected() {
        let big = frame(1, "load", Some(json!({ "text": FIXTURE })));
        let input = format!("{big}{}", frame(2, "classify", Some(json!({ "text": "let" }))));

        let mut server = ProtocolServer::new(
            Viewer::new(plain_config()),
            Cursor::new(input.into_bytes()),
            Vec::new(),
        )
        .with_max_message_bytes(128);
        server.run().expect("server failed");
        assert!(!server.viewer().is_loaded(), "oversized load must not run");

        let frames = read_frames(&server.into_writer());
        assert_eq!(frames.len(), 2, "{frames:#?}");
        assert_eq!(frames[0]["success"], false);
        assert!(frames[0]["message"]
            .as_str()
            .unwrap()
            .contains("exceeds the limit of 128 bytes"));
        assert_eq!(frames[1]["request_seq"], 2);
        assert_eq!(frames[1]["body"]["class"], "keyword");
    }

    #[test]
    fn test_load_updates_server_state() {
        let input = frame(1, "load", Some(json!({ "text": FIXTURE })));
        let mut server = ProtocolServer::new(
            Viewer::new(plain_config()),
            Cursor::new(input.into_bytes()),
            Vec::new(),
        );
        server.run().expect("server failed");

        let viewer = server.viewer();
        assert!(viewer.is_loaded());
        assert_eq!(viewer.document().source_lines.len(), 4);
        assert_eq!(viewer.document().annotated_lines.len(), 4);
    }
}
