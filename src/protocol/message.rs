use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One framed message exchanged with a viewer frontend.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub seq: u64,
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(flatten)]
    pub content: MessageContent,
}

#[derive(Debug, Serialize, Deserialize)]
// Tried in order: responses and events carry fields requests lack.
#[serde(untagged)]
pub enum MessageContent {
    Response {
        request_seq: u64,
        success: bool,
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
    },
    Event {
        event: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
    },
    Request {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arguments: Option<Value>,
    },
}
