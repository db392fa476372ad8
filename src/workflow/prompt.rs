use crate::workflow::MessageId;
use serde::{Deserialize, Serialize};

/// What the map client should collect before replying to a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expect {
    None,
    Text,
    Number { unit: Option<String> },
    Choice { options: Vec<String> },
    Upload { accept: Vec<String> },
    Drawing,
}

/// UI payload returned by `launch` and `process`. The router forwards it to
/// the client unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub message_id: MessageId,
    pub message: String,
    pub expect: Expect,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<String>,
    #[serde(default)]
    pub done: bool,
}

impl Prompt {
    pub fn ask(message_id: MessageId, message: impl Into<String>, expect: Expect) -> Self {
        Self {
            message_id,
            message: message.into(),
            expect,
            results: Vec::new(),
            done: false,
        }
    }

    /// Terminal prompt; the client should not reply to it.
    pub fn finished(message_id: MessageId, message: impl Into<String>) -> Self {
        Self {
            message_id,
            message: message.into(),
            expect: Expect::None,
            results: Vec::new(),
            done: true,
        }
    }

    pub fn with_results(mut self, results: Vec<String>) -> Self {
        self.results = results;
        self
    }
}
