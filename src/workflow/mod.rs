use std::path::{Path, PathBuf};

pub mod error;
pub mod message_id;
pub mod prompt;
pub mod step;

pub use error::ModuleError;
pub use message_id::{MessageId, MESSAGE_ID_DELIMITER};
pub use prompt::{Expect, Prompt};
pub use step::StepMachine;

/// Payload handed to `process`: inline message data from the client, or
/// the path of an artifact the ingestor has already written.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleInput {
    Message(serde_json::Value),
    File(PathBuf),
}

impl ModuleInput {
    pub fn file(&self, message_id: &MessageId) -> Result<&Path, ModuleError> {
        match self {
            ModuleInput::File(path) => Ok(path.as_path()),
            ModuleInput::Message(_) => Err(unexpected(message_id, "a file")),
        }
    }

    pub fn text(&self, message_id: &MessageId) -> Result<&str, ModuleError> {
        match self {
            ModuleInput::Message(serde_json::Value::String(text)) => Ok(text.trim()),
            _ => Err(unexpected(message_id, "a text message")),
        }
    }

    /// Accepts JSON numbers and numeric strings, since form inputs arrive as
    /// text.
    pub fn number(&self, message_id: &MessageId) -> Result<f64, ModuleError> {
        match self {
            ModuleInput::Message(serde_json::Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| unexpected(message_id, "a number")),
            ModuleInput::Message(serde_json::Value::String(raw)) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| unexpected(message_id, "a number")),
            _ => Err(unexpected(message_id, "a number")),
        }
    }

    pub fn message(&self, message_id: &MessageId) -> Result<&serde_json::Value, ModuleError> {
        match self {
            ModuleInput::Message(value) => Ok(value),
            ModuleInput::File(_) => Err(unexpected(message_id, "a message")),
        }
    }
}

fn unexpected(message_id: &MessageId, expected: &'static str) -> ModuleError {
    ModuleError::UnexpectedInput {
        message_id: message_id.to_string(),
        expected,
    }
}

/// A guided data-preparation task. One instance serves every request for
/// its name, so implementations keep no per-request state in memory:
/// progress is carried by the step token and by files in the working
/// directories.
pub trait WorkflowModule: Send + Sync {
    fn name(&self) -> &'static str;

    /// First prompt of a fresh run. Safe to call repeatedly.
    fn launch(&self) -> Result<Prompt, ModuleError>;

    /// Advances by one step. `Ok(None)` means the module produced nothing,
    /// which callers treat as a failure.
    fn process(
        &self,
        input: ModuleInput,
        message_id: &MessageId,
    ) -> Result<Option<Prompt>, ModuleError>;
}
