use serde::{Deserialize, Serialize};

pub const MESSAGE_ID_DELIMITER: char = '.';

/// `<moduleName>.<stepToken>` address. Only the first delimiter is
/// significant; the step token belongs to the module and is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn parse(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn new(module_name: &str, step_token: &str) -> Self {
        Self(format!("{module_name}{MESSAGE_ID_DELIMITER}{step_token}"))
    }

    pub fn module_name(&self) -> &str {
        self.split().0
    }

    /// Empty when the identifier carries no delimiter.
    pub fn step_token(&self) -> &str {
        self.split().1
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn split(&self) -> (&str, &str) {
        self.0
            .split_once(MESSAGE_ID_DELIMITER)
            .unwrap_or((self.0.as_str(), ""))
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}
