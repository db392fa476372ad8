use crate::toolkit::ToolkitError;

#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("module `{module}` has no step `{step}`")]
    UnknownStep { module: String, step: String },
    #[error("step `{message_id}` expects {expected}")]
    UnexpectedInput {
        message_id: String,
        expected: &'static str,
    },
    #[error("invalid input for `{message_id}`: {reason}")]
    InvalidInput { message_id: String, reason: String },
    #[error("step `{message_id}` is missing earlier state at {path}; restart the module")]
    MissingState { message_id: String, path: String },
    #[error(transparent)]
    Toolkit(#[from] ToolkitError),
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
