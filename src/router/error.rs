use crate::ingest::IngestError;
use crate::toolkit::ToolkitError;
use crate::workflow::ModuleError;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown module `{name}`")]
    UnknownModule { name: String },
    #[error("Cannot launch module: {path} is not writable ({reason})")]
    DirectoryNotWritable { path: String, reason: String },
    #[error(transparent)]
    IoWrite(#[from] IngestError),
    #[error("module `{module}` conversion failed: {source}")]
    ConversionTool {
        module: String,
        #[source]
        source: ToolkitError,
    },
    #[error("module `{module}` failed: {source}")]
    ModuleProcessing {
        module: String,
        #[source]
        source: ModuleError,
    },
    #[error("Something went wrong: `{message_id}` produced no result")]
    EmptyResult { message_id: String },
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownModule { .. } => "unknown_module",
            Self::DirectoryNotWritable { .. } => "directory_not_writable",
            Self::IoWrite(_) => "io_write_error",
            Self::ConversionTool { .. } => "conversion_tool_error",
            Self::ModuleProcessing { .. } => "module_processing_error",
            Self::EmptyResult { .. } => "empty_result",
        }
    }

    /// Sorts a module failure into the dispatch taxonomy.
    pub fn from_module(module: &str, err: ModuleError) -> Self {
        match err {
            ModuleError::Toolkit(ToolkitError::DirectoryNotWritable { path, reason }) => {
                Self::DirectoryNotWritable { path, reason }
            }
            ModuleError::Toolkit(source) if source.is_tool_failure() => Self::ConversionTool {
                module: module.to_string(),
                source,
            },
            source => Self::ModuleProcessing {
                module: module.to_string(),
                source,
            },
        }
    }
}
