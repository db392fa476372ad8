use crate::config::ConverterSettings;
use std::path::Path;
use std::time::Duration;

pub mod layers;
pub mod pdf;
pub mod runner;
pub mod scan;

pub use layers::is_default_layer;
pub use pdf::{
    build_merge_invocation, build_ps_to_pdf_invocation, build_text_to_ps_invocation,
};
pub use runner::{run_tool, ToolInvocation, ToolOutput};
pub use scan::{check_writable_dir, list_files_by_extension, list_output_artifacts, MAX_SCAN_DEPTH};

#[derive(Debug, thiserror::Error)]
pub enum ToolkitError {
    #[error("{path} is not writable: {reason}")]
    DirectoryNotWritable { path: String, reason: String },
    #[error("converter binary missing for {tool}: {binary}")]
    MissingBinary { tool: ToolKind, binary: String },
    #[error("failed to start {tool} ({binary}): {source}")]
    Spawn {
        tool: ToolKind,
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} failed with exit code {exit_code}: {stderr}")]
    NonZeroExit {
        tool: ToolKind,
        exit_code: i32,
        stderr: String,
        command_form: String,
    },
    #[error("{tool} timed out after {timeout_ms}ms")]
    Timeout { tool: ToolKind, timeout_ms: u64 },
    #[error("{tool} requires at least one input file")]
    NoInputs { tool: ToolKind },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolkitError {
    /// True for failures of the external converter itself, as opposed to
    /// local filesystem preconditions.
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingBinary { .. }
                | Self::Spawn { .. }
                | Self::NonZeroExit { .. }
                | Self::Timeout { .. }
                | Self::NoInputs { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Ghostscript,
    Ps2Pdf,
    Enscript,
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolKind::Ghostscript => write!(f, "ghostscript"),
            ToolKind::Ps2Pdf => write!(f, "ps2pdf"),
            ToolKind::Enscript => write!(f, "enscript"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConverterBinaries {
    pub ghostscript: String,
    pub ps2pdf: String,
    pub enscript: String,
    /// `None` waits for the tool indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ConverterBinaries {
    fn default() -> Self {
        Self::from(&ConverterSettings::default())
    }
}

impl From<&ConverterSettings> for ConverterBinaries {
    fn from(settings: &ConverterSettings) -> Self {
        Self {
            ghostscript: settings.ghostscript.clone(),
            ps2pdf: settings.ps2pdf.clone(),
            enscript: settings.enscript.clone(),
            timeout: settings.timeout(),
        }
    }
}

impl ConverterBinaries {
    pub fn binary(&self, tool: ToolKind) -> &str {
        match tool {
            ToolKind::Ghostscript => &self.ghostscript,
            ToolKind::Ps2Pdf => &self.ps2pdf,
            ToolKind::Enscript => &self.enscript,
        }
    }
}

/// Blocking front end over the external converters. Cloned into every
/// module that needs it; holds no state besides binary names.
#[derive(Debug, Clone, Default)]
pub struct Toolkit {
    binaries: ConverterBinaries,
}

impl Toolkit {
    pub fn new(binaries: ConverterBinaries) -> Self {
        Self { binaries }
    }

    /// Concatenates `inputs` into `output` in the given order.
    pub fn merge_pdfs<P: AsRef<Path>>(
        &self,
        output: &Path,
        inputs: &[P],
    ) -> Result<(), ToolkitError> {
        let invocation = build_merge_invocation(&self.binaries, output, inputs)?;
        run_tool(&invocation, self.binaries.timeout).map(|_| ())
    }

    pub fn convert_ps_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ToolkitError> {
        let invocation = build_ps_to_pdf_invocation(&self.binaries, input, output);
        run_tool(&invocation, self.binaries.timeout).map(|_| ())
    }

    pub fn convert_text_to_ps(&self, input: &Path, output: &Path) -> Result<(), ToolkitError> {
        let invocation = build_text_to_ps_invocation(&self.binaries, input, output);
        run_tool(&invocation, self.binaries.timeout).map(|_| ())
    }

    /// Text to PDF via an intermediate PostScript file next to `output`.
    /// The intermediate is removed once the PDF exists.
    pub fn convert_text_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ToolkitError> {
        let ps_path = output.with_extension("ps");
        self.convert_text_to_ps(input, &ps_path)?;
        let converted = self.convert_ps_to_pdf(&ps_path, output);
        let _ = std::fs::remove_file(&ps_path);
        converted
    }
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> ToolkitError {
    ToolkitError::Io {
        path: path.display().to_string(),
        source,
    }
}
