use crate::router::ModuleRegistry;
use crate::shared::fs_atomic::atomic_write_file;
use crate::toolkit::Toolkit;
use crate::workflow::{MessageId, ModuleError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod add_location;
pub mod add_map;
pub mod geometry;
pub mod module_1;
pub mod module_2;
pub mod set_resolution;
pub mod set_selection;

pub use add_location::AddLocationModule;
pub use add_map::AddMapModule;
pub use module_1::LayerReportModule;
pub use module_2::ReportBundleModule;
pub use set_resolution::SetResolutionModule;
pub use set_selection::SetSelectionModule;

pub const MODULE_NAMES: [&str; 6] = [
    add_location::NAME,
    add_map::NAME,
    set_selection::NAME,
    set_resolution::NAME,
    module_1::NAME,
    module_2::NAME,
];

/// Directories every module works in. Input holds uploads, drawings and
/// intermediate state; output holds finished artifacts.
#[derive(Debug, Clone)]
pub struct WorkingDirs {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl WorkingDirs {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }
}

/// Registry with all six workflow modules.
pub fn default_registry(dirs: &WorkingDirs, toolkit: &Toolkit) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register(Arc::new(AddLocationModule::new(dirs.clone())));
    registry.register(Arc::new(AddMapModule::new(dirs.clone())));
    registry.register(Arc::new(SetSelectionModule::new(dirs.clone())));
    registry.register(Arc::new(SetResolutionModule::new(dirs.clone())));
    registry.register(Arc::new(LayerReportModule::new(dirs.clone(), toolkit.clone())));
    registry.register(Arc::new(ReportBundleModule::new(dirs.clone(), toolkit.clone())));
    registry
}

/// Names for locations and layers: ASCII letters, digits, `-` or `_`.
pub(crate) fn validate_name(message_id: &MessageId, raw: &str) -> Result<String, ModuleError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(invalid(message_id, "name must be non-empty"));
    }
    if !name
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(invalid(
            message_id,
            "name must use only ASCII letters, digits, '-' or '_'",
        ));
    }
    Ok(name.to_string())
}

pub(crate) fn invalid(message_id: &MessageId, reason: impl Into<String>) -> ModuleError {
    ModuleError::InvalidInput {
        message_id: message_id.to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> ModuleError {
    ModuleError::Io {
        path: path.display().to_string(),
        source,
    }
}

pub(crate) fn write_state<T: Serialize>(path: &Path, value: &T) -> Result<(), ModuleError> {
    let encoded = serde_json::to_vec_pretty(value).map_err(|source| ModuleError::Json {
        path: path.display().to_string(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    atomic_write_file(path, &encoded).map_err(|e| io_error(path, e))
}

/// Reads state an earlier step left behind; its absence means the client
/// skipped a step.
pub(crate) fn read_state<T: DeserializeOwned>(
    path: &Path,
    message_id: &MessageId,
) -> Result<T, ModuleError> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ModuleError::MissingState {
                message_id: message_id.to_string(),
                path: path.display().to_string(),
            })
        }
        Err(err) => return Err(io_error(path, err)),
    };
    serde_json::from_slice(&raw).map_err(|source| ModuleError::Json {
        path: path.display().to_string(),
        source,
    })
}

pub(crate) fn clear_state(path: &Path) -> Result<(), ModuleError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_error(path, err)),
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
