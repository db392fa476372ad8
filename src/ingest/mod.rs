use crate::shared::fs_atomic::atomic_write_file;
use crate::toolkit::{check_writable_dir, ToolkitError};
use std::path::{Component, Path, PathBuf};

/// Fixed name for drawn geometry; each input directory holds one drawing.
pub const DRAWING_FILE_NAME: &str = "drawing.geojson";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to write artifact {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize drawing for {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot ingest into {path}: {reason}")]
    DirectoryNotWritable { path: String, reason: String },
    #[error("upload file name `{0}` is not a plain file name")]
    InvalidFileName(String),
}

/// Materialises inbound payloads in the configured input directory. A path
/// is only returned once its content is fully written and synced.
#[derive(Debug, Clone)]
pub struct ArtifactIngestor {
    input_dir: PathBuf,
}

impl ArtifactIngestor {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn ingest_upload(&self, original_filename: &str, bytes: &[u8]) -> Result<PathBuf, IngestError> {
        ingest_upload(&self.input_dir, original_filename, bytes)
    }

    pub fn ingest_drawing(&self, geometry: &serde_json::Value) -> Result<PathBuf, IngestError> {
        ingest_drawing(&self.input_dir, geometry)
    }
}

/// Writes `bytes` to `base_dir/original_filename`, replacing any earlier
/// upload with that name. The name must be a single path component.
pub fn ingest_upload(
    base_dir: &Path,
    original_filename: &str,
    bytes: &[u8],
) -> Result<PathBuf, IngestError> {
    let file_name = Path::new(original_filename);
    let mut components = file_name.components();
    let single_name = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_name {
        return Err(IngestError::InvalidFileName(original_filename.to_string()));
    }
    ensure_writable(base_dir)?;
    let path = base_dir.join(file_name);
    write_artifact(&path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "upload ingested");
    Ok(path)
}

pub fn ingest_drawing(base_dir: &Path, geometry: &serde_json::Value) -> Result<PathBuf, IngestError> {
    ensure_writable(base_dir)?;
    let path = base_dir.join(DRAWING_FILE_NAME);
    let encoded = serde_json::to_vec(geometry).map_err(|source| IngestError::Serialize {
        path: path.display().to_string(),
        source,
    })?;
    write_artifact(&path, &encoded)?;
    tracing::info!(path = %path.display(), "drawing ingested");
    Ok(path)
}

fn ensure_writable(base_dir: &Path) -> Result<(), IngestError> {
    check_writable_dir(base_dir).map_err(|err| match err {
        ToolkitError::DirectoryNotWritable { path, reason } => {
            IngestError::DirectoryNotWritable { path, reason }
        }
        other => IngestError::DirectoryNotWritable {
            path: base_dir.display().to_string(),
            reason: other.to_string(),
        },
    })
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), IngestError> {
    atomic_write_file(path, bytes).map_err(|source| IngestError::Write {
        path: path.display().to_string(),
        source,
    })
}
