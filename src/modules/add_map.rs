use crate::modules::{
    clear_state, file_name_of, invalid, io_error, read_state, validate_name, write_state,
    WorkingDirs,
};
use crate::toolkit::is_default_layer;
use crate::workflow::{
    Expect, MessageId, ModuleError, ModuleInput, Prompt, StepMachine, WorkflowModule,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const NAME: &str = "add_map";
pub const ACCEPTED_EXTENSIONS: [&str; 6] = ["geojson", "json", "gpkg", "tif", "tiff", "zip"];
const PENDING_STATE_FILE: &str = "add_map.pending";
pub const MAPS_DIR: &str = "maps";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddMapStep {
    Upload,
    Name,
}

impl StepMachine for AddMapStep {
    const MODULE: &'static str = NAME;
    const STEPS: &'static [Self] = &[Self::Upload, Self::Name];

    fn token(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingUpload {
    path: PathBuf,
    extension: String,
}

/// Adds an uploaded map file to the project as a named layer.
#[derive(Debug, Clone)]
pub struct AddMapModule {
    dirs: WorkingDirs,
}

impl AddMapModule {
    pub fn new(dirs: WorkingDirs) -> Self {
        Self { dirs }
    }

    fn pending_path(&self) -> PathBuf {
        self.dirs.input_dir.join(PENDING_STATE_FILE)
    }

    pub fn maps_dir(&self) -> PathBuf {
        self.dirs.input_dir.join(MAPS_DIR)
    }

    fn receive_upload(&self, input: &ModuleInput, id: &MessageId) -> Result<Prompt, ModuleError> {
        let path = input.file(id)?;
        let extension = accepted_extension(path).ok_or_else(|| {
            invalid(
                id,
                format!(
                    "`{}` is not a supported map file ({})",
                    file_name_of(path),
                    ACCEPTED_EXTENSIONS.join(", ")
                ),
            )
        })?;
        write_state(
            &self.pending_path(),
            &PendingUpload {
                path: path.to_path_buf(),
                extension,
            },
        )?;
        let suggestion = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Prompt::ask(
            AddMapStep::Name.message_id(),
            format!("Name the new map layer (suggested: {suggestion})."),
            Expect::Text,
        ))
    }

    fn receive_name(&self, input: &ModuleInput, id: &MessageId) -> Result<Prompt, ModuleError> {
        let name = validate_name(id, input.text(id)?)?;
        if is_default_layer(&name) {
            return Err(invalid(id, format!("`{name}` is a reserved layer name")));
        }
        let pending: PendingUpload = read_state(&self.pending_path(), id)?;
        let maps_dir = self.maps_dir();
        fs::create_dir_all(&maps_dir).map_err(|e| io_error(&maps_dir, e))?;
        let target = maps_dir.join(format!("{name}.{}", pending.extension));
        if target.exists() {
            return Err(invalid(id, format!("map layer `{name}` already exists")));
        }
        fs::rename(&pending.path, &target).map_err(|e| io_error(&pending.path, e))?;
        clear_state(&self.pending_path())?;
        tracing::info!(layer = %name, path = %target.display(), "map layer added");
        Ok(
            Prompt::finished(id.clone(), format!("Map layer `{name}` added."))
                .with_results(vec![format!("{MAPS_DIR}/{}", file_name_of(&target))]),
        )
    }
}

fn accepted_extension(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    if ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        Some(extension)
    } else {
        None
    }
}

impl WorkflowModule for AddMapModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn launch(&self) -> Result<Prompt, ModuleError> {
        clear_state(&self.pending_path())?;
        Ok(Prompt::ask(
            AddMapStep::Upload.message_id(),
            "Upload a map file.",
            Expect::Upload {
                accept: ACCEPTED_EXTENSIONS
                    .iter()
                    .map(|ext| format!(".{ext}"))
                    .collect(),
            },
        ))
    }

    fn process(
        &self,
        input: ModuleInput,
        message_id: &MessageId,
    ) -> Result<Option<Prompt>, ModuleError> {
        let prompt = match AddMapStep::resolve(message_id)? {
            AddMapStep::Upload => self.receive_upload(&input, message_id)?,
            AddMapStep::Name => self.receive_name(&input, message_id)?,
        };
        Ok(Some(prompt))
    }
}
