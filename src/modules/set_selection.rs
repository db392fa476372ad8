use crate::modules::geometry::{bounding_box, read_geojson};
use crate::modules::{clear_state, invalid, io_error, WorkingDirs};
use crate::shared::fs_atomic::atomic_write_file;
use crate::workflow::{
    Expect, MessageId, ModuleError, ModuleInput, Prompt, StepMachine, WorkflowModule,
};
use std::fs;
use std::path::PathBuf;

pub const NAME: &str = "set_selection";
pub const SELECTION_FILE: &str = "selection.geojson";
const PENDING_SELECTION_FILE: &str = "selection.pending.geojson";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetSelectionStep {
    Draw,
    Confirm,
}

impl StepMachine for SetSelectionStep {
    const MODULE: &'static str = NAME;
    const STEPS: &'static [Self] = &[Self::Draw, Self::Confirm];

    fn token(self) -> &'static str {
        match self {
            Self::Draw => "draw",
            Self::Confirm => "confirm",
        }
    }
}

/// Stores the area of interest. A new drawing only replaces the current
/// selection once confirmed.
#[derive(Debug, Clone)]
pub struct SetSelectionModule {
    dirs: WorkingDirs,
}

impl SetSelectionModule {
    pub fn new(dirs: WorkingDirs) -> Self {
        Self { dirs }
    }

    pub fn selection_path(&self) -> PathBuf {
        self.dirs.input_dir.join(SELECTION_FILE)
    }

    fn pending_path(&self) -> PathBuf {
        self.dirs.input_dir.join(PENDING_SELECTION_FILE)
    }

    fn ask_drawing(&self) -> Prompt {
        Prompt::ask(
            SetSelectionStep::Draw.message_id(),
            "Draw the area of interest on the map.",
            Expect::Drawing,
        )
    }

    fn receive_drawing(&self, input: &ModuleInput, id: &MessageId) -> Result<Prompt, ModuleError> {
        let path = input.file(id)?;
        let drawing = read_geojson(path)?;
        let bbox = bounding_box(&drawing)
            .ok_or_else(|| invalid(id, "the drawing contains no coordinates"))?;
        let encoded = serde_json::to_vec(&drawing).map_err(|source| ModuleError::Json {
            path: path.display().to_string(),
            source,
        })?;
        let pending = self.pending_path();
        atomic_write_file(&pending, &encoded).map_err(|e| io_error(&pending, e))?;
        Ok(Prompt::ask(
            SetSelectionStep::Confirm.message_id(),
            format!("Use the drawn area ({bbox}) as the selection?"),
            Expect::Choice {
                options: vec!["yes".to_string(), "no".to_string()],
            },
        ))
    }

    fn receive_confirmation(
        &self,
        input: &ModuleInput,
        id: &MessageId,
    ) -> Result<Prompt, ModuleError> {
        let pending = self.pending_path();
        match input.text(id)?.to_ascii_lowercase().as_str() {
            "yes" => {
                if !pending.exists() {
                    return Err(ModuleError::MissingState {
                        message_id: id.to_string(),
                        path: pending.display().to_string(),
                    });
                }
                let target = self.selection_path();
                fs::rename(&pending, &target).map_err(|e| io_error(&pending, e))?;
                tracing::info!(path = %target.display(), "selection updated");
                Ok(Prompt::finished(id.clone(), "Selection saved.")
                    .with_results(vec![SELECTION_FILE.to_string()]))
            }
            "no" => {
                clear_state(&pending)?;
                Ok(self.ask_drawing())
            }
            other => Err(invalid(id, format!("expected `yes` or `no`, got `{other}`"))),
        }
    }
}

impl WorkflowModule for SetSelectionModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn launch(&self) -> Result<Prompt, ModuleError> {
        clear_state(&self.pending_path())?;
        Ok(self.ask_drawing())
    }

    fn process(
        &self,
        input: ModuleInput,
        message_id: &MessageId,
    ) -> Result<Option<Prompt>, ModuleError> {
        let prompt = match SetSelectionStep::resolve(message_id)? {
            SetSelectionStep::Draw => self.receive_drawing(&input, message_id)?,
            SetSelectionStep::Confirm => self.receive_confirmation(&input, message_id)?,
        };
        Ok(Some(prompt))
    }
}
