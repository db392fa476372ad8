use crate::modules::{invalid, read_state, write_state, WorkingDirs};
use crate::workflow::{
    Expect, MessageId, ModuleError, ModuleInput, Prompt, StepMachine, WorkflowModule,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const NAME: &str = "set_resolution";
pub const RESOLUTION_FILE: &str = "resolution.json";
pub const MAX_RESOLUTION_METRES: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetResolutionStep {
    Value,
}

impl StepMachine for SetResolutionStep {
    const MODULE: &'static str = NAME;
    const STEPS: &'static [Self] = &[Self::Value];

    fn token(self) -> &'static str {
        match self {
            Self::Value => "value",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub metres: f64,
}

/// Sets the raster resolution later processing steps use.
#[derive(Debug, Clone)]
pub struct SetResolutionModule {
    dirs: WorkingDirs,
}

impl SetResolutionModule {
    pub fn new(dirs: WorkingDirs) -> Self {
        Self { dirs }
    }

    pub fn resolution_path(&self) -> PathBuf {
        self.dirs.input_dir.join(RESOLUTION_FILE)
    }

    fn current(&self) -> Option<Resolution> {
        let path = self.resolution_path();
        read_state(&path, &SetResolutionStep::Value.message_id()).ok()
    }
}

impl WorkflowModule for SetResolutionModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn launch(&self) -> Result<Prompt, ModuleError> {
        let message = match self.current() {
            Some(current) => format!(
                "Enter the resolution in metres (currently {}).",
                current.metres
            ),
            None => "Enter the resolution in metres.".to_string(),
        };
        Ok(Prompt::ask(
            SetResolutionStep::Value.message_id(),
            message,
            Expect::Number {
                unit: Some("m".to_string()),
            },
        ))
    }

    fn process(
        &self,
        input: ModuleInput,
        message_id: &MessageId,
    ) -> Result<Option<Prompt>, ModuleError> {
        match SetResolutionStep::resolve(message_id)? {
            SetResolutionStep::Value => {
                let metres = input.number(message_id)?;
                if !metres.is_finite() || metres <= 0.0 || metres > MAX_RESOLUTION_METRES {
                    return Err(invalid(
                        message_id,
                        format!(
                            "resolution must be greater than 0 and at most {MAX_RESOLUTION_METRES} m"
                        ),
                    ));
                }
                write_state(&self.resolution_path(), &Resolution { metres })?;
                Ok(Some(Prompt::finished(
                    message_id.clone(),
                    format!("Resolution set to {metres} m."),
                )))
            }
        }
    }
}
