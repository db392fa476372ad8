use crate::modules::geometry::{bounding_box, read_geojson, BoundingBox};
use crate::modules::{clear_state, invalid, read_state, validate_name, write_state, WorkingDirs};
use crate::workflow::{
    Expect, MessageId, ModuleError, ModuleInput, Prompt, StepMachine, WorkflowModule,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const NAME: &str = "add_location";
const BBOX_STATE_FILE: &str = "location_bbox.json";
const LOCATIONS_DIR: &str = "locations";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddLocationStep {
    Bbox,
    Name,
}

impl StepMachine for AddLocationStep {
    const MODULE: &'static str = NAME;
    const STEPS: &'static [Self] = &[Self::Bbox, Self::Name];

    fn token(self) -> &'static str {
        match self {
            Self::Bbox => "bbox",
            Self::Name => "name",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    pub bbox: BoundingBox,
}

/// Creates a named location from a rectangle drawn on the map.
#[derive(Debug, Clone)]
pub struct AddLocationModule {
    dirs: WorkingDirs,
}

impl AddLocationModule {
    pub fn new(dirs: WorkingDirs) -> Self {
        Self { dirs }
    }

    fn bbox_state_path(&self) -> PathBuf {
        self.dirs.input_dir.join(BBOX_STATE_FILE)
    }

    pub fn location_path(&self, name: &str) -> PathBuf {
        self.dirs
            .input_dir
            .join(LOCATIONS_DIR)
            .join(format!("{name}.json"))
    }

    fn ask_bbox(&self) -> Prompt {
        Prompt::ask(
            AddLocationStep::Bbox.message_id(),
            "Draw a rectangle on the map covering the new location.",
            Expect::Drawing,
        )
    }

    fn receive_bbox(&self, input: &ModuleInput, id: &MessageId) -> Result<Prompt, ModuleError> {
        let drawing = read_geojson(input.file(id)?)?;
        let bbox = bounding_box(&drawing)
            .ok_or_else(|| invalid(id, "the drawing contains no coordinates"))?;
        if bbox.is_degenerate() {
            return Err(invalid(id, "the drawn area has no extent"));
        }
        write_state(&self.bbox_state_path(), &bbox)?;
        Ok(Prompt::ask(
            AddLocationStep::Name.message_id(),
            format!("Area {bbox} recorded. Name the new location."),
            Expect::Text,
        ))
    }

    fn receive_name(&self, input: &ModuleInput, id: &MessageId) -> Result<Prompt, ModuleError> {
        let name = validate_name(id, input.text(id)?)?;
        let target = self.location_path(&name);
        if target.exists() {
            return Err(invalid(id, format!("location `{name}` already exists")));
        }
        let bbox: BoundingBox = read_state(&self.bbox_state_path(), id)?;
        write_state(&target, &LocationRecord {
            name: name.clone(),
            bbox,
        })?;
        clear_state(&self.bbox_state_path())?;
        tracing::info!(location = %name, "location created");
        Ok(
            Prompt::finished(id.clone(), format!("Location `{name}` created."))
                .with_results(vec![format!("{LOCATIONS_DIR}/{name}.json")]),
        )
    }
}

impl WorkflowModule for AddLocationModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn launch(&self) -> Result<Prompt, ModuleError> {
        clear_state(&self.bbox_state_path())?;
        Ok(self.ask_bbox())
    }

    fn process(
        &self,
        input: ModuleInput,
        message_id: &MessageId,
    ) -> Result<Option<Prompt>, ModuleError> {
        let prompt = match AddLocationStep::resolve(message_id)? {
            AddLocationStep::Bbox => self.receive_bbox(&input, message_id)?,
            AddLocationStep::Name => self.receive_name(&input, message_id)?,
        };
        Ok(Some(prompt))
    }
}
