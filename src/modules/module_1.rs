use crate::ingest::DRAWING_FILE_NAME;
use crate::modules::geometry::{bounding_box, feature_count, read_geojson};
use crate::modules::{invalid, io_error, WorkingDirs};
use crate::shared::fs_atomic::atomic_write_file;
use crate::toolkit::{
    check_writable_dir, is_default_layer, list_files_by_extension, list_output_artifacts, Toolkit,
};
use crate::workflow::{
    Expect, MessageId, ModuleError, ModuleInput, Prompt, StepMachine, WorkflowModule,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const NAME: &str = "module_1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerReportStep {
    Layer,
}

impl StepMachine for LayerReportStep {
    const MODULE: &'static str = NAME;
    const STEPS: &'static [Self] = &[Self::Layer];

    fn token(self) -> &'static str {
        match self {
            Self::Layer => "layer",
        }
    }
}

/// Writes a PDF summary of one user layer into the output directory.
#[derive(Debug, Clone)]
pub struct LayerReportModule {
    dirs: WorkingDirs,
    toolkit: Toolkit,
}

impl LayerReportModule {
    pub fn new(dirs: WorkingDirs, toolkit: Toolkit) -> Self {
        Self { dirs, toolkit }
    }

    /// User layers by name. System layers and module scratch files are
    /// left out.
    pub fn available_layers(&self) -> Result<BTreeMap<String, PathBuf>, ModuleError> {
        let mut layers = BTreeMap::new();
        for path in list_files_by_extension("geojson", &self.dirs.input_dir)? {
            let Some(name) = layer_name(&path) else {
                continue;
            };
            if is_default_layer(&name) {
                continue;
            }
            layers.entry(name).or_insert(path);
        }
        Ok(layers)
    }

    fn write_report(&self, name: &str, layer_path: &Path) -> Result<PathBuf, ModuleError> {
        let layer = read_geojson(layer_path)?;
        let extent = bounding_box(&layer)
            .map(|bbox| bbox.to_string())
            .unwrap_or_else(|| "empty".to_string());
        let text = format!(
            "Layer report: {name}\n\nSource: {}\nFeatures: {}\nExtent: {extent}\n",
            layer_path.display(),
            feature_count(&layer),
        );

        let text_path = self.dirs.output_dir.join(format!("{name}_report.txt"));
        atomic_write_file(&text_path, text.as_bytes()).map_err(|e| io_error(&text_path, e))?;
        let pdf_path = self.dirs.output_dir.join(format!("{name}_report.pdf"));
        self.toolkit.convert_text_to_pdf(&text_path, &pdf_path)?;
        Ok(pdf_path)
    }
}

fn layer_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let drawing_stem = DRAWING_FILE_NAME.trim_end_matches(".geojson");
    if stem == drawing_stem || stem.contains('.') {
        return None;
    }
    Some(stem.to_string())
}

impl WorkflowModule for LayerReportModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn launch(&self) -> Result<Prompt, ModuleError> {
        check_writable_dir(&self.dirs.output_dir)?;
        let layers = self.available_layers()?;
        if layers.is_empty() {
            return Ok(Prompt::finished(
                LayerReportStep::Layer.message_id(),
                "No layers available. Add a map first.",
            ));
        }
        Ok(Prompt::ask(
            LayerReportStep::Layer.message_id(),
            "Choose the layer to report on.",
            Expect::Choice {
                options: layers.into_keys().collect(),
            },
        ))
    }

    fn process(
        &self,
        input: ModuleInput,
        message_id: &MessageId,
    ) -> Result<Option<Prompt>, ModuleError> {
        match LayerReportStep::resolve(message_id)? {
            LayerReportStep::Layer => {
                let name = input.text(message_id)?.to_string();
                check_writable_dir(&self.dirs.output_dir)?;
                let layers = self.available_layers()?;
                let layer_path = layers
                    .get(&name)
                    .ok_or_else(|| invalid(message_id, format!("unknown layer `{name}`")))?;
                let pdf = self.write_report(&name, layer_path)?;
                tracing::info!(layer = %name, report = %pdf.display(), "layer report written");
                let results = list_output_artifacts(&self.dirs.output_dir)?;
                Ok(Some(
                    Prompt::finished(message_id.clone(), format!("Report for `{name}` ready."))
                        .with_results(results),
                ))
            }
        }
    }
}
