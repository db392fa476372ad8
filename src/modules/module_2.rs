use crate::modules::{file_name_of, invalid, WorkingDirs};
use crate::toolkit::{check_writable_dir, list_files_by_extension, list_output_artifacts, Toolkit};
use crate::workflow::{
    Expect, MessageId, ModuleError, ModuleInput, Prompt, StepMachine, WorkflowModule,
};
use serde_json::Value;
use std::path::PathBuf;

pub const NAME: &str = "module_2";
pub const BUNDLE_FILE: &str = "report_bundle.pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportBundleStep {
    Order,
}

impl StepMachine for ReportBundleStep {
    const MODULE: &'static str = NAME;
    const STEPS: &'static [Self] = &[Self::Order];

    fn token(self) -> &'static str {
        match self {
            Self::Order => "order",
        }
    }
}

/// Merges finished PDF reports into one bundle, in the order the user picks.
#[derive(Debug, Clone)]
pub struct ReportBundleModule {
    dirs: WorkingDirs,
    toolkit: Toolkit,
}

impl ReportBundleModule {
    pub fn new(dirs: WorkingDirs, toolkit: Toolkit) -> Self {
        Self { dirs, toolkit }
    }

    pub fn bundle_path(&self) -> PathBuf {
        self.dirs.output_dir.join(BUNDLE_FILE)
    }

    /// PDFs in the output directory, by file name, excluding earlier bundles.
    pub fn available_reports(&self) -> Result<Vec<(String, PathBuf)>, ModuleError> {
        let reports = list_files_by_extension("pdf", &self.dirs.output_dir)?
            .into_iter()
            .map(|path| (file_name_of(&path), path))
            .filter(|(name, _)| name != BUNDLE_FILE)
            .collect();
        Ok(reports)
    }

    fn selected_reports(
        &self,
        selection: &Value,
        id: &MessageId,
    ) -> Result<Vec<PathBuf>, ModuleError> {
        let available = self.available_reports()?;
        match selection {
            Value::String(all) if all.trim().eq_ignore_ascii_case("all") => {
                if available.is_empty() {
                    return Err(invalid(id, "there are no reports to bundle"));
                }
                Ok(available.into_iter().map(|(_, path)| path).collect())
            }
            Value::Array(names) => {
                if names.is_empty() {
                    return Err(invalid(id, "choose at least one report"));
                }
                names
                    .iter()
                    .map(|name| {
                        let name = name
                            .as_str()
                            .ok_or_else(|| invalid(id, "report names must be strings"))?;
                        available
                            .iter()
                            .find(|(candidate, _)| candidate == name)
                            .map(|(_, path)| path.clone())
                            .ok_or_else(|| invalid(id, format!("unknown report `{name}`")))
                    })
                    .collect()
            }
            _ => Err(ModuleError::UnexpectedInput {
                message_id: id.to_string(),
                expected: "a list of report names or \"all\"",
            }),
        }
    }
}

impl WorkflowModule for ReportBundleModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn launch(&self) -> Result<Prompt, ModuleError> {
        check_writable_dir(&self.dirs.output_dir)?;
        let reports = self.available_reports()?;
        if reports.is_empty() {
            return Ok(Prompt::finished(
                ReportBundleStep::Order.message_id(),
                "No reports to bundle yet.",
            ));
        }
        Ok(Prompt::ask(
            ReportBundleStep::Order.message_id(),
            "Pick the reports to bundle, in order.",
            Expect::Choice {
                options: reports.into_iter().map(|(name, _)| name).collect(),
            },
        ))
    }

    fn process(
        &self,
        input: ModuleInput,
        message_id: &MessageId,
    ) -> Result<Option<Prompt>, ModuleError> {
        match ReportBundleStep::resolve(message_id)? {
            ReportBundleStep::Order => {
                let inputs = self.selected_reports(input.message(message_id)?, message_id)?;
                check_writable_dir(&self.dirs.output_dir)?;
                let bundle = self.bundle_path();
                self.toolkit.merge_pdfs(&bundle, &inputs)?;
                tracing::info!(reports = inputs.len(), bundle = %bundle.display(), "reports bundled");
                let results = list_output_artifacts(&self.dirs.output_dir)?;
                Ok(Some(
                    Prompt::finished(
                        message_id.clone(),
                        format!("Bundled {} reports into {BUNDLE_FILE}.", inputs.len()),
                    )
                    .with_results(results),
                ))
            }
        }
    }
}
