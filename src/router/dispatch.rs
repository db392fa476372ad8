use crate::ingest::ArtifactIngestor;
use crate::router::{DispatchError, ModuleRegistry, ModuleSlot};
use crate::workflow::{MessageId, ModuleInput, Prompt};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Routes requests to registered modules. Every call is synchronous and
/// holds the target module's lock until the module returns.
///
/// Uploads and drawings share the input directory (every drawing lands in
/// the same file), so those two routes also hold the ingest lock from the
/// write until `process` returns. Lock order is module slot, then ingest.
#[derive(Debug)]
pub struct Dispatcher {
    registry: ModuleRegistry,
    ingestor: ArtifactIngestor,
    ingest_lock: Mutex<()>,
}

impl Dispatcher {
    pub fn new(registry: ModuleRegistry, ingestor: ArtifactIngestor) -> Self {
        Self {
            registry,
            ingestor,
            ingest_lock: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn launch(&self, name: &str) -> Result<Prompt, DispatchError> {
        let slot = self.registry.slot(name).inspect_err(log_routing_failure)?;
        let _guard = slot.serialize();
        tracing::info!(module = name, "launching module");
        slot.module()
            .launch()
            .map_err(|err| module_failure(name, err))
    }

    pub fn dispatch_message(
        &self,
        message_id: &MessageId,
        payload: serde_json::Value,
    ) -> Result<Prompt, DispatchError> {
        let slot = self.resolve(message_id)?;
        let _guard = slot.serialize();
        run_process(slot, ModuleInput::Message(payload), message_id)
    }

    pub fn dispatch_file(
        &self,
        message_id: &MessageId,
        artifact_path: PathBuf,
    ) -> Result<Prompt, DispatchError> {
        let slot = self.resolve(message_id)?;
        let _guard = slot.serialize();
        run_process(slot, ModuleInput::File(artifact_path), message_id)
    }

    /// Writes the upload into the input directory, then hands its path to
    /// the module.
    pub fn dispatch_upload(
        &self,
        message_id: &MessageId,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<Prompt, DispatchError> {
        let slot = self.resolve(message_id)?;
        let _guard = slot.serialize();
        let _ingest = self.ingest_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let path = self.ingestor.ingest_upload(original_filename, bytes)?;
        run_process(slot, ModuleInput::File(path), message_id)
    }

    pub fn dispatch_drawing(
        &self,
        message_id: &MessageId,
        geometry: &serde_json::Value,
    ) -> Result<Prompt, DispatchError> {
        let slot = self.resolve(message_id)?;
        let _guard = slot.serialize();
        let _ingest = self.ingest_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let path = self.ingestor.ingest_drawing(geometry)?;
        run_process(slot, ModuleInput::File(path), message_id)
    }

    fn resolve(&self, message_id: &MessageId) -> Result<&ModuleSlot, DispatchError> {
        self.registry
            .slot(message_id.module_name())
            .inspect_err(|err| {
                tracing::warn!(message_id = %message_id, error = %err, "cannot route message");
            })
    }
}

fn run_process(
    slot: &ModuleSlot,
    input: ModuleInput,
    message_id: &MessageId,
) -> Result<Prompt, DispatchError> {
    let module = slot.module();
    tracing::info!(message_id = %message_id, module = module.name(), "dispatching");
    match module.process(input, message_id) {
        Ok(Some(prompt)) => Ok(prompt),
        Ok(None) => {
            tracing::warn!(message_id = %message_id, "module returned no result");
            Err(DispatchError::EmptyResult {
                message_id: message_id.to_string(),
            })
        }
        Err(err) => Err(module_failure(module.name(), err)),
    }
}

fn module_failure(module: &str, err: crate::workflow::ModuleError) -> DispatchError {
    let err = DispatchError::from_module(module, err);
    tracing::warn!(module, code = err.code(), error = %err, "module failed");
    err
}

fn log_routing_failure(err: &DispatchError) {
    tracing::warn!(error = %err, "cannot route launch");
}
