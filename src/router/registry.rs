use crate::router::DispatchError;
use crate::workflow::{MessageId, WorkflowModule};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One registered module and the lock that serialises requests to it.
pub struct ModuleSlot {
    module: Arc<dyn WorkflowModule>,
    lock: Mutex<()>,
}

impl ModuleSlot {
    pub fn module(&self) -> &Arc<dyn WorkflowModule> {
        &self.module
    }

    /// The guard carries no data, so a poisoned lock is simply taken over.
    pub fn serialize(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Name to instance mapping, built once at startup and then only read.
#[derive(Default)]
pub struct ModuleRegistry {
    slots: HashMap<String, ModuleSlot>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `module` under its own name, returning any module it
    /// replaced.
    pub fn register(&mut self, module: Arc<dyn WorkflowModule>) -> Option<Arc<dyn WorkflowModule>> {
        let name = module.name().to_string();
        self.slots
            .insert(
                name,
                ModuleSlot {
                    module,
                    lock: Mutex::new(()),
                },
            )
            .map(|previous| previous.module)
    }

    pub fn slot(&self, name: &str) -> Result<&ModuleSlot, DispatchError> {
        self.slots
            .get(name)
            .ok_or_else(|| DispatchError::UnknownModule {
                name: name.to_string(),
            })
    }

    /// Exact-name lookup, as used by launch requests.
    pub fn get(&self, name: &str) -> Result<&Arc<dyn WorkflowModule>, DispatchError> {
        self.slot(name).map(ModuleSlot::module)
    }

    /// Lookup by the module part of a message id.
    pub fn resolve(&self, message_id: &MessageId) -> Result<&Arc<dyn WorkflowModule>, DispatchError> {
        self.get(message_id.module_name())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names())
            .finish()
    }
}
