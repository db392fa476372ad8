pub mod dispatch;
pub mod error;
pub mod registry;

pub use dispatch::Dispatcher;
pub use error::DispatchError;
pub use registry::{ModuleRegistry, ModuleSlot};
