pub mod error;
pub mod load;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use load::load_settings;
pub use paths::*;
pub use settings::{ConverterSettings, Settings};
