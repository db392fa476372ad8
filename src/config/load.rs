use super::{ConfigError, Settings, CONFIG_PATH_VAR};
use std::path::PathBuf;

/// Loads settings for the running process.
///
/// A YAML file named by `GEOPREP_CONFIG` is read first when present; process
/// environment variables (including anything `.env` provided) win over it.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let mut settings = match std::env::var_os(CONFIG_PATH_VAR) {
        Some(path) => Settings::from_path(&PathBuf::from(path))?,
        None => Settings::default(),
    };
    settings.apply_env_with(|name| std::env::var(name).ok())?;
    settings.validate()?;
    Ok(settings)
}
