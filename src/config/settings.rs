use super::paths::*;
use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub input_dir: PathBuf,
    #[serde(default)]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub geoserver_url: Option<String>,
    #[serde(default)]
    pub initial_lat: f64,
    #[serde(default)]
    pub initial_lon: f64,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default)]
    pub converters: ConverterSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConverterSettings {
    #[serde(default = "default_ghostscript")]
    pub ghostscript: String,
    #[serde(default = "default_ps2pdf")]
    pub ps2pdf: String,
    #[serde(default = "default_enscript")]
    pub enscript: String,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            geoserver_url: None,
            initial_lat: 0.0,
            initial_lon: 0.0,
            port: default_port(),
            public_dir: default_public_dir(),
            log_dir: default_log_dir(),
            converters: ConverterSettings::default(),
        }
    }
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            ghostscript: default_ghostscript(),
            ps2pdf: default_ps2pdf(),
            enscript: default_enscript(),
            timeout_seconds: None,
        }
    }
}

impl ConverterSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overrides fields from variables returned by `lookup`. Unset or empty
    /// variables leave the current value untouched.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(INPUT_DIR_VAR) {
            self.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get(OUTPUT_DIR_VAR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(url) = get(GEOSERVER_URL_VAR) {
            self.geoserver_url = Some(url);
        }
        if let Some(raw) = get(INITIAL_LAT_VAR) {
            self.initial_lat = parse_var(INITIAL_LAT_VAR, &raw)?;
        }
        if let Some(raw) = get(INITIAL_LON_VAR) {
            self.initial_lon = parse_var(INITIAL_LON_VAR, &raw)?;
        }
        if let Some(raw) = get(PORT_VAR) {
            self.port = parse_var(PORT_VAR, &raw)?;
        }
        if let Some(dir) = get(PUBLIC_DIR_VAR) {
            self.public_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get(LOG_DIR_VAR) {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(bin) = get(GHOSTSCRIPT_VAR) {
            self.converters.ghostscript = bin;
        }
        if let Some(bin) = get(PS2PDF_VAR) {
            self.converters.ps2pdf = bin;
        }
        if let Some(bin) = get(ENSCRIPT_VAR) {
            self.converters.enscript = bin;
        }
        if let Some(raw) = get(TOOL_TIMEOUT_VAR) {
            self.converters.timeout_seconds = Some(parse_var(TOOL_TIMEOUT_VAR, &raw)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingVar {
                name: INPUT_DIR_VAR,
            });
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingVar {
                name: OUTPUT_DIR_VAR,
            });
        }
        if !self.initial_lat.is_finite() || !(-90.0..=90.0).contains(&self.initial_lat) {
            return Err(ConfigError::Settings(format!(
                "initial latitude {} must be within [-90, 90]",
                self.initial_lat
            )));
        }
        if !self.initial_lon.is_finite() || !(-180.0..=180.0).contains(&self.initial_lon) {
            return Err(ConfigError::Settings(format!(
                "initial longitude {} must be within [-180, 180]",
                self.initial_lon
            )));
        }
        for (field, binary) in [
            ("converters.ghostscript", &self.converters.ghostscript),
            ("converters.ps2pdf", &self.converters.ps2pdf),
            ("converters.enscript", &self.converters.enscript),
        ] {
            if binary.trim().is_empty() {
                return Err(ConfigError::Settings(format!("`{field}` must be non-empty")));
            }
        }
        if self.converters.timeout_seconds == Some(0) {
            return Err(ConfigError::Settings(
                "`converters.timeout_seconds` must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|err| ConfigError::InvalidVar {
            name,
            reason: err.to_string(),
        })
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_public_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PUBLIC_DIR)
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

fn default_ghostscript() -> String {
    "gs".to_string()
}

fn default_ps2pdf() -> String {
    "ps2pdf".to_string()
}

fn default_enscript() -> String {
    "enscript".to_string()
}
