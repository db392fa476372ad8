#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("missing required environment variable `{name}`")]
    MissingVar { name: &'static str },
    #[error("invalid value for `{name}`: {reason}")]
    InvalidVar { name: &'static str, reason: String },
    #[error("settings validation failed: {0}")]
    Settings(String),
}
