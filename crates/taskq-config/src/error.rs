//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `ConfigLoader::load_or_default` treats this as "use defaults".
    #[error("no taskq config at {}", .0.display())]
    NotFound(PathBuf),

    /// Rejected by the validator; `field` is the dotted TOML path.
    #[error("config field `{field}` rejected: {message}")]
    InvalidValue { field: String, message: String },

    #[error("config references ${{{0}}} but it is not set")]
    EnvVarNotSet(String),

    #[error("reading taskq config: {0}")]
    Io(#[from] std::io::Error),

    #[error("taskq config is not valid TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}
