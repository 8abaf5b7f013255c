//! Error types for hubless-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from project, config and registry operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, annotated with the path being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory does not exist or is not a directory.
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    /// The version manifest is missing or unreadable.
    #[error("'{path}' is not a project: missing or unreadable {manifest}")]
    NotAProject { path: PathBuf, manifest: String },

    /// The manifest exists but carries no usable version key.
    #[error("no '{key}' entry in {path}")]
    VersionUnreadable { path: PathBuf, key: String },

    /// YAML parse error on config load: includes file path and line context.
    #[error("failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON parse error on registry load.
    #[error("failed to parse registry at {path}: {source}")]
    RegistryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (registry save path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or HUBLESS_HOME")]
    HomeNotFound,

    /// `dirs::config_dir()` returned `None` and no registry path was configured.
    #[error("cannot determine the Hub registry location; set registry_path in config")]
    RegistryLocationUnknown,
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
