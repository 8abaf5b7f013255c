//! hubless core library: domain types, path canonicalisation, version
//! manifest, configuration and the Hub registry file.
//!
//! - [`types`]: request/result types shared by every crate
//! - [`profile`]: the immutable [`EditorProfile`] naming the target editor's files and flags
//! - [`paths`]: [`canonicalize`] / [`paths_equal`]
//! - [`manifest`]: reads the required editor version from a project
//! - [`config`]: optional `~/.hubless/config.yaml`
//! - [`registry`]: the Hub's `projects-v1.json`
//! - [`error`]: [`CoreError`]

pub mod config;
pub mod error;
pub mod manifest;
pub mod paths;
pub mod profile;
pub mod registry;
pub mod types;

pub use config::{Config, TerminationConfig};
pub use error::CoreError;
pub use paths::{canonicalize, paths_equal};
pub use profile::EditorProfile;
pub use types::{
    CanonicalPath, DesiredAction, OrchestrationRequest, OrchestrationResult, ProjectRecord,
    RunningInstance, TerminationOutcome,
};
