use std::path::PathBuf;

use thiserror::Error;

/// Error surface for one orchestration pass.
#[derive(Debug, Error)]
pub enum OrchestrateError {
    #[error(transparent)]
    Core(#[from] hubless_core::CoreError),

    #[error(transparent)]
    Locate(#[from] hubless_locator::LocateError),

    #[error(transparent)]
    Process(#[from] hubless_process::ProcessError),

    #[error("editor {version} is not installed (searched: {})", display_paths(.searched))]
    EditorNotInstalled {
        version: String,
        searched: Vec<PathBuf>,
    },

    #[error("failed to start {program}: {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no install roots".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
