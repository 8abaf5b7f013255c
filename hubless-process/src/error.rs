use std::path::PathBuf;

use thiserror::Error;

/// Error surface for process enumeration, lock handling and termination.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A system tool (process listing, automation, signalling) is missing or failed.
    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    /// Another editor session holds the project's lock marker.
    #[error(
        "project lock {path} is held by a running editor; quit or restart it instead of launching"
    )]
    LockHeld { path: PathBuf },

    /// The process survived every signal within the allotted time.
    #[error("editor process {pid} did not exit within {waited_ms} ms")]
    TerminationTimeout { pid: u32, waited_ms: u128 },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ProcessError {
    ProcessError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn tool_err(tool: impl Into<String>, message: impl Into<String>) -> ProcessError {
    ProcessError::ExternalTool {
        tool: tool.into(),
        message: message.into(),
    }
}
