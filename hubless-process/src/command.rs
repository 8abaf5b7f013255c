//! Thin wrapper over `std::process::Command` for system tools.

use std::process::Command;

use crate::error::{tool_err, ProcessError};

/// Run `program` with `args` and return its stdout.
///
/// A spawn failure or non-zero exit becomes [`ProcessError::ExternalTool`]
/// carrying the tool's stderr/stdout.
pub(crate) fn run_tool(program: &str, args: &[&str]) -> Result<String, ProcessError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| tool_err(program, e.to_string()))?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Err(tool_err(
        program,
        format!("exit status {}: {} {}", output.status, stdout, stderr)
            .trim()
            .to_string(),
    ))
}
