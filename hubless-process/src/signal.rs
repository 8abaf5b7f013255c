//! Signalling and window activation capabilities.
//!
//! Graceful close asks the editor to run its own shutdown (save prompts,
//! asset database flush). Forceful kill does not. Activation only raises
//! an existing window.

use crate::error::ProcessError;

/// Termination signals for one platform.
pub trait ProcessSignaller: Send + Sync {
    /// Ask the process to close itself as if the user quit it.
    fn request_graceful_close(&self, pid: u32) -> Result<(), ProcessError>;

    /// Terminate the process immediately.
    fn force_kill(&self, pid: u32) -> Result<(), ProcessError>;
}

/// Window activation for one platform.
pub trait Activator: Send + Sync {
    fn bring_to_foreground(&self, pid: u32) -> Result<(), ProcessError>;
}

/// Native [`ProcessSignaller`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSignaller;

/// Native [`Activator`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeActivator;

// ---------------------------------------------------------------------------
// macOS
// ---------------------------------------------------------------------------

#[cfg(target_os = "macos")]
impl ProcessSignaller for NativeSignaller {
    fn request_graceful_close(&self, pid: u32) -> Result<(), ProcessError> {
        let focus = format!(
            "tell application \"System Events\" to set frontmost of (first process whose unix id is {pid}) to true"
        );
        let quit = format!(
            "tell application \"System Events\" to tell (first process whose unix id is {pid}) to keystroke \"q\" using command down"
        );
        tracing::debug!(pid, "sending Cmd-Q via System Events");
        crate::command::run_tool("osascript", &["-e", &focus, "-e", &quit]).map(|_| ())
    }

    fn force_kill(&self, pid: u32) -> Result<(), ProcessError> {
        unix::send(pid, nix::sys::signal::Signal::SIGKILL)
    }
}

#[cfg(target_os = "macos")]
impl Activator for NativeActivator {
    fn bring_to_foreground(&self, pid: u32) -> Result<(), ProcessError> {
        let script = format!(
            "tell application \"System Events\" to set frontmost of (first process whose unix id is {pid}) to true"
        );
        crate::command::run_tool("osascript", &["-e", &script]).map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Other unix
// ---------------------------------------------------------------------------

#[cfg(all(unix, not(target_os = "macos")))]
impl ProcessSignaller for NativeSignaller {
    fn request_graceful_close(&self, pid: u32) -> Result<(), ProcessError> {
        unix::send(pid, nix::sys::signal::Signal::SIGTERM)
    }

    fn force_kill(&self, pid: u32) -> Result<(), ProcessError> {
        unix::send(pid, nix::sys::signal::Signal::SIGKILL)
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
impl Activator for NativeActivator {
    fn bring_to_foreground(&self, pid: u32) -> Result<(), ProcessError> {
        let pid = pid.to_string();
        crate::command::run_tool(
            "xdotool",
            &["search", "--onlyvisible", "--pid", &pid, "windowactivate"],
        )
        .map(|_| ())
    }
}

#[cfg(unix)]
mod unix {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    use crate::error::{tool_err, ProcessError};

    /// Send `signal`; a process that is already gone counts as success.
    pub(super) fn send(pid: u32, signal: Signal) -> Result<(), ProcessError> {
        let raw = i32::try_from(pid).map_err(|_| tool_err("kill", format!("invalid pid {pid}")))?;
        match kill(Pid::from_raw(raw), signal) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(tool_err("kill", format!("{signal} to {pid}: {errno}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

#[cfg(windows)]
impl ProcessSignaller for NativeSignaller {
    fn request_graceful_close(&self, pid: u32) -> Result<(), ProcessError> {
        // taskkill without /F posts WM_CLOSE to the process's windows.
        let pid = pid.to_string();
        crate::command::run_tool("taskkill", &["/PID", &pid]).map(|_| ())
    }

    fn force_kill(&self, pid: u32) -> Result<(), ProcessError> {
        let pid = pid.to_string();
        crate::command::run_tool("taskkill", &["/F", "/PID", &pid]).map(|_| ())
    }
}

#[cfg(windows)]
impl Activator for NativeActivator {
    fn bring_to_foreground(&self, pid: u32) -> Result<(), ProcessError> {
        let script = format!("(New-Object -ComObject WScript.Shell).AppActivate({pid})");
        let stdout = crate::command::run_tool(
            "powershell",
            &["-NoProfile", "-NonInteractive", "-Command", &script],
        )?;
        if stdout.trim().eq_ignore_ascii_case("true") {
            Ok(())
        } else {
            Err(crate::error::tool_err(
                "AppActivate",
                format!("no window found for pid {pid}"),
            ))
        }
    }
}
