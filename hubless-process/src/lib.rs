//! Running-editor detection, lock inspection and termination.
//!
//! Every OS-facing concern sits behind one capability trait with a native
//! implementation chosen once in [`Platform::native`]:
//!
//! | trait | native implementation |
//! |---|---|
//! | [`ProcessEnumerator`] | `ps` (unix) / `Get-CimInstance Win32_Process` (Windows) |
//! | [`ProcessSignaller`] | signals or AppleScript (unix) / `taskkill` (Windows) |
//! | [`Activator`] | AppleScript, `xdotool` or `WScript.Shell.AppActivate` |
//! | [`LockInspector`] | exclusive advisory lock attempt via `fs2` |

mod command;
pub mod cmdline;
mod error;
pub mod lock;
pub mod platform;
pub mod registry;
pub mod signal;
pub mod terminate;

pub use error::ProcessError;
pub use lock::{FileLockInspector, LockGuard, LockInspector, LockState};
pub use platform::Platform;
pub use registry::{ProcessEntry, ProcessEnumerator, ProcessRegistry};
pub use signal::{Activator, ProcessSignaller};
pub use terminate::{Termination, TerminationMode, TerminationPolicy, Terminator};
