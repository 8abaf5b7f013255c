//! Domain types shared by every hubless crate.
//!
//! All data here is request-scoped: built at the start of one orchestration
//! pass and dropped at its end.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A normalized path string used only for equality.
///
/// Absolute, `/`-separated, without trailing separator (except at a root),
/// resolved through symlinks where possible, and case-folded on
/// case-insensitive platforms. Build one with [`crate::paths::canonicalize`];
/// never display it to users or hand it to external tools.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    pub(crate) fn from_normalized(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Maximum breadth-first search depth below the search root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDepth {
    Limited(usize),
    Unlimited,
}

impl SearchDepth {
    pub const DEFAULT: SearchDepth = SearchDepth::Limited(3);

    /// Interpret a signed depth; any negative value means unlimited.
    pub fn from_signed(depth: i64) -> Self {
        if depth < 0 {
            SearchDepth::Unlimited
        } else {
            SearchDepth::Limited(depth as usize)
        }
    }

    /// Whether children of a directory at `depth` may still be visited.
    pub fn allows_descent_from(&self, depth: usize) -> bool {
        match self {
            SearchDepth::Limited(max) => depth < *max,
            SearchDepth::Unlimited => true,
        }
    }
}

impl Default for SearchDepth {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What the caller wants done with the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DesiredAction {
    #[default]
    Launch,
    Restart,
    Quit,
    RegisterOnly,
}

impl fmt::Display for DesiredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesiredAction::Launch => write!(f, "launch"),
            DesiredAction::Restart => write!(f, "restart"),
            DesiredAction::Quit => write!(f, "quit"),
            DesiredAction::RegisterOnly => write!(f, "register"),
        }
    }
}

/// How a termination request ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationOutcome {
    /// Nothing was running against the project.
    NotFound,
    /// The process exited after the first signal.
    GracefulExit,
    /// The process only exited after a forceful signal.
    ForceKilled,
}

impl fmt::Display for TerminationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationOutcome::NotFound => write!(f, "not running"),
            TerminationOutcome::GracefulExit => write!(f, "exited cleanly"),
            TerminationOutcome::ForceKilled => write!(f, "force-killed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A project root and the editor version its manifest requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRecord {
    /// Original-case absolute path, used for display and for the editor.
    pub path: PathBuf,
    /// Equality key for `path`.
    pub canonical: CanonicalPath,
    pub required_version: String,
}

/// One user-facing editor process and the project it has open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RunningInstance {
    pub pid: u32,
    /// Equality key for the project the editor has open.
    pub bound_project_path: CanonicalPath,
    /// The project path as it appears on the command line, for display.
    pub project_path: PathBuf,
}

/// Input of a single orchestration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestrationRequest {
    /// Project given by the caller; when `None` the search below runs.
    pub explicit_project_path: Option<PathBuf>,
    pub search_root: PathBuf,
    pub search_max_depth: SearchDepth,
    pub desired_action: DesiredAction,
    /// Value for the editor's platform-target flag.
    pub platform_target: Option<String>,
    /// Appended verbatim after every generated argument.
    pub passthrough_args: Vec<String>,
    /// Favorite flag forwarded to the registry on register/launch.
    pub favorite: Option<bool>,
}

impl OrchestrationRequest {
    pub fn new(desired_action: DesiredAction, search_root: impl Into<PathBuf>) -> Self {
        Self {
            explicit_project_path: None,
            search_root: search_root.into(),
            search_max_depth: SearchDepth::DEFAULT,
            desired_action,
            platform_target: None,
            passthrough_args: Vec::new(),
            favorite: None,
        }
    }

    pub fn with_project(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_project_path = Some(path.into());
        self
    }
}

/// The externally observable outcome of one orchestration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OrchestrationResult {
    Launched { version: String },
    Focused { pid: u32 },
    Quit { outcome: TerminationOutcome },
    KilledAndLaunched { version: String },
    RegistryUpdated { version: String },
}

impl fmt::Display for OrchestrationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestrationResult::Launched { version } => write!(f, "launched editor {version}"),
            OrchestrationResult::Focused { pid } => {
                write!(f, "already running (pid {pid}), brought to front")
            }
            OrchestrationResult::Quit { outcome } => write!(f, "quit: {outcome}"),
            OrchestrationResult::KilledAndLaunched { version } => {
                write!(f, "restarted editor {version}")
            }
            OrchestrationResult::RegistryUpdated { version } => {
                write!(f, "registered project (editor {version})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_depth_is_unlimited() {
        assert_eq!(SearchDepth::from_signed(-1), SearchDepth::Unlimited);
        assert_eq!(SearchDepth::from_signed(0), SearchDepth::Limited(0));
        assert_eq!(SearchDepth::default(), SearchDepth::Limited(3));
    }

    #[test]
    fn descent_stops_at_limit() {
        let depth = SearchDepth::Limited(2);
        assert!(depth.allows_descent_from(1));
        assert!(!depth.allows_descent_from(2));
        assert!(SearchDepth::Unlimited.allows_descent_from(10_000));
    }

    #[test]
    fn result_serializes_with_tag() {
        let json = serde_json::to_value(OrchestrationResult::Quit {
            outcome: TerminationOutcome::ForceKilled,
        })
        .expect("serialize");
        assert_eq!(json["result"], "quit");
        assert_eq!(json["outcome"], "force_killed");
    }

    #[test]
    fn clean_and_forced_quit_are_distinguishable() {
        let clean = OrchestrationResult::Quit {
            outcome: TerminationOutcome::GracefulExit,
        };
        let forced = OrchestrationResult::Quit {
            outcome: TerminationOutcome::ForceKilled,
        };
        assert_ne!(clean, forced);
        assert_ne!(clean.to_string(), forced.to_string());
    }
}
