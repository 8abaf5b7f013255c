//! One launch / restart / quit / register pass.
//!
//! ```text
//! resolve project ─┬─ RegisterOnly ─> registry touch ─> RegistryUpdated
//!                  ├─ Quit ─────────> terminate(quit) ─> Quit
//!                  ├─ Restart ──────> terminate(kill) ─┐
//!                  └─ Launch ─> running? ─ yes ─> focus ─> Focused
//!                                 │ no                  │
//!                                 └──────> lock guard <─┘ ─> launch ─> registry touch
//! ```
//!
//! Each step either completes, completes with a [`Warning`] that is logged
//! and collected in the report, or fails the whole pass.

use std::sync::Arc;

use hubless_core::{
    manifest::read_project, registry::RegistryStore, DesiredAction, OrchestrationRequest,
    OrchestrationResult, ProjectRecord, TerminationOutcome,
};
use hubless_locator::locate;
use hubless_process::{LockState, Platform, TerminationMode, TerminationPolicy};
use serde::Serialize;

use crate::error::OrchestrateError;
use crate::launch::{LaunchSpec, Launcher};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Best-effort steps whose failure never fails the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Focus,
    /// The graceful close request failed; the editor was killed instead.
    QuitRequest,
    RegistryTouch,
}

/// A swallowed failure from a best-effort step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub step: Step,
    pub message: String,
}

/// Result of one best-effort step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Warning(Warning),
}

impl StepOutcome {
    fn warn(step: Step, message: impl Into<String>) -> Self {
        let warning = Warning {
            step,
            message: message.into(),
        };
        tracing::warn!(step = ?warning.step, message = %warning.message, "best-effort step failed");
        StepOutcome::Warning(warning)
    }

    fn record(self, warnings: &mut Vec<Warning>) {
        if let StepOutcome::Warning(warning) = self {
            warnings.push(warning);
        }
    }
}

/// Everything a caller learns from one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrchestrationReport {
    pub project: ProjectRecord,
    pub result: OrchestrationResult,
    pub warnings: Vec<Warning>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Sequences locator, process registry, lock guard, terminator and launcher.
#[derive(Clone)]
pub struct Orchestrator {
    platform: Platform,
    launcher: Arc<dyn Launcher>,
    registry: Arc<dyn RegistryStore>,
    policy: TerminationPolicy,
}

impl Orchestrator {
    pub fn new(
        platform: Platform,
        launcher: Arc<dyn Launcher>,
        registry: Arc<dyn RegistryStore>,
        policy: TerminationPolicy,
    ) -> Self {
        Self {
            platform,
            launcher,
            registry,
            policy,
        }
    }

    /// The explicit project, or the nearest one under the search root, with
    /// its required version.
    pub fn resolve_project(
        &self,
        request: &OrchestrationRequest,
    ) -> Result<ProjectRecord, OrchestrateError> {
        let profile = &self.platform.profile;
        let project = match &request.explicit_project_path {
            Some(path) => read_project(path, profile)?,
            None => {
                let found = locate(&request.search_root, request.search_max_depth, profile)?;
                tracing::debug!(path = %found.path.display(), depth = found.depth, "located project");
                read_project(&found.path, profile)?
            }
        };
        tracing::info!(
            path = %project.path.display(),
            version = %project.required_version,
            "resolved project"
        );
        Ok(project)
    }

    /// Run one full pass for `request`.
    pub async fn run(
        &self,
        request: &OrchestrationRequest,
    ) -> Result<OrchestrationReport, OrchestrateError> {
        let project = self.resolve_project(request)?;
        let mut warnings = Vec::new();
        let version = project.required_version.clone();

        let result = match request.desired_action {
            DesiredAction::RegisterOnly => {
                let record = self.registry.touch(&project, request.favorite)?;
                tracing::info!(title = %record.title, "registry updated");
                OrchestrationResult::RegistryUpdated { version }
            }
            DesiredAction::Quit => {
                let termination = self
                    .platform
                    .terminator(self.policy)
                    .terminate(&project.canonical, TerminationMode::Quit)
                    .await?;
                if let Some(err) = termination.quit_request_error {
                    StepOutcome::warn(Step::QuitRequest, format!("quit request failed: {err}"))
                        .record(&mut warnings);
                }
                OrchestrationResult::Quit {
                    outcome: termination.outcome,
                }
            }
            DesiredAction::Restart => {
                let outcome = self
                    .platform
                    .terminator(self.policy)
                    .terminate(&project.canonical, TerminationMode::Kill)
                    .await?
                    .outcome;
                if outcome == TerminationOutcome::NotFound {
                    tracing::info!("nothing to stop before restart");
                }
                self.launch(&project, request, &mut warnings)?;
                OrchestrationResult::KilledAndLaunched { version }
            }
            DesiredAction::Launch => {
                match self
                    .platform
                    .registry()
                    .find_running_instance(&project.canonical)
                {
                    Some(instance) => {
                        tracing::info!(pid = instance.pid, "editor already running for project");
                        self.focus(instance.pid).record(&mut warnings);
                        OrchestrationResult::Focused { pid: instance.pid }
                    }
                    None => {
                        self.launch(&project, request, &mut warnings)?;
                        OrchestrationResult::Launched { version }
                    }
                }
            }
        };

        Ok(OrchestrationReport {
            project,
            result,
            warnings,
        })
    }

    /// Lock check, launch, registry touch.
    fn launch(
        &self,
        project: &ProjectRecord,
        request: &OrchestrationRequest,
        warnings: &mut Vec<Warning>,
    ) -> Result<(), OrchestrateError> {
        // A Held lock here means the editor started after the process check
        // or is invisible to enumeration; either way launching is refused.
        let state = self.platform.lock_guard().prepare_launch(&project.path)?;
        if state == LockState::Stale {
            tracing::info!(path = %project.path.display(), "cleared stale lock");
        }

        self.launcher.launch(&LaunchSpec {
            project_path: project.path.clone(),
            version: project.required_version.clone(),
            platform_target: request.platform_target.clone(),
            passthrough_args: request.passthrough_args.clone(),
        })?;

        self.touch_registry(project, request.favorite).record(warnings);
        Ok(())
    }

    fn focus(&self, pid: u32) -> StepOutcome {
        match self.platform.activator.bring_to_foreground(pid) {
            Ok(()) => StepOutcome::Completed,
            Err(err) => StepOutcome::warn(Step::Focus, format!("could not focus pid {pid}: {err}")),
        }
    }

    fn touch_registry(&self, project: &ProjectRecord, favorite: Option<bool>) -> StepOutcome {
        match self.registry.touch(project, favorite) {
            Ok(_) => StepOutcome::Completed,
            Err(err) => StepOutcome::warn(Step::RegistryTouch, err.to_string()),
        }
    }
}
