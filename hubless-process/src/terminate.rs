//! Editor termination with timeout and escalation.
//!
//! ```text
//! Quit:  graceful close -> poll(quit_timeout) -> GracefulExit
//!                                  | expired
//!                          force kill -> poll(force_timeout) -> ForceKilled | Timeout
//! Kill:  force kill -> poll(kill_timeout) -> ForceKilled | Timeout
//! ```
//!
//! Polling uses `tokio::time`, so tests drive the clock with paused time.

use std::sync::Arc;
use std::time::Duration;

use hubless_core::{CanonicalPath, TerminationConfig, TerminationOutcome};
use tokio::time::Instant;

use crate::error::ProcessError;
use crate::registry::ProcessRegistry;
use crate::signal::ProcessSignaller;

/// First signal sent to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationMode {
    /// Ask the editor to quit; escalate when it does not.
    Quit,
    /// Kill immediately.
    Kill,
}

/// Liveness poll interval and the bound for each wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationPolicy {
    pub poll_interval: Duration,
    pub quit_timeout: Duration,
    pub force_timeout: Duration,
    pub kill_timeout: Duration,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self::from(&TerminationConfig::default())
    }
}

impl From<&TerminationConfig> for TerminationPolicy {
    fn from(config: &TerminationConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            quit_timeout: config.quit_timeout(),
            force_timeout: config.force_timeout(),
            kill_timeout: config.kill_timeout(),
        }
    }
}

/// What one [`Terminator::terminate`] call did.
#[derive(Debug)]
pub struct Termination {
    pub outcome: TerminationOutcome,
    /// The graceful close request failed and the editor was killed instead.
    pub quit_request_error: Option<ProcessError>,
}

impl Termination {
    fn clean(outcome: TerminationOutcome) -> Self {
        Self {
            outcome,
            quit_request_error: None,
        }
    }
}

/// Stops the editor bound to a project.
#[derive(Clone)]
pub struct Terminator {
    registry: ProcessRegistry,
    signaller: Arc<dyn ProcessSignaller>,
    policy: TerminationPolicy,
}

impl Terminator {
    pub fn new(
        registry: ProcessRegistry,
        signaller: Arc<dyn ProcessSignaller>,
        policy: TerminationPolicy,
    ) -> Self {
        Self {
            registry,
            signaller,
            policy,
        }
    }

    pub fn policy(&self) -> &TerminationPolicy {
        &self.policy
    }

    /// Terminate the editor bound to `target`.
    ///
    /// Nothing running is a successful [`TerminationOutcome::NotFound`]. A
    /// process still alive after the last wait is
    /// [`ProcessError::TerminationTimeout`].
    pub async fn terminate(
        &self,
        target: &CanonicalPath,
        mode: TerminationMode,
    ) -> Result<Termination, ProcessError> {
        let Some(instance) = self.registry.find_running_instance(target) else {
            tracing::debug!(project = %target, "no running editor to terminate");
            return Ok(Termination::clean(TerminationOutcome::NotFound));
        };
        let pid = instance.pid;
        let started = Instant::now();
        tracing::info!(pid, project = %target, mode = ?mode, "terminating editor");

        match mode {
            TerminationMode::Quit => {
                let quit_request_error = match self.signaller.request_graceful_close(pid) {
                    Ok(()) => {
                        if self.wait_for_exit(pid, self.policy.quit_timeout).await {
                            tracing::info!(pid, "editor exited after quit request");
                            return Ok(Termination::clean(TerminationOutcome::GracefulExit));
                        }
                        tracing::warn!(
                            pid,
                            timeout_ms = self.policy.quit_timeout.as_millis() as u64,
                            "editor ignored quit request; escalating to kill"
                        );
                        None
                    }
                    Err(err) => {
                        tracing::warn!(pid, error = %err, "quit request failed; escalating to kill");
                        Some(err)
                    }
                };
                self.force_kill(pid)?;
                let outcome = self.finish(pid, self.policy.force_timeout, started).await?;
                Ok(Termination {
                    outcome,
                    quit_request_error,
                })
            }
            TerminationMode::Kill => {
                self.force_kill(pid)?;
                let outcome = self.finish(pid, self.policy.kill_timeout, started).await?;
                Ok(Termination::clean(outcome))
            }
        }
    }

    /// A failed kill only matters while the process is still there.
    fn force_kill(&self, pid: u32) -> Result<(), ProcessError> {
        match self.signaller.force_kill(pid) {
            Ok(()) => Ok(()),
            Err(err) if self.registry.is_alive(pid) => Err(err),
            Err(err) => {
                tracing::debug!(pid, error = %err, "kill failed but process is already gone");
                Ok(())
            }
        }
    }

    async fn finish(
        &self,
        pid: u32,
        timeout: Duration,
        started: Instant,
    ) -> Result<TerminationOutcome, ProcessError> {
        if self.wait_for_exit(pid, timeout).await {
            tracing::info!(pid, "editor killed");
            Ok(TerminationOutcome::ForceKilled)
        } else {
            Err(ProcessError::TerminationTimeout {
                pid,
                waited_ms: started.elapsed().as_millis(),
            })
        }
    }

    /// Poll until `pid` disappears or `timeout` passes.
    async fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.registry.is_alive(pid) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            tokio::time::sleep(self.policy.poll_interval.min(deadline - now)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ProcessEntry, ProcessEnumerator};
    use hubless_core::{canonicalize, EditorProfile};
    use std::sync::Mutex;

    const PID: u32 = 4242;

    /// One fake editor process whose death is scheduled by the signals it receives.
    #[derive(Default)]
    struct FakeEditor {
        running: bool,
        dies_after_quit: Option<Duration>,
        dies_after_kill: Option<Duration>,
        quit_fails: bool,
        kill_fails: bool,
        state: Mutex<FakeState>,
    }

    #[derive(Default)]
    struct FakeState {
        death: Option<Instant>,
        quits: usize,
        kills: usize,
    }

    impl FakeEditor {
        fn schedule(&self, after: Option<Duration>) {
            if let Some(after) = after {
                let mut state = self.state.lock().expect("lock");
                let at = Instant::now() + after;
                state.death = Some(state.death.map_or(at, |d| d.min(at)));
            }
        }

        fn counts(&self) -> (usize, usize) {
            let state = self.state.lock().expect("lock");
            (state.quits, state.kills)
        }
    }

    impl ProcessEnumerator for FakeEditor {
        fn snapshot(&self) -> Result<Vec<ProcessEntry>, ProcessError> {
            if !self.running {
                return Ok(Vec::new());
            }
            Ok(vec![ProcessEntry {
                pid: PID,
                command_line: "/opt/Unity/Editor/Unity -projectPath /work/Game".into(),
            }])
        }

        fn is_alive(&self, pid: u32) -> bool {
            let state = self.state.lock().expect("lock");
            pid == PID && self.running && state.death.map_or(true, |d| Instant::now() < d)
        }
    }

    impl ProcessSignaller for FakeEditor {
        fn request_graceful_close(&self, _pid: u32) -> Result<(), ProcessError> {
            self.state.lock().expect("lock").quits += 1;
            if self.quit_fails {
                return Err(crate::error::tool_err("osascript", "not authorised"));
            }
            self.schedule(self.dies_after_quit);
            Ok(())
        }

        fn force_kill(&self, _pid: u32) -> Result<(), ProcessError> {
            self.state.lock().expect("lock").kills += 1;
            if self.kill_fails {
                return Err(crate::error::tool_err("kill", "EPERM"));
            }
            self.schedule(self.dies_after_kill);
            Ok(())
        }
    }

    fn terminator(editor: &Arc<FakeEditor>) -> Terminator {
        let registry = ProcessRegistry::new(editor.clone(), EditorProfile::unity());
        Terminator::new(registry, editor.clone(), TerminationPolicy::default())
    }

    fn target() -> CanonicalPath {
        canonicalize("/work/Game")
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_running_is_not_found() {
        let editor = Arc::new(FakeEditor::default());
        let outcome = terminator(&editor)
            .terminate(&target(), TerminationMode::Quit)
            .await
            .expect("terminate")
            .outcome;
        assert_eq!(outcome, TerminationOutcome::NotFound);
        assert_eq!(editor.counts(), (0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn quit_within_timeout_is_graceful() {
        let editor = Arc::new(FakeEditor {
            running: true,
            dies_after_quit: Some(Duration::from_millis(2500)),
            ..Default::default()
        });
        let outcome = terminator(&editor)
            .terminate(&target(), TerminationMode::Quit)
            .await
            .expect("terminate")
            .outcome;
        assert_eq!(outcome, TerminationOutcome::GracefulExit);
        assert_eq!(editor.counts(), (1, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn ignored_quit_escalates_to_kill() {
        let editor = Arc::new(FakeEditor {
            running: true,
            dies_after_kill: Some(Duration::from_millis(300)),
            ..Default::default()
        });
        let started = Instant::now();
        let outcome = terminator(&editor)
            .terminate(&target(), TerminationMode::Quit)
            .await
            .expect("terminate")
            .outcome;
        assert_eq!(outcome, TerminationOutcome::ForceKilled);
        assert_eq!(editor.counts(), (1, 1));
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_quit_request_escalates_immediately() {
        let editor = Arc::new(FakeEditor {
            running: true,
            quit_fails: true,
            dies_after_kill: Some(Duration::from_millis(100)),
            ..Default::default()
        });
        let started = Instant::now();
        let termination = terminator(&editor)
            .terminate(&target(), TerminationMode::Quit)
            .await
            .expect("terminate");
        assert_eq!(termination.outcome, TerminationOutcome::ForceKilled);
        assert!(matches!(
            termination.quit_request_error,
            Some(ProcessError::ExternalTool { .. })
        ));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn unkillable_editor_times_out_after_quit_and_force_windows() {
        let editor = Arc::new(FakeEditor {
            running: true,
            ..Default::default()
        });
        let err = terminator(&editor)
            .terminate(&target(), TerminationMode::Quit)
            .await
            .unwrap_err();
        match err {
            ProcessError::TerminationTimeout { pid, waited_ms } => {
                assert_eq!(pid, PID);
                assert!(waited_ms >= 15_000, "waited {waited_ms}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn kill_mode_skips_quit_request() {
        let editor = Arc::new(FakeEditor {
            running: true,
            dies_after_kill: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let outcome = terminator(&editor)
            .terminate(&target(), TerminationMode::Kill)
            .await
            .expect("terminate")
            .outcome;
        assert_eq!(outcome, TerminationOutcome::ForceKilled);
        assert_eq!(editor.counts(), (0, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn kill_mode_times_out() {
        let editor = Arc::new(FakeEditor {
            running: true,
            ..Default::default()
        });
        let err = terminator(&editor)
            .terminate(&target(), TerminationMode::Kill)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::TerminationTimeout { .. }), "got: {err}");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_kill_against_live_process_is_fatal() {
        let editor = Arc::new(FakeEditor {
            running: true,
            kill_fails: true,
            ..Default::default()
        });
        let err = terminator(&editor)
            .terminate(&target(), TerminationMode::Kill)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::ExternalTool { .. }), "got: {err}");
    }
}
