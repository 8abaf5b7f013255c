//! `Platform` wiring tests: fake enumerators, real lock files.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use hubless_core::{canonicalize, EditorProfile, TerminationOutcome};
use hubless_process::{
    Activator, FileLockInspector, LockState, Platform, ProcessEntry, ProcessEnumerator,
    ProcessError, ProcessSignaller, TerminationMode, TerminationPolicy,
};
use rstest::rstest;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct Listing(Vec<ProcessEntry>);

impl ProcessEnumerator for Listing {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>, ProcessError> {
        Ok(self.0.clone())
    }

    fn is_alive(&self, _pid: u32) -> bool {
        false
    }
}

struct Inert;

impl ProcessSignaller for Inert {
    fn request_graceful_close(&self, _pid: u32) -> Result<(), ProcessError> {
        Ok(())
    }

    fn force_kill(&self, _pid: u32) -> Result<(), ProcessError> {
        Ok(())
    }
}

impl Activator for Inert {
    fn bring_to_foreground(&self, _pid: u32) -> Result<(), ProcessError> {
        Ok(())
    }
}

fn platform(entries: Vec<ProcessEntry>) -> Platform {
    Platform {
        profile: EditorProfile::unity(),
        enumerator: Arc::new(Listing(entries)),
        signaller: Arc::new(Inert),
        activator: Arc::new(Inert),
        lock_inspector: Arc::new(FileLockInspector),
    }
}

fn editor(pid: u32, project: &str) -> ProcessEntry {
    ProcessEntry {
        pid,
        command_line: format!(
            "/home/dev/Unity/Hub/Editor/2022.3.5f1/Editor/Unity -projectPath {project} -useHub"
        ),
    }
}

fn make_project(root: &Path) {
    let settings = root.join("ProjectSettings");
    fs::create_dir_all(&settings).expect("mkdir");
    fs::write(settings.join("ProjectVersion.txt"), "m_EditorVersion: 2022.3.5f1\n")
        .expect("write manifest");
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[rstest]
#[case("/work/Game")]
#[case("/work/Game/")]
#[case("/work/./Game")]
#[case("/work/Other/../Game")]
fn running_instance_found_for_equivalent_spellings(#[case] spelling: &str) {
    let platform = platform(vec![editor(10, "/work/Other"), editor(11, spelling)]);
    let found = platform
        .registry()
        .find_running_instance(&canonicalize("/work/Game"))
        .expect("instance");
    assert_eq!(found.pid, 11);
}

#[test]
fn different_project_is_not_matched() {
    let platform = platform(vec![editor(10, "/work/GameTwo")]);
    assert!(platform
        .registry()
        .find_running_instance(&canonicalize("/work/Game"))
        .is_none());
}

// ---------------------------------------------------------------------------
// Lock guard
// ---------------------------------------------------------------------------

#[test]
fn lock_guard_cleans_stale_marker_on_real_files() {
    let tmp = TempDir::new().expect("tempdir");
    make_project(tmp.path());
    let temp = tmp.path().join("Temp");
    fs::create_dir_all(&temp).expect("mkdir");
    fs::write(temp.join("UnityLockfile"), b"").expect("write marker");

    let guard = platform(Vec::new()).lock_guard();
    assert_eq!(guard.prepare_launch(tmp.path()).expect("prepare"), LockState::Stale);
    assert!(!temp.exists());
    assert!(tmp.path().join("ProjectSettings").exists());
}

#[test]
fn lock_guard_absent_touches_nothing() {
    let tmp = TempDir::new().expect("tempdir");
    make_project(tmp.path());
    let guard = platform(Vec::new()).lock_guard();
    assert_eq!(guard.prepare_launch(tmp.path()).expect("prepare"), LockState::Absent);
}

// ---------------------------------------------------------------------------
// Terminator
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn terminator_without_matching_instance_is_a_no_op() {
    let platform = platform(vec![editor(10, "/work/Other")]);
    let outcome = platform
        .terminator(TerminationPolicy::default())
        .terminate(&canonicalize("/work/Game"), TerminationMode::Kill)
        .await
        .expect("terminate")
        .outcome;
    assert_eq!(outcome, TerminationOutcome::NotFound);
}

#[tokio::test(start_paused = true)]
async fn terminator_reports_clean_exit_when_process_vanishes() {
    // `Listing::is_alive` is always false, so the first poll sees the exit.
    let platform = platform(vec![editor(10, "/work/Game")]);
    let outcome = platform
        .terminator(TerminationPolicy::default())
        .terminate(&canonicalize("/work/Game"), TerminationMode::Quit)
        .await
        .expect("terminate")
        .outcome;
    assert_eq!(outcome, TerminationOutcome::GracefulExit);
}

// ---------------------------------------------------------------------------
// Native
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn native_enumeration_never_panics() {
    let platform = Platform::native(EditorProfile::unity());
    let _ = platform.registry().list_running_instances();
    assert!(platform.registry().is_alive(std::process::id()));
}
