//! Running-instance enumeration.
//!
//! [`ProcessRegistry`] asks a [`ProcessEnumerator`] for a fresh snapshot on
//! every call and keeps nothing between calls. A failed snapshot is logged
//! and treated as "nothing running".

use std::sync::Arc;

use hubless_core::{paths_equal, CanonicalPath, EditorProfile, RunningInstance};

use crate::cmdline::parse_instance;
use crate::error::ProcessError;

/// Raw process listing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub command_line: String,
}

/// Platform process query.
pub trait ProcessEnumerator: Send + Sync {
    /// Every process that might be the editor, with its full command line.
    /// Implementations may pre-filter by image name.
    fn snapshot(&self) -> Result<Vec<ProcessEntry>, ProcessError>;

    /// Whether `pid` still exists.
    fn is_alive(&self, pid: u32) -> bool;
}

/// Editor instances currently running, rebuilt on each query.
#[derive(Clone)]
pub struct ProcessRegistry {
    enumerator: Arc<dyn ProcessEnumerator>,
    profile: EditorProfile,
}

impl ProcessRegistry {
    pub fn new(enumerator: Arc<dyn ProcessEnumerator>, profile: EditorProfile) -> Self {
        Self {
            enumerator,
            profile,
        }
    }

    /// User-facing editor processes and their bound projects.
    ///
    /// Helper processes and command lines without a project flag are
    /// dropped. An enumeration failure degrades to an empty list.
    pub fn list_running_instances(&self) -> Vec<RunningInstance> {
        let entries = match self.enumerator.snapshot() {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "process enumeration failed; assuming nothing is running");
                return Vec::new();
            }
        };

        let mut instances: Vec<RunningInstance> = entries
            .iter()
            .filter_map(|entry| parse_instance(entry.pid, &entry.command_line, &self.profile))
            .collect();
        instances.sort_by_key(|i| i.pid);
        instances.dedup();
        tracing::debug!(count = instances.len(), "enumerated running editors");
        instances
    }

    /// First running instance bound to `target`.
    pub fn find_running_instance(&self, target: &CanonicalPath) -> Option<RunningInstance> {
        self.list_running_instances()
            .into_iter()
            .find(|instance| paths_equal(instance.bound_project_path.as_str(), target.as_str()))
    }

    pub fn is_alive(&self, pid: u32) -> bool {
        self.enumerator.is_alive(pid)
    }
}

// ---------------------------------------------------------------------------
// Native enumerators
// ---------------------------------------------------------------------------

/// `ps`-based enumerator for macOS and Linux.
///
/// `ps` drops argument boundaries; on Linux each editor row is replaced by
/// its exact argv from `/proc/<pid>/cmdline` when that is readable.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct PsEnumerator;

#[cfg(unix)]
impl ProcessEnumerator for PsEnumerator {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>, ProcessError> {
        let stdout = crate::command::run_tool("ps", &["-axww", "-o", "pid=,command="])?;
        let mut entries = parse_ps_output(&stdout);
        if cfg!(target_os = "linux") {
            for entry in &mut entries {
                if let Some(line) = read_proc_cmdline(std::path::Path::new("/proc"), entry.pid) {
                    entry.command_line = line;
                }
            }
        }
        Ok(entries)
    }

    fn is_alive(&self, pid: u32) -> bool {
        use nix::errno::Errno;
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        let Ok(raw) = i32::try_from(pid) else {
            return false;
        };
        match kill(Pid::from_raw(raw), None) {
            Ok(()) => true,
            Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }
}

/// Exact argv of `pid` under a procfs mount, re-joined with quoting; `None`
/// when unreadable (process gone, permissions, kernel thread).
pub fn read_proc_cmdline(proc_root: &std::path::Path, pid: u32) -> Option<String> {
    let raw = std::fs::read(proc_root.join(pid.to_string()).join("cmdline")).ok()?;
    let args: Vec<String> = raw
        .split(|b| *b == 0)
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect();
    let args = match args.split_last() {
        Some((last, init)) if last.is_empty() => init,
        _ => &args[..],
    };
    (!args.is_empty()).then(|| crate::cmdline::join_args(args))
}

/// Parse `ps -o pid=,command=` rows: leading pid, then the command line.
pub fn parse_ps_output(stdout: &str) -> Vec<ProcessEntry> {
    stdout
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            let (pid, rest) = line.split_once(char::is_whitespace)?;
            Some(ProcessEntry {
                pid: pid.parse().ok()?,
                command_line: rest.trim().to_string(),
            })
        })
        .collect()
}

/// `Get-CimInstance Win32_Process` enumerator for Windows.
#[cfg(windows)]
#[derive(Debug, Clone)]
pub struct CimEnumerator {
    image_name: &'static str,
}

#[cfg(windows)]
impl CimEnumerator {
    pub fn new(profile: &EditorProfile) -> Self {
        Self {
            image_name: profile.process_image_name,
        }
    }
}

#[cfg(windows)]
impl ProcessEnumerator for CimEnumerator {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>, ProcessError> {
        let script = format!(
            "Get-CimInstance Win32_Process -Filter \"Name='{}'\" | ForEach-Object {{ \"$($_.ProcessId)`t$($_.CommandLine)\" }}",
            self.image_name
        );
        let stdout = crate::command::run_tool(
            "powershell",
            &["-NoProfile", "-NonInteractive", "-Command", &script],
        )?;
        Ok(parse_tab_output(&stdout))
    }

    fn is_alive(&self, pid: u32) -> bool {
        let filter = format!("PID eq {pid}");
        tasklist_shows_pid(
            crate::command::run_tool("tasklist", &["/FI", &filter, "/NH", "/FO", "CSV"]),
            pid,
        )
    }
}

/// Liveness from a `tasklist /FO CSV` query.
///
/// A failed query proves nothing, so the pid counts as alive and callers
/// keep waiting until their timeout instead of reporting an exit.
pub fn tasklist_shows_pid(query: Result<String, ProcessError>, pid: u32) -> bool {
    match query {
        Ok(stdout) => stdout.contains(&format!("\"{pid}\"")),
        Err(err) => {
            tracing::warn!(pid, error = %err, "liveness query failed; assuming process is alive");
            true
        }
    }
}

/// Parse `<pid>\t<command line>` rows.
pub fn parse_tab_output(stdout: &str) -> Vec<ProcessEntry> {
    stdout
        .lines()
        .filter_map(|line| {
            let (pid, rest) = line.split_once('\t')?;
            Some(ProcessEntry {
                pid: pid.trim().parse().ok()?,
                command_line: rest.trim().to_string(),
            })
        })
        .filter(|entry| !entry.command_line.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hubless_core::canonicalize;
    use std::sync::Mutex;

    struct Scripted {
        result: Mutex<Option<Result<Vec<ProcessEntry>, ProcessError>>>,
    }

    impl Scripted {
        fn ok(entries: Vec<ProcessEntry>) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(Ok(entries))),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(Err(ProcessError::ExternalTool {
                    tool: "ps".into(),
                    message: "not found".into(),
                }))),
            })
        }
    }

    impl ProcessEnumerator for Scripted {
        fn snapshot(&self) -> Result<Vec<ProcessEntry>, ProcessError> {
            self.result
                .lock()
                .expect("lock")
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        fn is_alive(&self, _pid: u32) -> bool {
            false
        }
    }

    fn entry(pid: u32, line: &str) -> ProcessEntry {
        ProcessEntry {
            pid,
            command_line: line.to_string(),
        }
    }

    const EDITOR: &str = "/opt/Unity/Hub/Editor/2022.3.5f1/Editor/Unity";

    #[test]
    fn parses_ps_rows() {
        let out = "  101 /sbin/init\n 2002 /opt/x/Editor/Unity -projectPath /p q\nbad row\n";
        let entries = parse_ps_output(out);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].pid, 2002);
        assert_eq!(entries[1].command_line, "/opt/x/Editor/Unity -projectPath /p q");
    }

    #[test]
    fn parses_tab_rows() {
        let out = "4410\t\"C:\\U\\Editor\\Unity.exe\" -projectPath \"C:\\a b\"\r\n4411\t\r\n";
        let entries = parse_tab_output(out);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pid, 4410);
    }

    #[test]
    fn tasklist_rows_and_failures() {
        let row = "\"Unity.exe\",\"4410\",\"Console\",\"1\",\"2,048,000 K\"\r\n";
        assert!(tasklist_shows_pid(Ok(row.to_string()), 4410));
        assert!(!tasklist_shows_pid(
            Ok("INFO: No tasks are running which match the specified criteria.".into()),
            4410
        ));
        let failed = Err(ProcessError::ExternalTool {
            tool: "tasklist".into(),
            message: "not found".into(),
        });
        assert!(tasklist_shows_pid(failed, 4410));
    }

    #[test]
    fn proc_cmdline_keeps_argument_boundaries() {
        let proc_root = tempfile::TempDir::new().expect("tempdir");
        let dir = proc_root.path().join("321");
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(
            dir.join("cmdline"),
            format!("{EDITOR}\0-projectPath\0/work/Game - Copy\0-useHub\0"),
        )
        .expect("write cmdline");

        let line = read_proc_cmdline(proc_root.path(), 321).expect("cmdline");
        let instance = crate::cmdline::parse_instance(321, &line, &EditorProfile::unity())
            .expect("instance");
        assert_eq!(instance.bound_project_path, canonicalize("/work/Game - Copy"));
        assert_eq!(read_proc_cmdline(proc_root.path(), 999), None);
    }

    #[test]
    fn lists_only_user_facing_editors() {
        let enumerator = Scripted::ok(vec![
            entry(1, "/usr/bin/bash"),
            entry(2, &format!("{EDITOR} -projectPath /work/Game")),
            entry(3, &format!("{EDITOR} -batchMode -name AssetImportWorker1 -projectPath /work/Game")),
            entry(4, EDITOR),
        ]);
        let registry = ProcessRegistry::new(enumerator, EditorProfile::unity());
        let instances = registry.list_running_instances();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].pid, 2);
    }

    #[test]
    fn enumeration_failure_degrades_to_empty() {
        let registry = ProcessRegistry::new(Scripted::failing(), EditorProfile::unity());
        assert!(registry.list_running_instances().is_empty());
    }

    #[test]
    fn find_matches_trailing_separator_variant() {
        let enumerator = Scripted::ok(vec![entry(
            77,
            &format!("{EDITOR} -projectPath /work/Game/"),
        )]);
        let registry = ProcessRegistry::new(enumerator, EditorProfile::unity());
        let found = registry
            .find_running_instance(&canonicalize("/work/Game"))
            .expect("instance");
        assert_eq!(found.pid, 77);
    }
}
