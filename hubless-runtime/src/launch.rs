//! Launch collaborator: editor install resolution and detached spawn.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use hubless_core::{Config, EditorProfile};

use crate::error::OrchestrateError;

/// Everything needed to start the editor against one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Original-case project path handed to the editor.
    pub project_path: PathBuf,
    pub version: String,
    pub platform_target: Option<String>,
    pub passthrough_args: Vec<String>,
}

impl LaunchSpec {
    /// Full editor argument list for this launch.
    pub fn args(&self, profile: &EditorProfile) -> Vec<String> {
        build_launch_args(
            profile,
            &self.project_path,
            self.platform_target.as_deref(),
            &self.passthrough_args,
        )
    }
}

/// Starts an editor and returns without waiting for it.
pub trait Launcher: Send + Sync {
    fn launch(&self, spec: &LaunchSpec) -> Result<(), OrchestrateError>;
}

/// `[project flag, path, (target flag, target)?, passthrough...]`.
///
/// The platform target is dropped when the passthrough arguments already
/// carry the target flag; passthrough always comes last so it can override
/// anything before it.
pub fn build_launch_args(
    profile: &EditorProfile,
    project_path: &Path,
    platform_target: Option<&str>,
    passthrough: &[String],
) -> Vec<String> {
    let mut args = vec![
        profile.project_path_flag.to_string(),
        project_path.display().to_string(),
    ];

    let overridden = passthrough
        .iter()
        .any(|arg| arg.eq_ignore_ascii_case(profile.platform_target_flag));
    match platform_target {
        Some(target) if !overridden => {
            args.push(profile.platform_target_flag.to_string());
            args.push(target.to_string());
        }
        Some(target) => {
            tracing::debug!(target, "platform target overridden by passthrough arguments");
        }
        None => {}
    }

    args.extend(passthrough.iter().cloned());
    args
}

// ---------------------------------------------------------------------------
// Native launcher
// ---------------------------------------------------------------------------

/// Spawns the installed editor binary for the required version.
#[derive(Debug, Clone)]
pub struct NativeLauncher {
    profile: EditorProfile,
    install_roots: Vec<PathBuf>,
}

impl NativeLauncher {
    pub fn new(profile: EditorProfile, install_roots: Vec<PathBuf>) -> Self {
        Self {
            profile,
            install_roots,
        }
    }

    /// Configured install roots first, then the platform's default Hub root.
    pub fn from_config(config: &Config, profile: EditorProfile) -> Self {
        let mut roots = config.editor_install_roots.clone();
        if let Some(default_root) = profile.default_install_root() {
            if !roots.contains(&default_root) {
                roots.push(default_root);
            }
        }
        Self::new(profile, roots)
    }

    pub fn install_roots(&self) -> &[PathBuf] {
        &self.install_roots
    }

    /// Executable path for `version` under every install root, in search order.
    pub fn candidates(&self, version: &str) -> Vec<PathBuf> {
        self.install_roots
            .iter()
            .map(|root| {
                self.profile
                    .executable_suffix
                    .split('/')
                    .fold(root.join(version), |acc, part| acc.join(part))
            })
            .collect()
    }

    /// First installed executable for `version`.
    pub fn resolve_executable(&self, version: &str) -> Result<PathBuf, OrchestrateError> {
        let candidates = self.candidates(version);
        match candidates.iter().find(|path| path.is_file()) {
            Some(found) => Ok(found.clone()),
            None => Err(OrchestrateError::EditorNotInstalled {
                version: version.to_string(),
                searched: candidates,
            }),
        }
    }
}

impl Launcher for NativeLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<(), OrchestrateError> {
        let program = self.resolve_executable(&spec.version)?;
        let args = spec.args(&self.profile);

        let mut command = Command::new(&program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut command);

        let child = command.spawn().map_err(|source| OrchestrateError::Launch {
            program: program.clone(),
            source,
        })?;
        tracing::info!(
            pid = child.id(),
            program = %program.display(),
            args = ?args,
            "editor started"
        );
        Ok(())
    }
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn project_flag_comes_first() {
        let args = build_launch_args(
            &EditorProfile::unity(),
            Path::new("/work/My Game"),
            None,
            &[],
        );
        assert_eq!(args, strings(&["-projectPath", "/work/My Game"]));
    }

    #[rstest]
    #[case(&[], &["-projectPath", "/p", "-buildTarget", "Android"])]
    #[case(&["-logFile", "-"], &["-projectPath", "/p", "-buildTarget", "Android", "-logFile", "-"])]
    #[case(&["-buildTarget", "iOS"], &["-projectPath", "/p", "-buildTarget", "iOS"])]
    #[case(&["-BUILDTARGET", "iOS"], &["-projectPath", "/p", "-BUILDTARGET", "iOS"])]
    fn passthrough_target_wins_over_explicit(
        #[case] passthrough: &[&str],
        #[case] expected: &[&str],
    ) {
        let args = build_launch_args(
            &EditorProfile::unity(),
            Path::new("/p"),
            Some("Android"),
            &strings(passthrough),
        );
        assert_eq!(args, strings(expected));
    }

    #[test]
    fn passthrough_may_repeat_project_flag() {
        let args = build_launch_args(
            &EditorProfile::unity(),
            Path::new("/p"),
            None,
            &strings(&["-projectPath", "/elsewhere"]),
        );
        assert_eq!(args.last().map(String::as_str), Some("/elsewhere"));
    }

    fn install(root: &Path, version: &str) -> PathBuf {
        let exe = EditorProfile::unity()
            .executable_suffix
            .split('/')
            .fold(root.join(version), |acc, part| acc.join(part));
        std::fs::create_dir_all(exe.parent().expect("parent")).expect("mkdir");
        std::fs::write(&exe, b"").expect("write exe");
        exe
    }

    #[test]
    fn resolves_first_root_with_version_installed() {
        let first = TempDir::new().expect("tempdir");
        let second = TempDir::new().expect("tempdir");
        let expected = install(second.path(), "2022.3.5f1");
        install(second.path(), "6000.0.1f1");

        let launcher = NativeLauncher::new(
            EditorProfile::unity(),
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
        );
        assert_eq!(launcher.resolve_executable("2022.3.5f1").expect("resolve"), expected);
    }

    #[test]
    fn missing_version_reports_every_candidate() {
        let root = TempDir::new().expect("tempdir");
        install(root.path(), "2021.3.0f1");
        let launcher = NativeLauncher::new(EditorProfile::unity(), vec![root.path().to_path_buf()]);
        match launcher.resolve_executable("2022.3.5f1") {
            Err(OrchestrateError::EditorNotInstalled { version, searched }) => {
                assert_eq!(version, "2022.3.5f1");
                assert_eq!(searched, launcher.candidates("2022.3.5f1"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn configured_roots_precede_default_root() {
        let config = Config {
            editor_install_roots: vec![PathBuf::from("/opt/editors")],
            ..Config::default()
        };
        let launcher = NativeLauncher::from_config(&config, EditorProfile::unity());
        assert_eq!(launcher.install_roots()[0], PathBuf::from("/opt/editors"));
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn spawns_detached_editor_with_arguments() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::{Duration, Instant};

        let root = TempDir::new().expect("tempdir");
        let out = root.path().join("args.txt");
        let exe = install(root.path(), "2022.3.5f1");
        std::fs::write(
            &exe,
            format!("#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}.part'\nmv '{0}.part' '{0}'\n", out.display()),
        )
        .expect("write script");
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).expect("chmod");

        let launcher = NativeLauncher::new(EditorProfile::unity(), vec![root.path().to_path_buf()]);
        launcher
            .launch(&LaunchSpec {
                project_path: PathBuf::from("/work/Game"),
                version: "2022.3.5f1".into(),
                platform_target: Some("Linux64".into()),
                passthrough_args: Vec::new(),
            })
            .expect("launch");

        let deadline = Instant::now() + Duration::from_secs(10);
        while !out.exists() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        let written = std::fs::read_to_string(&out).expect("script output");
        assert_eq!(written, "-projectPath\n/work/Game\n-buildTarget\nLinux64\n");
    }
}
