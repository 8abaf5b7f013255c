//! The target editor's on-disk and command-line conventions.
//!
//! Every component receives an [`EditorProfile`] at construction instead of
//! reading module-level constants, so tests can hand in a variant.

use std::path::PathBuf;

/// Fixed names, flags and patterns describing one editor product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorProfile {
    /// Manifest location relative to the project root, `/`-separated.
    pub manifest_path: &'static str,
    /// `key: value` key in the manifest holding the required version.
    pub version_key: &'static str,
    /// Scratch directory (relative to the project root) holding the lock marker.
    pub scratch_dir: &'static str,
    /// Lock marker file name inside [`Self::scratch_dir`].
    pub lock_marker: &'static str,
    /// Command-line flag carrying the bound project path.
    pub project_path_flag: &'static str,
    /// Command-line flag selecting the platform target.
    pub platform_target_flag: &'static str,
    /// Lower-case, `/`-separated tails identifying the editor executable in a command line.
    pub executable_patterns: &'static [&'static str],
    /// Lower-case argument markers of helper processes sharing the editor binary.
    pub auxiliary_markers: &'static [&'static str],
    /// Directory names (compared case-insensitively) never descended into while searching.
    pub search_deny_list: &'static [&'static str],
    /// Image name used by process queries that filter by name (Windows).
    pub process_image_name: &'static str,
    /// Editor executable relative to a `<install root>/<version>/` directory.
    pub executable_suffix: &'static str,
}

impl EditorProfile {
    /// The Unity editor as installed by Unity Hub.
    pub const fn unity() -> Self {
        Self {
            manifest_path: "ProjectSettings/ProjectVersion.txt",
            version_key: "m_EditorVersion",
            scratch_dir: "Temp",
            lock_marker: "UnityLockfile",
            project_path_flag: "-projectPath",
            platform_target_flag: "-buildTarget",
            executable_patterns: &[
                "unity.app/contents/macos/unity",
                "/editor/unity.exe",
                "/editor/unity",
            ],
            auxiliary_markers: &["assetimportworker", "-batchmode"],
            search_deny_list: &[
                ".git",
                ".hg",
                ".svn",
                ".idea",
                ".vs",
                ".vscode",
                "library",
                "logs",
                "obj",
                "temp",
                "build",
                "builds",
                "usersettings",
                "node_modules",
            ],
            process_image_name: "Unity.exe",
            executable_suffix: executable_suffix(),
        }
    }

    /// Absolute path of the version manifest under `project_root`.
    pub fn manifest_file(&self, project_root: &std::path::Path) -> PathBuf {
        join_relative(project_root, self.manifest_path)
    }

    /// Absolute path of the scratch directory under `project_root`.
    pub fn scratch_dir_path(&self, project_root: &std::path::Path) -> PathBuf {
        project_root.join(self.scratch_dir)
    }

    /// Absolute path of the lock marker under `project_root`.
    pub fn lock_marker_path(&self, project_root: &std::path::Path) -> PathBuf {
        self.scratch_dir_path(project_root).join(self.lock_marker)
    }

    /// Whether `name` is on the search deny-list.
    pub fn is_denied_dir(&self, name: &str) -> bool {
        self.search_deny_list
            .iter()
            .any(|denied| denied.eq_ignore_ascii_case(name))
    }

    /// Default Hub install root for this platform, if one can be determined.
    pub fn default_install_root(&self) -> Option<PathBuf> {
        default_install_root()
    }
}

impl Default for EditorProfile {
    fn default() -> Self {
        Self::unity()
    }
}

fn join_relative(root: &std::path::Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}

#[cfg(target_os = "macos")]
const fn executable_suffix() -> &'static str {
    "Unity.app/Contents/MacOS/Unity"
}

#[cfg(windows)]
const fn executable_suffix() -> &'static str {
    "Editor/Unity.exe"
}

#[cfg(not(any(target_os = "macos", windows)))]
const fn executable_suffix() -> &'static str {
    "Editor/Unity"
}

#[cfg(target_os = "macos")]
fn default_install_root() -> Option<PathBuf> {
    Some(PathBuf::from("/Applications/Unity/Hub/Editor"))
}

#[cfg(windows)]
fn default_install_root() -> Option<PathBuf> {
    Some(PathBuf::from(r"C:\Program Files\Unity\Hub\Editor"))
}

#[cfg(not(any(target_os = "macos", windows)))]
fn default_install_root() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("Unity").join("Hub").join("Editor"))
}
