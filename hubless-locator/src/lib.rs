//! Project discovery for `hubless-locator`.
//!
//! `locate(root, depth, profile)` walks the tree under `root` breadth-first
//! and returns the first directory containing the profile's version
//! manifest. Children are visited in name order, so at equal depth the
//! lexicographically earliest project wins, and a shallower project always
//! beats a deeper one.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use hubless_core::{
    canonicalize, manifest::is_project_root, types::SearchDepth, CanonicalPath, EditorProfile,
};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A project root found by [`locate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedProject {
    /// Original-case path as encountered while walking.
    pub path: PathBuf,
    pub canonical: CanonicalPath,
    /// Distance from the search root (root itself is 0).
    pub depth: usize,
}

/// Errors from project discovery.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("no project found under '{root}' (max depth {depth})")]
    ProjectNotFound { root: PathBuf, depth: String },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Find the nearest project root under `root`.
///
/// Unreadable directories contribute no children, deny-listed directory
/// names are never entered, and a directory reached twice (symlink cycles,
/// aliases) is only visited once.
pub fn locate(
    root: &Path,
    max_depth: SearchDepth,
    profile: &EditorProfile,
) -> Result<LocatedProject, LocateError> {
    let mut visited: HashSet<CanonicalPath> = HashSet::new();
    let mut frontier: VecDeque<(PathBuf, usize)> = VecDeque::new();

    visited.insert(canonicalize(root));
    frontier.push_back((root.to_path_buf(), 0));

    while let Some((dir, depth)) = frontier.pop_front() {
        if is_project_root(&dir, profile) {
            tracing::debug!(path = %dir.display(), depth, "found project root");
            return Ok(LocatedProject {
                canonical: canonicalize(&dir),
                path: dir,
                depth,
            });
        }

        if !max_depth.allows_descent_from(depth) {
            continue;
        }

        for child in child_dirs(&dir, profile) {
            if visited.insert(canonicalize(&child)) {
                frontier.push_back((child, depth + 1));
            }
        }
    }

    Err(LocateError::ProjectNotFound {
        root: root.to_path_buf(),
        depth: match max_depth {
            SearchDepth::Limited(n) => n.to_string(),
            SearchDepth::Unlimited => "unlimited".to_string(),
        },
    })
}

// ---------------------------------------------------------------------------
// Utilities
// ---------------------------------------------------------------------------

/// Subdirectories of `dir` sorted by name, minus deny-listed names and
/// broken links. An unreadable `dir` yields nothing.
fn child_dirs(dir: &Path, profile: &EditorProfile) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(path = %dir.display(), error = %err, "skipping unreadable directory");
            return Vec::new();
        }
    };

    let mut children: Vec<(std::ffi::OsString, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            !profile.is_denied_dir(&name.to_string_lossy())
        })
        .filter(|e| is_dir_following_links(&e.path()))
        .map(|e| (e.file_name(), e.path()))
        .collect();
    children.sort_by(|a, b| a.0.cmp(&b.0));
    children.into_iter().map(|(_, path)| path).collect()
}

/// `fs::metadata` follows symlinks; a dangling link errors and is skipped.
fn is_dir_following_links(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
