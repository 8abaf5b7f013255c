//! Version manifest reading.
//!
//! A project root is any directory containing the profile's manifest file.
//! The manifest is a `key: value` text file; the profile's version key names
//! the editor version the project requires. It is re-read on every pass.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{io_err, CoreError};
use crate::paths::{absolute_original, canonicalize};
use crate::profile::EditorProfile;
use crate::types::ProjectRecord;

/// Whether `dir` contains the version manifest.
pub fn is_project_root(dir: &Path, profile: &EditorProfile) -> bool {
    profile.manifest_file(dir).is_file()
}

/// Read the project at `dir`.
///
/// Returns `NotADirectory` if `dir` is not a directory, `NotAProject` when
/// the manifest is missing or unreadable, and `VersionUnreadable` when it
/// lacks a non-empty version entry.
pub fn read_project(dir: &Path, profile: &EditorProfile) -> Result<ProjectRecord, CoreError> {
    let path = absolute_original(dir);
    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(CoreError::NotADirectory { path }),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(CoreError::NotADirectory { path })
        }
        Err(err) => return Err(io_err(&path, err)),
    }

    let manifest = profile.manifest_file(&path);
    let contents = std::fs::read_to_string(&manifest).map_err(|_| CoreError::NotAProject {
        path: path.clone(),
        manifest: profile.manifest_path.to_string(),
    })?;

    let required_version =
        parse_version(&contents, profile.version_key).ok_or_else(|| {
            CoreError::VersionUnreadable {
                path: manifest.clone(),
                key: profile.version_key.to_string(),
            }
        })?;

    Ok(ProjectRecord {
        canonical: canonicalize(&path),
        path,
        required_version,
    })
}

/// Value of the first `key: value` line whose key is exactly `key`.
pub fn parse_version(contents: &str, key: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        if k.trim() != key {
            return None;
        }
        let value = v.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}
