//! The Hub's project registry file.
//!
//! # Storage layout
//!
//! ```text
//! <config dir>/UnityHub/projects-v1.json
//! {
//!   "schema_version": "v1",
//!   "data": {
//!     "<key>": { "path": …, "version": …, "title": …, "lastModified": …, "isFavorite": … }
//!   }
//! }
//! ```
//!
//! The file belongs to the Hub. hubless only looks records up by canonical
//! path and patches one record at a time, keeping every field it does not
//! understand. Writes are atomic (`.tmp` sibling + rename).
//!
//! # API pattern
//!
//! Free functions take the registry file path explicitly (`*_at`) so tests
//! can point them at a `TempDir`; [`HubRegistry`] wraps a resolved path and
//! implements [`RegistryStore`] for the orchestrator.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::{io_err, CoreError};
use crate::paths::canonicalize;
use crate::types::{CanonicalPath, ProjectRecord};

const SCHEMA_VERSION: &str = "v1";

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

/// Whole registry document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubDocument {
    #[serde(default = "default_schema")]
    pub schema_version: String,
    #[serde(default)]
    pub data: BTreeMap<String, HubRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for HubDocument {
    fn default() -> Self {
        Self {
            schema_version: default_schema(),
            data: BTreeMap::new(),
            extra: Map::new(),
        }
    }
}

fn default_schema() -> String {
    SCHEMA_VERSION.to_string()
}

/// One project entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubRecord {
    pub path: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub title: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub last_modified: i64,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Registry operations the orchestrator depends on.
pub trait RegistryStore: Send + Sync {
    /// Record whose `path` canonically equals `project`, if any.
    fn find(&self, project: &CanonicalPath) -> Result<Option<HubRecord>, CoreError>;

    /// Insert or update the record for `project` with a fresh timestamp.
    fn touch(
        &self,
        project: &ProjectRecord,
        favorite: Option<bool>,
    ) -> Result<HubRecord, CoreError>;
}

/// [`RegistryStore`] backed by the JSON file at `path`.
#[derive(Debug, Clone)]
pub struct HubRegistry {
    path: PathBuf,
}

impl HubRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Registry at the configured or platform default location.
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        Ok(Self::new(registry_path(config)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryStore for HubRegistry {
    fn find(&self, project: &CanonicalPath) -> Result<Option<HubRecord>, CoreError> {
        Ok(find_at(&self.path, project)?.map(|(_, record)| record))
    }

    fn touch(
        &self,
        project: &ProjectRecord,
        favorite: Option<bool>,
    ) -> Result<HubRecord, CoreError> {
        touch_at(&self.path, project, favorite, Utc::now().timestamp_millis())
    }
}

// ---------------------------------------------------------------------------
// 1. Location
// ---------------------------------------------------------------------------

/// Configured registry path, else `<config dir>/UnityHub/projects-v1.json`.
pub fn registry_path(config: &Config) -> Result<PathBuf, CoreError> {
    if let Some(path) = &config.registry_path {
        return Ok(path.clone());
    }
    dirs::config_dir()
        .map(|dir| dir.join("UnityHub").join("projects-v1.json"))
        .ok_or(CoreError::RegistryLocationUnknown)
}

// ---------------------------------------------------------------------------
// 2. Load / save
// ---------------------------------------------------------------------------

/// Load the document at `path`; a missing or empty file is an empty document.
pub fn load_at(path: &Path) -> Result<HubDocument, CoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(HubDocument::default()),
        Err(err) => return Err(io_err(path, err)),
    };
    if contents.trim().is_empty() {
        return Ok(HubDocument::default());
    }
    serde_json::from_str(&contents).map_err(|source| CoreError::RegistryParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically write `doc` to `path`, creating parent directories.
pub fn save_at(path: &Path, doc: &HubDocument) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "projects-v1.json".to_string());
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(&tmp_path, json).map_err(|e| io_err(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 3. Lookup / update
// ---------------------------------------------------------------------------

/// Key and record whose `path` canonically equals `project`.
pub fn find_at(
    path: &Path,
    project: &CanonicalPath,
) -> Result<Option<(String, HubRecord)>, CoreError> {
    let doc = load_at(path)?;
    Ok(find_in(&doc, project).map(|(key, record)| (key.to_string(), record.clone())))
}

fn find_in<'a>(doc: &'a HubDocument, project: &CanonicalPath) -> Option<(&'a str, &'a HubRecord)> {
    doc.data
        .iter()
        .find(|(_, record)| canonicalize(&record.path) == *project)
        .map(|(key, record)| (key.as_str(), record))
}

/// Update (or insert) the record for `project`, stamping `now_ms`.
///
/// An existing record keeps its key, title and unknown fields; `favorite`
/// only changes the flag when given. New records are keyed by the project's
/// original-case path and titled by its directory name.
pub fn touch_at(
    path: &Path,
    project: &ProjectRecord,
    favorite: Option<bool>,
    now_ms: i64,
) -> Result<HubRecord, CoreError> {
    let mut doc = load_at(path)?;
    let existing_key = find_in(&doc, &project.canonical).map(|(key, _)| key.to_string());

    let record = match existing_key.and_then(|key| doc.data.get_mut(&key)) {
        Some(record) => {
            record.version = project.required_version.clone();
            record.last_modified = now_ms;
            if let Some(favorite) = favorite {
                record.is_favorite = favorite;
            }
            record.clone()
        }
        None => {
            let display = project.path.display().to_string();
            let record = HubRecord {
                path: display.clone(),
                version: project.required_version.clone(),
                title: project
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| display.clone()),
                last_modified: now_ms,
                is_favorite: favorite.unwrap_or(false),
                extra: Map::new(),
            };
            doc.data.insert(display, record.clone());
            record
        }
    };

    save_at(path, &doc)?;
    Ok(record)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
