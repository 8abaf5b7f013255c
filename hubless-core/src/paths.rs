//! Path canonicalisation for equality comparisons.
//!
//! [`paths_equal`] is the only comparison used when matching a running editor,
//! a registry record or a search result against the caller's project. Every
//! spelling of the same directory (case on case-insensitive platforms, `\`
//! versus `/`, trailing separators, `.`/`..` segments, symlinks) must reduce
//! to one [`CanonicalPath`].

use std::path::{Component, Path, PathBuf};

use crate::types::CanonicalPath;

/// Whether letter case distinguishes paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseRule {
    Sensitive,
    Insensitive,
}

/// Case rule of the platform this binary was built for.
#[cfg(any(windows, target_os = "macos"))]
pub const PLATFORM_CASE_RULE: CaseRule = CaseRule::Insensitive;
#[cfg(not(any(windows, target_os = "macos")))]
pub const PLATFORM_CASE_RULE: CaseRule = CaseRule::Sensitive;

/// Canonicalize `path` under the platform's case rule.
pub fn canonicalize(path: impl AsRef<Path>) -> CanonicalPath {
    canonicalize_with(path, PLATFORM_CASE_RULE)
}

/// Canonicalize `path` under an explicit case rule.
///
/// Pure apart from reading the filesystem to resolve symlinks. The longest
/// existing prefix is resolved on disk first, so `link/..` means the link
/// target's parent; components past it are normalized lexically.
pub fn canonicalize_with(path: impl AsRef<Path>, case: CaseRule) -> CanonicalPath {
    let absolute = absolutize(&fold_separators(&path.as_ref().to_string_lossy()));
    let resolved =
        resolve_existing_prefix(&absolute).unwrap_or_else(|| normalize_lexically(&absolute));
    let folded = match case {
        CaseRule::Sensitive => resolved,
        CaseRule::Insensitive => resolved.to_lowercase(),
    };
    CanonicalPath::from_normalized(folded)
}

/// `canonicalize(a) == canonicalize(b)`.
pub fn paths_equal(a: impl AsRef<Path>, b: impl AsRef<Path>) -> bool {
    canonicalize(a) == canonicalize(b)
}

/// Absolute, `.`/`..`-free form of `path` keeping the caller's casing.
///
/// This is the spelling handed to the editor and shown to users.
pub fn absolute_original(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `fs::canonicalize` of the longest prefix of `absolute` that exists, with
/// the remaining components appended.
fn resolve_existing_prefix(absolute: &str) -> Option<String> {
    let (root, rest) = split_root(absolute);
    let parts: Vec<&str> = rest
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();

    (0..=parts.len()).rev().find_map(|len| {
        let prefix = format!("{root}{}", parts[..len].join("/"));
        let real = std::fs::canonicalize(&prefix).ok()?;
        let real = real.to_string_lossy();
        let joined = if len == parts.len() {
            real.into_owned()
        } else {
            format!(
                "{}/{}",
                real.trim_end_matches(['/', '\\']),
                parts[len..].join("/")
            )
        };
        Some(normalize_lexically(&joined))
    })
}

/// `\` to `/`, verbatim (`\\?\`) prefixes stripped.
fn fold_separators(raw: &str) -> String {
    let s = raw.replace('\\', "/");
    if let Some(rest) = s.strip_prefix("//?/UNC/") {
        format!("//{rest}")
    } else if let Some(rest) = s.strip_prefix("//?/") {
        rest.to_string()
    } else {
        s
    }
}

/// Fold separators, collapse `.`/`..`/empty segments and drop the trailing
/// separator unless the path is a root.
fn normalize_lexically(raw: &str) -> String {
    let s = fold_separators(raw);
    let (root, rest) = split_root(&s);
    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    let mut out = root;
    out.push_str(&parts.join("/"));
    out
}

/// Split a `/`-separated path into its root (`""` when relative) and the rest.
fn split_root(s: &str) -> (String, &str) {
    let bytes = s.as_bytes();
    if let Some(rest) = s.strip_prefix("//") {
        return ("//".to_string(), rest);
    }
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        let drive = format!("{}:/", bytes[0] as char);
        let rest = s[2..].strip_prefix('/').unwrap_or(&s[2..]);
        return (drive, rest);
    }
    if let Some(rest) = s.strip_prefix('/') {
        return ("/".to_string(), rest);
    }
    (String::new(), s)
}

fn absolutize(normalized: &str) -> String {
    let (root, _) = split_root(normalized);
    if !root.is_empty() {
        return normalized.to_string();
    }
    match std::env::current_dir() {
        Ok(cwd) => format!("{}/{}", fold_separators(&cwd.to_string_lossy()), normalized),
        Err(_) => normalized.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
