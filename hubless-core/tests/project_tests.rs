//! Path equivalence and project-reading integration tests.

use assert_fs::prelude::*;
use hubless_core::{
    canonicalize, manifest, paths::{canonicalize_with, CaseRule}, paths_equal, CoreError,
    EditorProfile,
};
use predicates::prelude::*;
use rstest::rstest;

fn project_fixture(version: &str) -> assert_fs::TempDir {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("ProjectSettings/ProjectVersion.txt")
        .write_str(&format!("m_EditorVersion: {version}\n"))
        .expect("write manifest");
    dir
}

// ---------------------------------------------------------------------------
// 1. Equivalent spellings
// ---------------------------------------------------------------------------

#[rstest]
#[case("/")]
#[case("//")]
#[case("/./")]
#[case("\\")]
fn trailing_separator_variants_are_equal(#[case] suffix: &str) {
    let dir = project_fixture("2022.3.5f1");
    let base = dir.path().join("Sub");
    std::fs::create_dir_all(&base).expect("mkdir");
    let spelled = format!("{}{suffix}", base.display());
    assert!(paths_equal(&base, &spelled), "{} vs {spelled}", base.display());
}

#[test]
fn backslash_spelling_matches_forward_slash() {
    let dir = project_fixture("2022.3.5f1");
    let forward = dir.path().display().to_string().replace('\\', "/");
    let backward = forward.replace('/', "\\");
    assert_eq!(
        canonicalize_with(&forward, CaseRule::Sensitive),
        canonicalize_with(&backward, CaseRule::Sensitive)
    );
}

#[test]
fn case_variants_match_under_insensitive_rule() {
    let dir = project_fixture("2022.3.5f1");
    let spelled = dir.path().display().to_string();
    assert_eq!(
        canonicalize_with(spelled.to_uppercase(), CaseRule::Insensitive),
        canonicalize_with(spelled.to_lowercase(), CaseRule::Insensitive)
    );
}

#[test]
fn parent_segments_collapse() {
    let dir = project_fixture("2022.3.5f1");
    let detour = dir.path().join("ProjectSettings").join("..");
    assert!(paths_equal(dir.path(), detour));
}

// ---------------------------------------------------------------------------
// 2. Manifest reading
// ---------------------------------------------------------------------------

#[test]
fn read_project_returns_version_and_canonical_path() {
    let dir = project_fixture("2022.3.5f1");
    let record = manifest::read_project(dir.path(), &EditorProfile::unity()).expect("read");
    assert_eq!(record.required_version, "2022.3.5f1");
    assert_eq!(record.canonical, canonicalize(dir.path()));
}

#[test]
fn not_a_project_message_names_manifest() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = manifest::read_project(dir.path(), &EditorProfile::unity()).unwrap_err();
    assert!(matches!(err, CoreError::NotAProject { .. }));
    assert!(predicate::str::contains("ProjectVersion.txt").eval(&err.to_string()));
}

#[test]
fn file_instead_of_directory_is_rejected() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("plain.txt");
    file.write_str("x").expect("write");
    let err = manifest::read_project(file.path(), &EditorProfile::unity()).unwrap_err();
    assert!(matches!(err, CoreError::NotADirectory { .. }), "got: {err}");
}
