//! Editor command-line recognition.
//!
//! Process listings give one flat string per process. Windows listings keep
//! the quotes the launcher used and Linux argv from `/proc` is re-quoted by
//! [`join_args`]. Plain `ps` output does not quote at all, so an unquoted
//! project path is ambiguous: it may contain ` - ` or ` -word ` segments.
//! It is read up to the longest flag boundary that names an existing
//! directory, else up to the first flag-like token.

use std::path::{Path, PathBuf};

use hubless_core::{canonicalize, EditorProfile, RunningInstance};

/// One whitespace-delimited argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Whether any part of the token was inside double quotes.
    pub quoted: bool,
}

/// Split a command line on whitespace, honouring double quotes.
///
/// Quotes may wrap a whole token or part of one (`C:\"Program Files"\x`);
/// they are removed from the text. Backslashes are literal.
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut started = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
                started = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if started {
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        quoted,
                    });
                    quoted = false;
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        tokens.push(Token {
            text: current,
            quoted,
        });
    }
    tokens
}

/// Join exact argv entries into one line [`tokenize`] splits back losslessly,
/// quoting arguments that contain whitespace or are empty.
pub fn join_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                format!("\"{arg}\"")
            } else {
                arg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `line` launches the editor binary described by `profile`.
pub fn is_editor_command(line: &str, profile: &EditorProfile) -> bool {
    let folded = line.replace('\\', "/").to_lowercase();
    profile
        .executable_patterns
        .iter()
        .any(|pattern| has_bounded_match(&folded, pattern))
}

/// `pattern` occurs in `haystack` followed by end-of-string, whitespace or a quote.
fn has_bounded_match(haystack: &str, pattern: &str) -> bool {
    haystack.match_indices(pattern).any(|(start, matched)| {
        match haystack[start + matched.len()..].chars().next() {
            None => true,
            Some(c) => c.is_whitespace() || c == '"' || c == '\'',
        }
    })
}

/// Whether `tokens` belong to a helper process rather than an editor window.
///
/// Flag markers (`-batchmode`) must match a whole argument; name markers
/// (`assetimportworker`) may appear inside one (`AssetImportWorker0`).
pub fn is_auxiliary(tokens: &[Token], profile: &EditorProfile) -> bool {
    tokens.iter().any(|token| {
        let folded = token.text.to_lowercase();
        profile.auxiliary_markers.iter().any(|marker| {
            if marker.starts_with('-') {
                folded == *marker
            } else {
                folded.contains(marker)
            }
        })
    })
}

/// Value following `flag` (matched case-insensitively).
pub fn extract_flag_value(tokens: &[Token], flag: &str) -> Option<String> {
    extract_flag_value_with(tokens, flag, |candidate| Path::new(candidate).is_dir())
}

/// [`extract_flag_value`] with an explicit directory check.
pub fn extract_flag_value_with(
    tokens: &[Token],
    flag: &str,
    is_dir: impl Fn(&str) -> bool,
) -> Option<String> {
    let index = tokens
        .iter()
        .position(|t| !t.quoted && t.text.eq_ignore_ascii_case(flag))?;
    let rest = &tokens[index + 1..];
    let first = rest.first()?;

    if first.quoted {
        return (!first.text.is_empty()).then(|| first.text.clone());
    }
    if looks_like_flag(first) {
        return None;
    }

    // Candidate values end right before each flag-like token, or at the end.
    let mut candidates = Vec::new();
    let mut parts: Vec<&str> = Vec::new();
    for token in rest {
        if looks_like_flag(token) {
            candidates.push(parts.join(" "));
        }
        parts.push(token.text.as_str());
    }
    candidates.push(parts.join(" "));

    let shortest = candidates.first().cloned()?;
    let value = candidates
        .into_iter()
        .rev()
        .find(|candidate| is_dir(candidate))
        .unwrap_or(shortest);
    (!value.is_empty()).then_some(value)
}

/// `-` followed by an ASCII letter, e.g. `-useHub`; a lone `-` is not a flag.
fn looks_like_flag(token: &Token) -> bool {
    !token.quoted
        && token
            .text
            .strip_prefix('-')
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_alphabetic())
}

/// Interpret one process listing entry; `None` for anything that is not a
/// user-facing editor bound to a project.
pub fn parse_instance(pid: u32, line: &str, profile: &EditorProfile) -> Option<RunningInstance> {
    if !is_editor_command(line, profile) {
        return None;
    }
    let tokens = tokenize(line);
    if is_auxiliary(&tokens, profile) {
        return None;
    }
    let project = PathBuf::from(extract_flag_value(&tokens, profile.project_path_flag)?);
    Some(RunningInstance {
        pid,
        bound_project_path: canonicalize(&project),
        project_path: project,
    })
}
