//! Relative paths inside the staging working directory.

use std::fmt;
use std::path::{Component, Path};
use std::sync::OnceLock;

use regex_lite::Regex;

/// Artifact path errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path {0:?} is absolute")]
    Absolute(String),

    #[error("path {0:?} escapes the working directory")]
    Escapes(String),

    #[error("path {0:?} contains an empty or `.` component")]
    Irregular(String),
}

/// A normalized relative path: no leading `/`, no `..`, no empty segments.
///
/// Used for artifact names and for the container working directory, both of
/// which end up joined onto the staging prefix and into the container shell
/// command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelPath(String);

impl RelPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }
        if trimmed.starts_with('/') || Path::new(trimmed).is_absolute() {
            return Err(PathError::Absolute(trimmed.to_string()));
        }

        let body = trimmed.trim_end_matches('/');
        for segment in body.split('/') {
            if segment.is_empty() || segment == "." {
                return Err(PathError::Irregular(trimmed.to_string()));
            }
        }
        for component in Path::new(body).components() {
            match component {
                Component::Normal(_) => {}
                Component::ParentDir => return Err(PathError::Escapes(trimmed.to_string())),
                _ => return Err(PathError::Irregular(trimmed.to_string())),
            }
        }

        Ok(Self(body.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parent directory, or None for a top-level name.
    pub fn parent(&self) -> Option<&str> {
        self.0.rfind('/').map(|idx| &self.0[..idx])
    }

    /// `self/other`
    pub fn join(&self, other: &RelPath) -> String {
        format!("{}/{}", self.0, other.0)
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn shell_safe() -> &'static Regex {
    static SAFE: OnceLock<Regex> = OnceLock::new();
    SAFE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_@%+=:,./-]+$").expect("static pattern"))
}

/// Quote a word for `/bin/bash -c` unless it only has shell-safe characters.
pub fn shell_quote(word: &str) -> String {
    if shell_safe().is_match(word) {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
