use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{RelocateError, Result};

/// Name of one installed Node.js version directory (e.g. `v20.11.1`).
///
/// Only equality is ever used; no ordering is implied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionId(String);

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^[a-z0-9.-]+$").expect("version pattern is valid"))
}

impl VersionId {
    /// Validate a version directory name.
    ///
    /// `.` and `..` match the character set but would escape the versions
    /// directory, so they are rejected as well. So is a leading `-`, which
    /// only ever comes from a mistyped option.
    pub fn parse(value: &str) -> Result<Self> {
        let escapes = value == "." || value == "..";
        if !pattern().is_match(value) || escapes || value.starts_with('-') {
            return Err(RelocateError::InvalidVersionFormat {
                value: value.to_string(),
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VersionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
