//! Small enums shared across the pipeline crates.
//!
//! All enums serialize as `snake_case`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// EntryKind
// ---------------------------------------------------------------------------

/// Classification of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IncludeMatch
// ---------------------------------------------------------------------------

/// How an include base name is matched against files in the input tree.
///
/// `Exact` compares the file stem with the include base. `Prefix` keeps the
/// legacy behaviour where any file whose name starts with the base matches,
/// so `#include "foo.h"` also pulls in `foobar.h`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncludeMatch {
    #[default]
    Exact,
    Prefix,
}

impl IncludeMatch {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Prefix => "prefix",
        }
    }
}

impl fmt::Display for IncludeMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncludeMatch {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "prefix" => Ok(Self::Prefix),
            other => Err(CoreError::Validation(format!(
                "unknown include match mode '{other}' (expected 'exact' or 'prefix')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn include_match_defaults_to_exact() {
        assert_eq!(IncludeMatch::default(), IncludeMatch::Exact);
    }

    #[test]
    fn include_match_parses_case_insensitively() {
        assert_eq!("Prefix".parse::<IncludeMatch>().unwrap(), IncludeMatch::Prefix);
        assert_eq!("exact".parse::<IncludeMatch>().unwrap(), IncludeMatch::Exact);
        assert!("fuzzy".parse::<IncludeMatch>().is_err());
    }

    #[test]
    fn include_match_serializes_snake_case() {
        let json = serde_json::to_string(&IncludeMatch::Prefix).unwrap();
        assert_eq!(json, "\"prefix\"");
    }
}
