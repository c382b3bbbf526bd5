//! Domain types shared by the driver and both backend adapters.
//!
//! Identities are compared by exact string equality everywhere in this
//! workspace. Any case or format normalization happens inside an adapter
//! before a key reaches a [`MembershipMapping`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// An email address identifying one person across both backends.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity(pub String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A directory group key (the group's email address).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Backend-assigned identifier of a gateway list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListId(pub String);

impl ListId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ListId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ListId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identity → opaque backend token (directory role, list id, seat-holder id).
///
/// Ordered so that log output and patch payloads are deterministic; the
/// ordering carries no meaning.
pub type MembershipMapping = BTreeMap<Identity, String>;

// ---------------------------------------------------------------------------
// Group selector
// ---------------------------------------------------------------------------

/// How the source groups for a run are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelector {
    /// Explicit group keys, in the order given on the command line.
    Explicit(Vec<GroupId>),
    /// A directory search query; the backend resolves it to groups.
    Pattern(String),
}

impl GroupSelector {
    /// Build a selector from the two mutually exclusive flag values.
    ///
    /// Exactly one of `groups` / `pattern` must be non-empty.
    pub fn from_flags(groups: &str, pattern: &str) -> Result<Self, SyncError> {
        let groups = groups.trim();
        let pattern = pattern.trim();
        match (groups.is_empty(), pattern.is_empty()) {
            (true, true) => Err(SyncError::Config(
                "one of google_groups or google_groups_regex is required".to_string(),
            )),
            (false, false) => Err(SyncError::Config(
                "ONLY one of google_groups or google_groups_regex is allowed".to_string(),
            )),
            (false, true) => {
                let parsed = parse_group_list(groups);
                if parsed.is_empty() {
                    return Err(SyncError::Config(format!(
                        "google_groups '{groups}' does not name any group"
                    )));
                }
                Ok(Self::Explicit(parsed))
            }
            (true, false) => Ok(Self::Pattern(pattern.to_string())),
        }
    }
}

/// Split a comma-separated group list, trimming entries and dropping blanks.
pub fn parse_group_list(raw: &str) -> Vec<GroupId> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(GroupId::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
