//! Run-mode selection from the user's inputs.

use gcfsync_core::{GroupId, GroupSelector, SyncError};

/// List synced by explicit-group runs when no name is given.
pub const DEFAULT_LIST_NAME: &str = "vpn-users";

/// One of the three mutually exclusive things a run can do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Revoke seats of in-domain seat holders missing from `groups`.
    PurgeStale { groups: Vec<GroupId> },
    /// Sync every group matching `pattern` into a list of the same name.
    Discovered { pattern: String },
    /// Sync the union of `groups` into `list_name`.
    Explicit {
        groups: Vec<GroupId>,
        list_name: String,
    },
}

impl RunMode {
    /// Pick the mode for a validated selector.
    ///
    /// `list_name` only matters for explicit runs; an empty name falls back
    /// to [`DEFAULT_LIST_NAME`].
    pub fn select(
        selector: GroupSelector,
        delete_stale: bool,
        list_name: &str,
    ) -> Result<Self, SyncError> {
        match (selector, delete_stale) {
            (GroupSelector::Explicit(groups), true) => Ok(RunMode::PurgeStale { groups }),
            (GroupSelector::Pattern(_), true) => Err(SyncError::Config(
                "delete_stale requires google_groups".to_string(),
            )),
            (GroupSelector::Pattern(pattern), false) => Ok(RunMode::Discovered { pattern }),
            (GroupSelector::Explicit(groups), false) => {
                let list_name = match list_name.trim() {
                    "" => DEFAULT_LIST_NAME.to_string(),
                    name => name.to_string(),
                };
                Ok(RunMode::Explicit { groups, list_name })
            }
        }
    }

    /// Short name used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            RunMode::PurgeStale { .. } => "purge-stale",
            RunMode::Discovered { .. } => "discovered",
            RunMode::Explicit { .. } => "explicit",
        }
    }
}
