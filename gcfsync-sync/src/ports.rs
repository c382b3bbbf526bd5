//! Backend seams the driver talks through.
//!
//! Both traits are blocking: every call returns only once all pages of the
//! result have been fetched.

use gcfsync_core::{GroupId, Identity, ListId, MembershipMapping, SyncError};

/// The directory holding the source-of-truth groups.
pub trait IdentitySource {
    /// Members of one group, keyed by email, valued by role.
    ///
    /// A group the directory does not know must surface as an error whose
    /// [`SyncError::is_not_found`] is true.
    fn group_members(&self, group: &GroupId) -> Result<MembershipMapping, SyncError>;

    /// Groups matched by a directory search query, in backend order.
    fn groups_matching(&self, pattern: &str) -> Result<Vec<GroupId>, SyncError>;
}

/// The gateway hosting the allow-lists and per-user seats.
pub trait AllowList {
    /// Look a list up by name without creating it.
    fn find_list(&self, name: &str) -> Result<Option<ListId>, SyncError>;

    /// Get-or-create a list by name. Calling it twice yields the same id.
    fn ensure_list(&self, name: &str) -> Result<ListId, SyncError>;

    /// Current members of a list, valued by list id.
    fn list_members(&self, list: &ListId) -> Result<MembershipMapping, SyncError>;

    /// Every account-wide user holding an access or a gateway seat.
    fn seat_holders(&self) -> Result<MembershipMapping, SyncError>;

    /// Add and remove members in one combined mutation.
    fn patch(
        &self,
        list: &ListId,
        to_add: &MembershipMapping,
        to_remove: &MembershipMapping,
    ) -> Result<(), SyncError>;

    /// Clear both seat flags of one user.
    ///
    /// There is no fetch-by-email on the gateway, so implementations scan
    /// every user page: budget O(total seats) per call. Returns `false` when
    /// the identity was not found, which is not an error.
    fn revoke_seats(&self, identity: &Identity) -> Result<bool, SyncError>;
}
