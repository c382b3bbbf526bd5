//! Stale-account selection for seat purges.
//!
//! Only identities matching the domain pattern are ever candidates; the
//! filter runs before the membership check, so out-of-domain seat holders are
//! invisible to a purge even when no group lists them.

use gcfsync_core::{Identity, MembershipMapping, SyncError};
use regex::Regex;

/// Seat holders outside this pattern are never purged.
pub const DEFAULT_PURGE_DOMAIN_PATTERN: &str = r".*@easybrain\.com$";

/// Which seat holders a purge may touch.
#[derive(Debug, Clone)]
pub struct PurgePolicy {
    domain: Regex,
}

impl PurgePolicy {
    pub fn new(pattern: &str) -> Result<Self, SyncError> {
        let domain = Regex::new(pattern)
            .map_err(|e| SyncError::Config(format!("invalid purge domain pattern: {e}")))?;
        Ok(Self { domain })
    }

    pub fn is_candidate(&self, identity: &Identity) -> bool {
        self.domain.is_match(identity.as_str())
    }

    /// In-domain seat holders absent from `source`, with the holders' tokens.
    pub fn stale(
        &self,
        source: &MembershipMapping,
        seat_holders: &MembershipMapping,
    ) -> MembershipMapping {
        seat_holders
            .iter()
            .filter(|(identity, _)| self.is_candidate(identity))
            .filter(|(identity, _)| !source.contains_key(*identity))
            .map(|(identity, token)| (identity.clone(), token.clone()))
            .collect()
    }
}

impl Default for PurgePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PURGE_DOMAIN_PATTERN).expect("default purge pattern compiles")
    }
}
