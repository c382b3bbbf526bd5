//! # gcfsync-sync
//!
//! Reconciliation driver: diff two membership mappings and apply the result.
//!
//! Build a [`Reconciler`] over an [`IdentitySource`] and an [`AllowList`],
//! pick a [`RunMode`], and call [`Reconciler::run`].

pub mod diff;
pub mod mode;
pub mod pipeline;
pub mod ports;
pub mod purge;

pub use diff::{diff, union_into, DiffResult};
pub use mode::{RunMode, DEFAULT_LIST_NAME};
pub use pipeline::{ListOutcome, PurgeOutcome, Reconciler, RunReport};
pub use ports::{AllowList, IdentitySource};
pub use purge::{PurgePolicy, DEFAULT_PURGE_DOMAIN_PATTERN};
