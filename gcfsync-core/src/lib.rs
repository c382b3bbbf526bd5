//! Core library for google-cloudflare-sync: domain types, errors and configuration.
//!
//! - [`types`]: identity newtypes, membership mappings, group selectors
//! - [`error`]: [`SyncError`] and its [`ErrorClass`] taxonomy
//! - [`config`]: environment-driven adapter configuration

pub mod config;
pub mod error;
pub mod types;

pub use error::{Backend, ErrorClass, SyncError};
pub use config::{DirectoryConfig, GatewayConfig};
pub use types::{GroupId, GroupSelector, Identity, ListId, MembershipMapping};
