//! # gcfsync-google
//!
//! Google Admin Directory as an [`IdentitySource`](gcfsync_sync::IdentitySource).
//!
//! [`DirectoryClient::connect`] exchanges a service-account assertion for an
//! access token once, then serves group and member listings over blocking
//! HTTP, paging through `nextPageToken` until it runs out.

pub mod auth;
pub mod client;
mod error;

pub use auth::{AccessToken, ServiceAccountKey, DIRECTORY_SCOPES};
pub use client::DirectoryClient;
