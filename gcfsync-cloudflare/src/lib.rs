//! # gcfsync-cloudflare
//!
//! Cloudflare Zero Trust as an [`AllowList`](gcfsync_sync::AllowList):
//! Gateway lists of type `EMAIL` and per-user Access / Gateway seats.

pub mod client;
mod error;
pub mod model;

pub use client::GatewayClient;
