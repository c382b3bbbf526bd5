//! Adapter configuration read from the process environment.
//!
//! # API pattern
//!
//! Each config type has two constructors:
//! - `from_lookup(lookup, …)`: reads variables through an injected lookup
//!   function; used in tests with a plain `HashMap`
//! - `from_env()`: reads `std::env`, delegates to `from_lookup`
//!
//! Tests must NEVER call the `from_env` wrappers; always use `from_lookup`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::SyncError;

pub const CF_API_KEY: &str = "CF_API_KEY";
pub const CF_API_EMAIL: &str = "CF_API_EMAIL";
pub const CF_API_ACCOUNTID: &str = "CF_API_ACCOUNTID";
pub const CF_API_BASE_URL: &str = "CF_API_BASE_URL";

pub const GOOGLE_DOMAIN: &str = "GOOGLE_DOMAIN";
pub const GOOGLE_CREDENTIALS: &str = "GOOGLE_CREDENTIALS";
pub const GOOGLE_CREDENTIALS_FILE: &str = "GOOGLE_CREDENTIALS_FILE";
pub const GOOGLE_DIRECTORY_BASE_URL: &str = "GOOGLE_DIRECTORY_BASE_URL";
pub const GOOGLE_TOKEN_URL: &str = "GOOGLE_TOKEN_URL";

pub const DEFAULT_CF_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_DIRECTORY_BASE_URL: &str = "https://admin.googleapis.com/admin/directory/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Fallback credentials file, resolved against the working directory.
pub const DEFAULT_CREDENTIALS_FILE: &str = "google.json";

// ---------------------------------------------------------------------------
// Gateway (Cloudflare)
// ---------------------------------------------------------------------------

/// Credentials and endpoint for the gateway API.
#[derive(Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub api_email: String,
    pub account_id: String,
    pub base_url: String,
}

impl GatewayConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(&lookup, key);
        match (get(CF_API_KEY), get(CF_API_EMAIL), get(CF_API_ACCOUNTID)) {
            (Some(api_key), Some(api_email), Some(account_id)) => Ok(Self {
                api_key,
                api_email,
                account_id,
                base_url: get(CF_API_BASE_URL)
                    .unwrap_or_else(|| DEFAULT_CF_BASE_URL.to_string()),
            }),
            _ => Err(SyncError::Config(format!(
                "{CF_API_KEY}, {CF_API_EMAIL}, {CF_API_ACCOUNTID} env variables are required"
            ))),
        }
    }

    /// `from_lookup` convenience wrapper over the process environment.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &"<redacted>")
            .field("api_email", &self.api_email)
            .field("account_id", &self.account_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Directory (Google)
// ---------------------------------------------------------------------------

/// Credentials and endpoints for the directory API.
#[derive(Clone)]
pub struct DirectoryConfig {
    pub domain: String,
    /// Raw service-account key JSON.
    pub credentials_json: String,
    pub base_url: String,
    pub token_url: String,
}

impl DirectoryConfig {
    /// Read directory settings; a relative credentials file path is resolved
    /// against `work_dir`.
    ///
    /// Inline `GOOGLE_CREDENTIALS` wins over any file.
    pub fn from_lookup<F>(lookup: F, work_dir: &Path) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(&lookup, key);
        let domain = get(GOOGLE_DOMAIN).ok_or_else(|| {
            SyncError::Config(format!(
                "{GOOGLE_CREDENTIALS}, {GOOGLE_DOMAIN} env variables are required"
            ))
        })?;

        let credentials_json = match get(GOOGLE_CREDENTIALS) {
            Some(inline) => inline,
            None => {
                let file = get(GOOGLE_CREDENTIALS_FILE)
                    .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string());
                let path = resolve(work_dir, &file);
                std::fs::read_to_string(&path)
                    .map_err(|source| SyncError::Credentials { path, source })?
            }
        };

        Ok(Self {
            domain,
            credentials_json,
            base_url: get(GOOGLE_DIRECTORY_BASE_URL)
                .unwrap_or_else(|| DEFAULT_DIRECTORY_BASE_URL.to_string()),
            token_url: get(GOOGLE_TOKEN_URL).unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
        })
    }

    /// `from_lookup` convenience wrapper over the process environment and cwd.
    pub fn from_env() -> Result<Self, SyncError> {
        let cwd = std::env::current_dir()
            .map_err(|e| SyncError::Config(format!("cannot determine working directory: {e}")))?;
        Self::from_lookup(|key| std::env::var(key).ok(), &cwd)
    }
}

impl fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("domain", &self.domain)
            .field("credentials_json", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn resolve(work_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        work_dir.join(path)
    }
}
