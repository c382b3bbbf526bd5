//! Error taxonomy shared by every crate in the workspace.

use std::path::PathBuf;

use thiserror::Error;

/// Which backend a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Directory,
    Gateway,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Directory => write!(f, "directory"),
            Backend::Gateway => write!(f, "gateway"),
        }
    }
}

/// Coarse classification used by callers to decide what to do with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Missing or contradictory flags / credentials. Nothing was called yet.
    Configuration,
    /// The backend reported the resource does not exist.
    NotFound,
    /// Network failure, throttling or a server-side error.
    Transient,
    /// Anything else: auth failure, rejected request, malformed response.
    Fatal,
}

/// All errors that can arise from a reconciliation run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A credentials file could not be read.
    #[error("cannot read credentials at {path}: {source}")]
    Credentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend answered 404 for `resource`.
    #[error("{backend} resource not found: {resource}")]
    NotFound { backend: Backend, resource: String },

    /// The request never produced an HTTP response.
    #[error("{backend} transport error: {message}")]
    Transport { backend: Backend, message: String },

    /// The backend answered with a non-success status or envelope.
    #[error("{backend} API error (status {status}): {message}")]
    Api {
        backend: Backend,
        status: u16,
        message: String,
    },

    /// The backend answered with a body we could not decode.
    #[error("{backend} returned a malformed response: {message}")]
    Decode { backend: Backend, message: String },

    /// Obtaining an access token failed.
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl SyncError {
    /// Classify this error into the coarse [`ErrorClass`] taxonomy.
    pub fn class(&self) -> ErrorClass {
        match self {
            SyncError::Config(_) | SyncError::Credentials { .. } => ErrorClass::Configuration,
            SyncError::NotFound { .. } => ErrorClass::NotFound,
            SyncError::Transport { .. } => ErrorClass::Transient,
            SyncError::Api { status, .. } if *status == 429 || *status >= 500 => {
                ErrorClass::Transient
            }
            SyncError::Api { .. } | SyncError::Decode { .. } | SyncError::Auth(_) => {
                ErrorClass::Fatal
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.class() == ErrorClass::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> SyncError {
        SyncError::Api {
            backend: Backend::Gateway,
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn status_codes_classify() {
        assert_eq!(api(429).class(), ErrorClass::Transient);
        assert_eq!(api(503).class(), ErrorClass::Transient);
        assert_eq!(api(403).class(), ErrorClass::Fatal);
        assert_eq!(api(400).class(), ErrorClass::Fatal);
    }

    #[test]
    fn not_found_is_distinguishable() {
        let err = SyncError::NotFound {
            backend: Backend::Directory,
            resource: "group ghost@x.com".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "directory resource not found: group ghost@x.com"
        );
        assert!(!api(500).is_not_found());
    }

    #[test]
    fn config_errors_are_configuration_class() {
        assert_eq!(
            SyncError::Config("missing".into()).class(),
            ErrorClass::Configuration
        );
    }
}
