//! Mapping of `ureq` failures onto the shared error taxonomy.

use serde::Deserialize;

use gcfsync_core::{Backend, SyncError};

/// Google's JSON error envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Convert a failed directory request; a 404 becomes [`SyncError::NotFound`]
/// naming `resource`.
pub(crate) fn request_err(err: ureq::Error, resource: &str) -> SyncError {
    match err {
        ureq::Error::Status(404, _) => SyncError::NotFound {
            backend: Backend::Directory,
            resource: resource.to_string(),
        },
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            SyncError::Api {
                backend: Backend::Directory,
                status,
                message,
            }
        }
        ureq::Error::Transport(transport) => SyncError::Transport {
            backend: Backend::Directory,
            message: transport.to_string(),
        },
    }
}

pub(crate) fn decode_err(err: std::io::Error) -> SyncError {
    SyncError::Decode {
        backend: Backend::Directory,
        message: err.to_string(),
    }
}
