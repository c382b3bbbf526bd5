use gcfsync_core::{Backend, SyncError};

use crate::model::{ApiMessage, Envelope};

pub(crate) fn request_err(err: ureq::Error, resource: &str) -> SyncError {
    match err {
        ureq::Error::Status(404, _) => SyncError::NotFound {
            backend: Backend::Gateway,
            resource: resource.to_string(),
        },
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|env| first_message(&env.errors))
                .unwrap_or(body);
            SyncError::Api {
                backend: Backend::Gateway,
                status,
                message,
            }
        }
        ureq::Error::Transport(transport) => SyncError::Transport {
            backend: Backend::Gateway,
            message: transport.to_string(),
        },
    }
}

pub(crate) fn decode_err(err: std::io::Error) -> SyncError {
    SyncError::Decode {
        backend: Backend::Gateway,
        message: err.to_string(),
    }
}

/// A 2xx response whose envelope still says `success: false`.
pub(crate) fn unsuccessful(status: u16, errors: &[ApiMessage]) -> SyncError {
    SyncError::Api {
        backend: Backend::Gateway,
        status,
        message: first_message(errors).unwrap_or_else(|| "request was not successful".to_string()),
    }
}

fn first_message(errors: &[ApiMessage]) -> Option<String> {
    errors
        .first()
        .map(|e| format!("{} (code {})", e.message, e.code))
}
