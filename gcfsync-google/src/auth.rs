//! Service-account authentication with domain-wide delegation.
//!
//! The token request is an OAuth2 JWT-bearer grant: an RS256 assertion signed
//! with the service account's private key, whose `sub` is the Workspace user
//! being impersonated.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use gcfsync_core::SyncError;

/// Read-only access to groups and their members.
pub const DIRECTORY_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/admin.directory.group.member.readonly",
    "https://www.googleapis.com/auth/admin.directory.group.readonly",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The fields of a service-account key file we use.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self, SyncError> {
        serde_json::from_str(raw).map_err(|e| {
            SyncError::Config(format!(
                "Unable to parse service account key file to config: {e}"
            ))
        })
    }
}

/// Assertion claims for the JWT-bearer grant.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// A bearer token returned by the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Sign an assertion impersonating `subject`, addressed to `audience` (the
/// token endpoint URL).
pub fn sign_assertion(
    key: &ServiceAccountKey,
    subject: &str,
    audience: &str,
    now: DateTime<Utc>,
) -> Result<String, SyncError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| SyncError::Config(format!("invalid service account private key: {e}")))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        sub: subject.to_string(),
        scope: DIRECTORY_SCOPES.join(" "),
        aud: audience.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
    };

    encode(&header, &claims, &encoding_key)
        .map_err(|e| SyncError::Auth(format!("cannot sign assertion: {e}")))
}

/// Exchange a signed assertion for an access token.
pub fn fetch_access_token(
    agent: &ureq::Agent,
    token_url: &str,
    assertion: &str,
) -> Result<AccessToken, SyncError> {
    let response = agent
        .post(token_url)
        .send_form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)]);

    match response {
        Ok(response) => response
            .into_json::<AccessToken>()
            .map_err(|e| SyncError::Auth(format!("malformed token response: {e}"))),
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_default();
            let reason = match serde_json::from_str::<TokenError>(&body) {
                Ok(TokenError {
                    error,
                    error_description: Some(description),
                }) => format!("{error}: {description}"),
                Ok(TokenError { error, .. }) => error,
                Err(_) => body,
            };
            Err(SyncError::Auth(format!(
                "token endpoint returned {status}: {reason}"
            )))
        }
        Err(ureq::Error::Transport(transport)) => Err(SyncError::Auth(format!(
            "token endpoint unreachable: {transport}"
        ))),
    }
}
