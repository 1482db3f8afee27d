use super::DriveError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Environment variable that supplies an access token directly, skipping the cache file.
pub const ACCESS_TOKEN_ENV: &str = "CHORES_DRIVE_ACCESS_TOKEN";

/// Credentials persisted between runs.
///
/// Accepts the `authorized_user` layout written by Google's client libraries, where the
/// access token lives under `token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedToken {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl CachedToken {
    pub fn load(path: &Path) -> Result<Self, DriveError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DriveError::Auth(format!(
                "cannot read token cache {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DriveError::Auth(format!(
                "token cache {} is malformed: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }
}

/// Pick the bearer token for this run: env var first, then the cache file.
pub fn resolve_access_token(token_file: &Path) -> Result<String, DriveError> {
    if let Ok(token) = env::var(ACCESS_TOKEN_ENV) {
        if !token.trim().is_empty() {
            tracing::debug!("using access token from {}", ACCESS_TOKEN_ENV);
            return Ok(token.trim().to_string());
        }
    }

    let cached = CachedToken::load(token_file)?;
    if cached.is_expired(Utc::now()) {
        return Err(DriveError::Auth(format!(
            "token in {} expired; refresh it or set {}",
            token_file.display(),
            ACCESS_TOKEN_ENV
        )));
    }
    Ok(cached.access_token)
}
