use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::AuthError;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInRequest {
    pub email: String,
    pub password: String,
    pub return_secure_token: bool,
}

/// Successful `accounts:signInWithPassword` payload. `expiresIn` is a
/// decimal string of seconds.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    pub local_id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// An authenticated user session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    /// Bearer token for user-scoped API calls.
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn from_response(response: SignInResponse) -> Result<Self, AuthError> {
        let seconds: i64 = response.expires_in.parse().map_err(|_| {
            AuthError::ApiError(format!(
                "Invalid expiresIn value: {}",
                response.expires_in
            ))
        })?;

        Ok(Self {
            user_id: response.local_id,
            email: response.email,
            display_name: response.display_name,
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: Utc::now() + Duration::seconds(seconds),
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Where the console stands with the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    SignedOut,
    Active(Session),
    /// A session existed but its token has run out; the user has to sign
    /// in again.
    Expired,
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }
}
