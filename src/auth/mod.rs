//! Email/password sign-in against the Identity Toolkit API.
//!
//! Unlike the service-backed clients, this one authenticates as an end
//! user with the project's web API key; no bearer middleware is involved.
//! The resulting session is broadcast on a watch channel so other parts
//! of a console can react to sign-in and sign-out.

pub mod models;


use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use thiserror::Error;
use tokio::sync::watch;

use crate::core::parse_error_response;

use self::models::{Session, SessionState, SignInRequest, SignInResponse};

const IDENTITY_TOOLKIT_V1_API: &str = "https://identitytoolkit.googleapis.com/v1";

// Error codes the API uses for credentials the caller got wrong, as
// opposed to the request itself failing.
const INVALID_CREDENTIAL_CODES: [&str; 4] = [
    "EMAIL_NOT_FOUND",
    "INVALID_PASSWORD",
    "INVALID_LOGIN_CREDENTIALS",
    "USER_DISABLED",
];

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("API error: {0}")]
    ApiError(String),
}

/// Identity provider client holding the current session.
pub struct IdentityAuth {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    session: watch::Sender<SessionState>,
}

impl IdentityAuth {
    pub fn new(api_key: &str) -> Self {
        Self::new_with_url(api_key, IDENTITY_TOOLKIT_V1_API.to_string())
    }

    /// Same client against a custom endpoint, e.g. the emulator.
    pub fn new_with_url(api_key: &str, base_url: String) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let (session, _) = watch::channel(SessionState::SignedOut);

        Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            session,
        }
    }

    /// Signs in with an email and password. On success the session is
    /// stored, broadcast to subscribers and returned. Rejected
    /// credentials come back as [`AuthError::InvalidCredentials`]; the
    /// stored state is left untouched by failures.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let url = format!("{}/accounts:signInWithPassword", self.base_url);
        let request = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = parse_error_response(response, "Sign in failed").await;
            if INVALID_CREDENTIAL_CODES
                .iter()
                .any(|code| message.starts_with(code))
            {
                return Err(AuthError::InvalidCredentials);
            }
            return Err(AuthError::ApiError(format!(
                "Sign in failed {}: {}",
                status, message
            )));
        }

        let payload: SignInResponse = response.json().await?;
        let session = Session::from_response(payload)?;
        self.session
            .send_replace(SessionState::Active(session.clone()));

        Ok(session)
    }

    /// Drops the local session and notifies subscribers. The identity
    /// provider keeps no server-side session for this flow, so nothing
    /// is revoked.
    pub fn sign_out(&self) {
        self.session.send_replace(SessionState::SignedOut);
    }

    /// Current session state. An expired session is demoted to
    /// [`SessionState::Expired`] on the way out, which also notifies
    /// subscribers.
    pub fn current(&self) -> SessionState {
        let state = self.session.borrow().clone();
        match state {
            SessionState::Active(session) if session.is_expired() => {
                self.session.send_replace(SessionState::Expired);
                SessionState::Expired
            }
            other => other,
        }
    }

    /// Watches the session as it changes. The receiver starts out seeing
    /// the current state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }
}
