//! Console shell: sign-in gate and tab selection. The cards behind the
//! tabs ([`crate::inspector`], [`crate::browser`]) manage themselves;
//! this layer only decides which one is showing and whether anyone is
//! signed in at all.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::auth::models::SessionState;
use crate::auth::{AuthError, IdentityAuth};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Firestore,
    Database,
    Storage,
}

/// The sign-in form. On a failed attempt only the password clears; the
/// email stays for the next try.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
}

/// Top-level console state for one operator.
pub struct Console {
    auth: Arc<IdentityAuth>,
    tab: Tab,
    login: LoginForm,
}

impl Console {
    pub fn new(auth: Arc<IdentityAuth>) -> Self {
        Self {
            auth,
            tab: Tab::Firestore,
            login: LoginForm::default(),
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn session(&self) -> SessionState {
        self.auth.current()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session().is_signed_in()
    }

    pub fn login(&self) -> &LoginForm {
        &self.login
    }

    pub fn login_mut(&mut self) -> &mut LoginForm {
        &mut self.login
    }

    /// Attempts to sign in with the form's credentials. Success clears
    /// the whole form; failure clears the password, keeps the email and
    /// shows a message.
    pub async fn submit_login(&mut self) {
        let result = self
            .auth
            .sign_in(&self.login.email, &self.login.password)
            .await;

        match result {
            Ok(_) => self.login = LoginForm::default(),
            Err(err) => {
                self.login.password.clear();
                self.login.error = Some(match err {
                    AuthError::InvalidCredentials => "Failed to log in".to_string(),
                    other => other.to_string(),
                });
            }
        }
    }

    pub fn sign_out(&self) {
        self.auth.sign_out();
    }
}
