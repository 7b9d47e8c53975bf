//! Headless operator console for a Firebase project.
//!
//! Wraps the project's Identity Toolkit, Firestore and Cloud Storage
//! APIs behind clients a UI layer can drive: email/password sign-in with
//! observable session state, a document inspector over the project's
//! collections and a [`browser::StorageBrowser`] that presents the flat
//! bucket namespace as navigable folders.

pub mod auth;
pub mod browser;
pub mod console;
pub mod core;
pub mod firestore;
pub mod inspector;
pub mod storage;

use auth::IdentityAuth;
use crate::core::middleware::AuthMiddleware;
use firestore::FirestoreClient;
use storage::StorageClient;
use yup_oauth2::ServiceAccountKey;

/// Root handle for one Firebase project.
///
/// Built from the project's service account key (for the server-side
/// APIs) and its web API key (for end-user sign-in). All service clients
/// handed out share one token cache.
pub struct ConsoleApp {
    middleware: AuthMiddleware,
    web_api_key: String,
}

impl ConsoleApp {
    pub fn new(service_account_key: ServiceAccountKey, web_api_key: &str) -> Self {
        Self {
            middleware: AuthMiddleware::new(service_account_key),
            web_api_key: web_api_key.to_string(),
        }
    }

    pub fn auth(&self) -> IdentityAuth {
        IdentityAuth::new(&self.web_api_key)
    }

    pub fn firestore(&self) -> FirestoreClient {
        FirestoreClient::new(self.middleware.clone())
    }

    pub fn storage(&self) -> StorageClient {
        StorageClient::new(self.middleware.clone())
    }
}
