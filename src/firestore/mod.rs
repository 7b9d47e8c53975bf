//! Firestore client: collection reads, document fetches and writes over
//! the REST API.
//!
//! Wire values (`stringValue`, `integerValue` and friends) are folded into
//! plain JSON on the way in, so callers deal with [`models::DocumentItem`]
//! rather than the tagged encoding.

pub mod models;
pub mod reference;


use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use thiserror::Error;

use crate::core::middleware::AuthMiddleware;

use self::reference::{CollectionReference, DocumentReference};

const FIRESTORE_V1_API: &str =
    "https://firestore.googleapis.com/v1/projects/{project_id}/databases/(default)/documents";

#[derive(Error, Debug)]
pub enum FirestoreError {
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Client for the project's document database.
pub struct FirestoreClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl FirestoreClient {
    pub fn new(middleware: AuthMiddleware) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(middleware.clone())
            .build();

        let project_id = middleware.key.project_id.clone().unwrap_or_default();
        let base_url = FIRESTORE_V1_API.replace("{project_id}", &project_id);

        Self { client, base_url }
    }

    /// Same client against a custom endpoint, e.g. the emulator.
    pub fn new_with_url(middleware: AuthMiddleware, base_url: String) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(middleware)
            .build();

        Self { client, base_url }
    }

    #[cfg(test)]
    pub(crate) fn new_with_client(client: ClientWithMiddleware, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Reference to the top-level collection `collection_id`.
    pub fn collection(&'_ self, collection_id: &str) -> CollectionReference<'_> {
        CollectionReference {
            client: &self.client,
            path: format!("{}/{}", self.base_url, collection_id),
        }
    }

    /// Reference to the document at a slash-separated path such as
    /// `posts/my-first-post`.
    pub fn doc(&self, document_path: &str) -> DocumentReference<'_> {
        DocumentReference {
            client: &self.client,
            path: format!("{}/{}", self.base_url, document_path),
        }
    }
}
