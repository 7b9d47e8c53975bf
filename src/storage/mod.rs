//! Cloud Storage client: bucket listing, uploads, deletes and V4 signed
//! download URLs over the JSON API.

mod bucket;
mod object;
mod signer;

#[cfg(test)]
mod tests;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use thiserror::Error;
use yup_oauth2::ServiceAccountKey;

pub use bucket::{Bucket, ObjectList};
pub use object::{Object, ObjectMetadata};

use crate::core::middleware::AuthMiddleware;

const STORAGE_V1_API: &str = "https://storage.googleapis.com/storage/v1";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("URL signing failed: {0}")]
    SigningError(String),
}

/// Flat blob store operations a bucket exposes to higher layers.
///
/// Object keys are plain strings; any hierarchy is a convention imposed by
/// callers through `/`-separated prefixes and the listing delimiter.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists objects whose keys start with `prefix`. With a delimiter the
    /// result is rolled up: keys containing the delimiter past the prefix
    /// collapse into `prefixes`, the rest come back as `items`.
    async fn list_objects(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> Result<ObjectList, StorageError>;

    /// Uploads `content` under `key`, overwriting any existing object.
    async fn upload(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Deletes the object stored under `key`.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Produces a time-limited download URL for `key` without any network
    /// round trip. The URL is valid for `ttl` from now.
    fn download_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;
}

pub struct StorageClient {
    client: ClientWithMiddleware,
    base_url: String,
    key: ServiceAccountKey,
}

impl StorageClient {
    pub fn new(middleware: AuthMiddleware) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let key = middleware.key.clone();
        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(middleware)
            .build();

        Self {
            client,
            base_url: STORAGE_V1_API.to_string(),
            key,
        }
    }

    #[cfg(test)]
    pub(crate) fn new_with_client(
        client: ClientWithMiddleware,
        base_url: String,
        key: ServiceAccountKey,
    ) -> Self {
        Self {
            client,
            base_url,
            key,
        }
    }

    /// Returns a handle to `name`, or to the project default bucket
    /// (`{project_id}.appspot.com`) when `name` is `None`.
    pub fn bucket(&self, name: Option<&str>) -> Bucket {
        let bucket_name = match name {
            Some(name) => name.to_string(),
            None => format!(
                "{}.appspot.com",
                self.key.project_id.clone().unwrap_or_default()
            ),
        };

        Bucket::new(
            self.client.clone(),
            self.base_url.clone(),
            bucket_name,
            self.key.clone(),
        )
    }
}
