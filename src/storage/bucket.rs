use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use yup_oauth2::ServiceAccountKey;

use crate::core::parse_error_response;

use super::object::{Object, ObjectMetadata};
use super::{ObjectStore, StorageError};

/// Result of a single listing call. With a delimiter in play, `prefixes`
/// holds the rolled-up key prefixes and `items` the objects directly under
/// the requested prefix, in the order the API returned them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectList {
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub items: Vec<ObjectMetadata>,
}

/// Handle to a single bucket. Cheap to clone.
#[derive(Clone)]
pub struct Bucket {
    client: ClientWithMiddleware,
    base_url: String,
    name: String,
    key: ServiceAccountKey,
}

impl Bucket {
    pub(crate) fn new(
        client: ClientWithMiddleware,
        base_url: String,
        name: String,
        key: ServiceAccountKey,
    ) -> Self {
        Self {
            client,
            base_url,
            name,
            key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a handle to the object stored under `key`. The object does
    /// not have to exist.
    pub fn object(&self, key: &str) -> Object {
        Object::new(
            self.client.clone(),
            self.base_url.clone(),
            self.name.clone(),
            key.to_string(),
            self.key.clone(),
        )
    }

    /// Lists objects under `prefix`. Passing a delimiter rolls keys with
    /// deeper separators up into `prefixes`.
    pub async fn list(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> Result<ObjectList, StorageError> {
        let url = format!("{}/b/{}/o", self.base_url, self.name);

        let mut params = vec![("prefix", prefix.to_string())];
        if let Some(delimiter) = delimiter {
            params.push(("delimiter", delimiter.to_string()));
        }

        let response = self.client.get(&url).query(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = parse_error_response(response, "Object listing failed").await;
            return Err(StorageError::ApiError(format!(
                "Object listing failed {}: {}",
                status, message
            )));
        }

        Ok(response.json::<ObjectList>().await?)
    }
}

#[async_trait]
impl ObjectStore for Bucket {
    async fn list_objects(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> Result<ObjectList, StorageError> {
        self.list(prefix, delimiter).await
    }

    async fn upload(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.object(key).upload(content, content_type).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.object(key).delete().await
    }

    fn download_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        self.object(key).signed_url(ttl)
    }
}
