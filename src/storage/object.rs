use std::time::Duration;

use bytes::Bytes;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use yup_oauth2::ServiceAccountKey;

use crate::core::parse_error_response;

use super::signer;
use super::StorageError;

/// Object metadata as the JSON API reports it. Numeric fields such as
/// `size` and `generation` come back as decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub name: Option<String>,
    pub bucket: Option<String>,
    pub content_type: Option<String>,
    pub size: Option<String>,
    pub time_created: Option<String>,
    pub updated: Option<String>,
    pub md5_hash: Option<String>,
    pub generation: Option<String>,
}

/// Handle to one object within a bucket.
pub struct Object {
    client: ClientWithMiddleware,
    base_url: String,
    bucket: String,
    name: String,
    key: ServiceAccountKey,
}

impl Object {
    pub(crate) fn new(
        client: ClientWithMiddleware,
        base_url: String,
        bucket: String,
        name: String,
        key: ServiceAccountKey,
    ) -> Self {
        Self {
            client,
            base_url,
            bucket,
            name,
            key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // The object name is a single path segment in the API, so its own
    // slashes must be encoded as well.
    fn encoded_name(&self) -> String {
        signer::percent_encode(&self.name, false)
    }

    fn upload_base(&self) -> String {
        if self.base_url.ends_with("/storage/v1") {
            self.base_url.replace("/storage/v1", "/upload/storage/v1")
        } else {
            format!("{}/upload/storage/v1", self.base_url)
        }
    }

    /// Uploads `content` as this object via simple media upload,
    /// overwriting any previous generation.
    pub async fn upload(&self, content: Bytes, content_type: &str) -> Result<(), StorageError> {
        let url = format!("{}/b/{}/o", self.upload_base(), self.bucket);

        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", self.name.as_str())])
            .header("Content-Type", content_type)
            .body(content)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = parse_error_response(response, "Upload failed").await;
            return Err(StorageError::ApiError(format!(
                "Upload failed {}: {}",
                status, message
            )));
        }

        Ok(())
    }

    /// Deletes this object. Deleting a missing object is an `ApiError`
    /// carrying the 404 from the API.
    pub async fn delete(&self) -> Result<(), StorageError> {
        let url = format!(
            "{}/b/{}/o/{}",
            self.base_url,
            self.bucket,
            self.encoded_name()
        );

        let response = self.client.delete(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = parse_error_response(response, "Delete failed").await;
            return Err(StorageError::ApiError(format!(
                "Delete failed {}: {}",
                status, message
            )));
        }

        Ok(())
    }

    /// Builds a V4 signed GET URL for this object, valid for `ttl` from
    /// now. Signing happens locally with the service account private key.
    pub fn signed_url(&self, ttl: Duration) -> Result<String, StorageError> {
        signer::sign_download_url(&self.key, &self.bucket, &self.name, ttl)
    }
}
