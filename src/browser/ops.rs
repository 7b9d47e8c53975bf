use bytes::Bytes;
use futures::future::join_all;
use thiserror::Error;

use crate::storage::{ObjectStore, StorageError};

use super::path::StoragePath;

/// Object uploaded to keep an otherwise empty folder visible. A flat
/// namespace has no way to store an empty prefix, so creating a folder
/// means creating this file inside it.
pub const PLACEHOLDER_NAME: &str = "placeholder.txt";
pub const PLACEHOLDER_CONTENT: &[u8] = b"placeholder";
pub const PLACEHOLDER_CONTENT_TYPE: &str = "text/plain";

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("could not enumerate folder contents: {0}")]
    Enumerate(#[source] StorageError),
    #[error("could not delete '{key}': {source}")]
    Object {
        key: String,
        #[source]
        source: StorageError,
    },
    #[error("{} of {} objects failed to delete", .failed.len(), .total)]
    Partial {
        total: usize,
        failed: Vec<(String, StorageError)>,
    },
}

#[derive(Debug, Error)]
pub enum CreateError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("upload failed: {0}")]
    Upload(#[source] StorageError),
}

/// Deletes a single object.
pub async fn delete_file<S: ObjectStore>(store: &S, key: &str) -> Result<(), DeleteError> {
    store.delete(key).await.map_err(|source| DeleteError::Object {
        key: key.to_string(),
        source,
    })
}

/// Deletes everything under `folder_path`. The whole subtree is
/// enumerated in one non-delimited listing, then deleted concurrently.
/// Every deletion is attempted even when some of them fail; the failures
/// come back in [`DeleteError::Partial`].
pub async fn delete_folder<S: ObjectStore>(store: &S, folder_path: &str) -> Result<(), DeleteError> {
    let prefix = format!("{}/", folder_path.trim_end_matches('/'));
    let listing = store
        .list_objects(&prefix, None)
        .await
        .map_err(DeleteError::Enumerate)?;

    let keys: Vec<String> = listing
        .items
        .iter()
        .filter_map(|item| item.name.clone())
        .collect();

    let total = keys.len();
    let results = join_all(keys.iter().map(|key| store.delete(key))).await;

    let failed: Vec<(String, StorageError)> = keys
        .into_iter()
        .zip(results)
        .filter_map(|(key, result)| result.err().map(|err| (key, err)))
        .collect();

    if failed.is_empty() {
        Ok(())
    } else {
        Err(DeleteError::Partial { total, failed })
    }
}

/// Creates the folder `name` under `parent` by uploading the placeholder
/// object that holds the prefix open. The name is trimmed first.
pub async fn create_folder<S: ObjectStore>(
    store: &S,
    parent: &StoragePath,
    name: &str,
) -> Result<(), CreateError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CreateError::EmptyName);
    }

    let key = parent.descend(name).descend(PLACEHOLDER_NAME);
    store
        .upload(
            key.as_str(),
            Bytes::from_static(PLACEHOLDER_CONTENT),
            PLACEHOLDER_CONTENT_TYPE,
        )
        .await
        .map_err(CreateError::Upload)
}

/// Uploads `content` as `name` directly under `parent`. The name is
/// trimmed first.
pub async fn upload_file<S: ObjectStore>(
    store: &S,
    parent: &StoragePath,
    name: &str,
    content: Bytes,
    content_type: &str,
) -> Result<(), CreateError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CreateError::EmptyName);
    }

    store
        .upload(parent.descend(name).as_str(), content, content_type)
        .await
        .map_err(CreateError::Upload)
}
