use thiserror::Error;

use crate::storage::{ObjectList, ObjectStore, StorageError};

use super::path::StoragePath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    File,
}

/// One row of a folder listing: a subfolder or an object directly under
/// the listed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Base name shown to the user, never containing `/`.
    pub name: String,
    /// Folder path (no trailing `/`) or full object key.
    pub full_path: String,
    pub kind: EntryKind,
}

#[derive(Debug, Error)]
#[error("listing '{path}' failed: {source}")]
pub struct ListError {
    pub path: String,
    #[source]
    pub source: StorageError,
}

/// Fetches one level of the hierarchy under `path`: subfolders first,
/// then files, each group in the order the backend returned it.
pub async fn list_entries<S: ObjectStore>(
    store: &S,
    path: &StoragePath,
) -> Result<Vec<Entry>, ListError> {
    let prefix = path.as_list_prefix();
    let listing = store
        .list_objects(&prefix, Some("/"))
        .await
        .map_err(|source| ListError {
            path: path.to_string(),
            source,
        })?;

    Ok(build_entries(&prefix, &listing))
}

pub(super) fn build_entries(prefix: &str, listing: &ObjectList) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(listing.prefixes.len() + listing.items.len());

    for rolled_up in &listing.prefixes {
        let full_path = rolled_up.trim_end_matches('/');
        let name = match full_path.rfind('/') {
            Some(idx) => &full_path[idx + 1..],
            None => full_path,
        };
        if name.is_empty() {
            continue;
        }
        entries.push(Entry {
            name: name.to_string(),
            full_path: full_path.to_string(),
            kind: EntryKind::Folder,
        });
    }

    for item in &listing.items {
        let key = match item.name.as_deref() {
            Some(key) => key,
            None => continue,
        };
        // A marker object holding the folder itself open lists under its
        // own prefix; it is not a row.
        if key == prefix {
            continue;
        }
        let name = key.strip_prefix(prefix).unwrap_or(key);
        if name.is_empty() {
            continue;
        }
        entries.push(Entry {
            name: name.to_string(),
            full_path: key.to_string(),
            kind: EntryKind::File,
        });
    }

    entries
}
