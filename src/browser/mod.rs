//! Hierarchical browser over a flat object namespace.
//!
//! Buckets have no real directories; `/`-separated key prefixes stand in
//! for them. This module keeps that illusion consistent: a current path,
//! the listed level under it, folder creation through placeholder objects
//! and recursive deletes. Listings go through explicit begin/finish
//! transitions so a UI can drive the browser from any event loop without
//! racing itself.

mod listing;
mod ops;
mod path;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::storage::{ObjectStore, StorageError};

pub use listing::{list_entries, Entry, EntryKind, ListError};
pub use ops::{
    create_folder, delete_file, delete_folder, upload_file, CreateError, DeleteError,
    PLACEHOLDER_CONTENT, PLACEHOLDER_CONTENT_TYPE, PLACEHOLDER_NAME,
};
pub use path::StoragePath;

/// How long the URLs handed out by [`StorageBrowser::open_file`] stay
/// valid.
pub const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateKind {
    Folder,
    File,
}

/// An open create dialog: the name typed so far and the error from the
/// last failed submit, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDialog {
    pub kind: CreateKind,
    pub name: String,
    pub error: Option<String>,
}

impl CreateDialog {
    fn new(kind: CreateKind) -> Self {
        Self {
            kind,
            name: String::new(),
            error: None,
        }
    }
}

/// Proof that a listing was started. Hand it back to
/// [`StorageBrowser::finish_listing`] together with the outcome.
#[derive(Debug)]
pub struct ListingTicket {
    path: StoragePath,
}

impl ListingTicket {
    /// The path this listing was started for.
    pub fn path(&self) -> &StoragePath {
        &self.path
    }
}

/// Stateful view over an [`ObjectStore`], one folder level at a time.
pub struct StorageBrowser<S> {
    store: Arc<S>,
    path: StoragePath,
    entries: Vec<Entry>,
    pending: Option<StoragePath>,
    dialog: Option<CreateDialog>,
    error: Option<String>,
}

impl<S: ObjectStore> StorageBrowser<S> {
    /// Creates a browser rooted at the top of the store without loading
    /// anything. Use [`open`](Self::open) to load the root right away.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            path: StoragePath::root(),
            entries: Vec::new(),
            pending: None,
            dialog: None,
            error: None,
        }
    }

    /// Creates a browser and lists the root. A failed first listing still
    /// produces a browser; the failure lands in [`error`](Self::error)
    /// and the listing stays empty.
    pub async fn open(store: Arc<S>) -> Self {
        let mut browser = Self::new(store);
        browser.refresh().await;
        browser
    }

    pub fn path(&self) -> &StoragePath {
        &self.path
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Error from the last failed operation, cleared by the next
    /// successful listing.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn dialog(&self) -> Option<&CreateDialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut CreateDialog> {
        self.dialog.as_mut()
    }

    pub fn can_navigate_up(&self) -> bool {
        !self.path.is_root()
    }

    /// Marks a listing of `target` as in flight and flips the loading
    /// state. Returns `None` when a listing for that same path is already
    /// pending, so drivers do not stack duplicate requests.
    pub fn begin_listing(&mut self, target: StoragePath) -> Option<ListingTicket> {
        if self.pending.as_ref() == Some(&target) {
            return None;
        }
        self.pending = Some(target.clone());
        Some(ListingTicket { path: target })
    }

    /// Applies the outcome of a started listing. A result for a path the
    /// browser has since navigated away from is dropped. A failure leaves
    /// the current entries as they were and records the error.
    pub fn finish_listing(&mut self, ticket: ListingTicket, result: Result<Vec<Entry>, ListError>) {
        if self.pending.as_ref() == Some(&ticket.path) {
            self.pending = None;
        }
        if ticket.path != self.path {
            return;
        }
        match result {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Reloads the current path.
    pub async fn refresh(&mut self) {
        let ticket = match self.begin_listing(self.path.clone()) {
            Some(ticket) => ticket,
            None => return,
        };
        let result = list_entries(self.store.as_ref(), ticket.path()).await;
        self.finish_listing(ticket, result);
    }

    /// Descends into `folder_name` and reloads. The previous listing
    /// stays visible until the new one lands.
    pub async fn navigate_into(&mut self, folder_name: &str) {
        self.path = self.path.descend(folder_name);
        self.refresh().await;
    }

    /// Climbs one level and reloads. At the root this is a no-op.
    pub async fn navigate_up(&mut self) {
        if self.path.is_root() {
            return;
        }
        self.path = self.path.ascend();
        self.refresh().await;
    }

    /// Time-limited download URL for a file entry. Produced locally, so
    /// no state changes and no network round trip.
    pub fn open_file(&self, entry: &Entry) -> Result<String, StorageError> {
        self.store.download_url(&entry.full_path, DOWNLOAD_URL_TTL)
    }

    /// Deletes `entry`, recursively for folders, and reloads on success.
    /// On failure the listing is preserved and the error recorded.
    pub async fn request_delete(&mut self, entry: &Entry) {
        let result = match entry.kind {
            EntryKind::File => delete_file(self.store.as_ref(), &entry.full_path).await,
            EntryKind::Folder => delete_folder(self.store.as_ref(), &entry.full_path).await,
        };

        match result {
            Ok(()) => {
                self.error = None;
                self.refresh().await;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    pub fn open_folder_dialog(&mut self) {
        self.dialog = Some(CreateDialog::new(CreateKind::Folder));
    }

    pub fn open_upload_dialog(&mut self) {
        self.dialog = Some(CreateDialog::new(CreateKind::File));
    }

    pub fn cancel_dialog(&mut self) {
        self.dialog = None;
    }

    /// Submits the open folder dialog. On success the dialog closes and
    /// the listing reloads; on failure it stays open with its error set.
    pub async fn submit_folder(&mut self) {
        let name = match &self.dialog {
            Some(dialog) => dialog.name.clone(),
            None => return,
        };

        match create_folder(self.store.as_ref(), &self.path, &name).await {
            Ok(()) => {
                self.dialog = None;
                self.refresh().await;
            }
            Err(err) => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.error = Some(err.to_string());
                }
            }
        }
    }

    /// Submits the open upload dialog with the file contents. Success and
    /// failure behave as in [`submit_folder`](Self::submit_folder).
    pub async fn submit_file(&mut self, content: Bytes, content_type: &str) {
        let name = match &self.dialog {
            Some(dialog) => dialog.name.clone(),
            None => return,
        };

        match upload_file(self.store.as_ref(), &self.path, &name, content, content_type).await {
            Ok(()) => {
                self.dialog = None;
                self.refresh().await;
            }
            Err(err) => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.error = Some(err.to_string());
                }
            }
        }
    }
}
