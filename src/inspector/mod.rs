//! Read side of the document database: a fixed set of collections, each
//! expandable to its documents, with one document selected for display at
//! a time. Collections are fetched on first expand and kept until
//! something writes to them; failures leave whatever is on screen alone
//! and only record an error.

mod post;


use std::collections::{HashMap, HashSet};

use crate::firestore::models::DocumentItem;
use crate::firestore::FirestoreClient;

pub use post::{generate_path, Post, PostDraft, PostError, PostType};

/// Top-level collections the console knows about.
pub const COLLECTIONS: [&str; 5] = ["aboutMe", "generic", "posts", "projects", "userSubmissions"];

/// An open post form: the draft typed so far and the error from the last
/// failed submit, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostForm {
    pub draft: PostDraft,
    pub error: Option<String>,
}

/// Stateful view over the project's Firestore collections.
pub struct DocumentInspector {
    firestore: FirestoreClient,
    open: HashSet<String>,
    documents: HashMap<String, Vec<DocumentItem>>,
    selected: Option<DocumentItem>,
    form: Option<PostForm>,
    error: Option<String>,
}

impl DocumentInspector {
    pub fn new(firestore: FirestoreClient) -> Self {
        Self {
            firestore,
            open: HashSet::new(),
            documents: HashMap::new(),
            selected: None,
            form: None,
            error: None,
        }
    }

    pub fn collections(&self) -> &'static [&'static str] {
        &COLLECTIONS
    }

    pub fn is_open(&self, collection: &str) -> bool {
        self.open.contains(collection)
    }

    /// Documents of a collection, once fetched. `None` until the first
    /// successful fetch.
    pub fn documents(&self, collection: &str) -> Option<&[DocumentItem]> {
        self.documents.get(collection).map(Vec::as_slice)
    }

    pub fn selected(&self) -> Option<&DocumentItem> {
        self.selected.as_ref()
    }

    pub fn form(&self) -> Option<&PostForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut PostForm> {
        self.form.as_mut()
    }

    /// Error from the last failed operation, cleared by the next
    /// successful one.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Expands or collapses a collection. The first expand fetches its
    /// documents; afterwards the cached listing is shown. A failed fetch
    /// leaves the collection expanded but empty and records the error, so
    /// collapsing and expanding again retries.
    pub async fn toggle_collection(&mut self, collection: &str) {
        if !self.open.insert(collection.to_string()) {
            self.open.remove(collection);
            return;
        }

        if self.documents.contains_key(collection) {
            return;
        }

        match self.firestore.collection(collection).list().await {
            Ok(items) => {
                self.documents.insert(collection.to_string(), items);
                self.error = None;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Fetches one document and makes it the displayed one, replacing any
    /// previous selection wholesale. A missing document is a failure; the
    /// previous selection stays put.
    pub async fn select_document(&mut self, collection: &str, document_id: &str) {
        match self.firestore.collection(collection).doc(document_id).get().await {
            Ok(Some(item)) => {
                self.selected = Some(item);
                self.error = None;
            }
            Ok(None) => {
                self.error = Some(format!(
                    "Document '{}/{}' not found",
                    collection, document_id
                ));
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn open_post_form(&mut self) {
        self.form = Some(PostForm {
            draft: PostDraft::new(),
            error: None,
        });
    }

    pub fn cancel_post_form(&mut self) {
        self.form = None;
    }

    /// Submits the open post form. On success the post is written under
    /// its derived path, the form closes and the cached `posts` listing
    /// is dropped so the next expand refetches it. On failure the form
    /// stays open with its error set.
    pub async fn submit_post(&mut self) {
        let draft = match &self.form {
            Some(form) => form.draft.clone(),
            None => return,
        };

        let result = match draft.finish() {
            Ok(post) => self
                .firestore
                .collection("posts")
                .doc(&post.path)
                .set(&post)
                .await
                .map_err(|err| err.to_string()),
            Err(err) => Err(err.to_string()),
        };

        match result {
            Ok(()) => {
                self.form = None;
                self.documents.remove("posts");
            }
            Err(message) => {
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(message);
                }
            }
        }
    }
}
