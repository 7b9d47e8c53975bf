use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use super::*;
use crate::storage::{ObjectList, ObjectMetadata, ObjectStore, StorageError};

/// In-memory [`ObjectStore`] with the same rollup semantics as the real
/// listing API, plus switches that make individual calls fail.
#[derive(Default)]
struct MemoryStore {
    objects: Mutex<BTreeMap<String, (Bytes, String)>>,
    list_errors: Mutex<bool>,
    upload_errors: Mutex<bool>,
    delete_errors: Mutex<HashSet<String>>,
}

impl MemoryStore {
    fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    fn object(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    fn fail_listings(&self) {
        *self.list_errors.lock().unwrap() = true;
    }

    fn fail_uploads(&self) {
        *self.upload_errors.lock().unwrap() = true;
    }

    fn fail_delete_of(&self, key: &str) {
        self.delete_errors.lock().unwrap().insert(key.to_string());
    }
}

fn metadata_for(key: &str) -> ObjectMetadata {
    ObjectMetadata {
        name: Some(key.to_string()),
        ..Default::default()
    }
}

fn seeded(keys: &[&str]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::default());
    {
        let mut objects = store.objects.lock().unwrap();
        for key in keys {
            objects.insert(
                key.to_string(),
                (Bytes::from_static(b"data"), "application/octet-stream".to_string()),
            );
        }
    }
    store
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> Result<ObjectList, StorageError> {
        if *self.list_errors.lock().unwrap() {
            return Err(StorageError::ApiError("listing unavailable".to_string()));
        }

        let objects = self.objects.lock().unwrap();
        let mut prefixes = BTreeSet::new();
        let mut items = Vec::new();

        for key in objects.keys() {
            if !key.starts_with(prefix) {
                continue;
            }
            let rest = &key[prefix.len()..];
            match delimiter.and_then(|delimiter| rest.find(delimiter).map(|idx| (delimiter, idx))) {
                Some((delimiter, idx)) => {
                    prefixes.insert(format!("{}{}", prefix, &rest[..idx + delimiter.len()]));
                }
                None => items.push(metadata_for(key)),
            }
        }

        Ok(ObjectList {
            prefixes: prefixes.into_iter().collect(),
            items,
        })
    }

    async fn upload(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if *self.upload_errors.lock().unwrap() {
            return Err(StorageError::ApiError("upload rejected".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (content, content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.delete_errors.lock().unwrap().contains(key) {
            return Err(StorageError::ApiError(format!(
                "delete of '{}' rejected",
                key
            )));
        }
        match self.objects.lock().unwrap().remove(key) {
            Some(_) => Ok(()),
            None => Err(StorageError::ApiError(format!("No such object: {}", key))),
        }
    }

    fn download_url(&self, key: &str, _ttl: Duration) -> Result<String, StorageError> {
        Ok(format!("memory://{}", key))
    }
}

#[test]
fn path_descend_then_ascend_returns_parent() {
    let root = StoragePath::root();
    let images = root.descend("images");
    let vacation = images.descend("vacation");

    assert_eq!(vacation.as_str(), "images/vacation");
    assert_eq!(vacation.name(), "vacation");
    assert_eq!(vacation.ascend(), images);
    assert_eq!(images.ascend(), root);
    assert_eq!(root.ascend(), root);
}

#[test]
fn path_list_prefix_is_empty_at_root() {
    assert_eq!(StoragePath::root().as_list_prefix(), "");

    let nested = StoragePath::root().descend("a").descend("b");
    assert_eq!(nested.as_list_prefix(), "a/b/");
}

#[tokio::test]
async fn root_listing_puts_folders_before_files() {
    let store = seeded(&["readme.txt", "images/photo.png"]);
    let browser = StorageBrowser::open(store).await;

    let entries = browser.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[0],
        Entry {
            name: "images".to_string(),
            full_path: "images".to_string(),
            kind: EntryKind::Folder,
        }
    );
    assert_eq!(
        entries[1],
        Entry {
            name: "readme.txt".to_string(),
            full_path: "readme.txt".to_string(),
            kind: EntryKind::File,
        }
    );
    assert!(browser.error().is_none());
    assert!(!browser.is_loading());
}

#[tokio::test]
async fn navigating_descends_and_climbs() {
    let store = seeded(&["images/photo.png", "images/vacation/beach.png"]);
    let mut browser = StorageBrowser::open(store).await;

    browser.navigate_into("images").await;
    assert_eq!(browser.path().as_str(), "images");
    assert!(browser.can_navigate_up());

    let entries = browser.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, EntryKind::Folder);
    assert_eq!(entries[0].full_path, "images/vacation");
    assert_eq!(entries[1].name, "photo.png");
    assert_eq!(entries[1].full_path, "images/photo.png");

    browser.navigate_up().await;
    assert_eq!(browser.path().as_str(), "");
    assert_eq!(browser.entries().len(), 1);
}

#[tokio::test]
async fn navigate_up_at_root_is_a_no_op() {
    let store = seeded(&["readme.txt"]);
    let mut browser = StorageBrowser::open(store).await;

    assert!(!browser.can_navigate_up());
    browser.navigate_up().await;

    assert_eq!(browser.path().as_str(), "");
    assert_eq!(browser.entries().len(), 1);
}

#[tokio::test]
async fn folder_marker_object_is_not_listed_as_an_entry() {
    let store = seeded(&["docs/", "docs/guide.pdf"]);
    let mut browser = StorageBrowser::open(store).await;

    let names: Vec<_> = browser.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["docs"]);

    browser.navigate_into("docs").await;
    let names: Vec<_> = browser.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["guide.pdf"]);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_listing() {
    let store = seeded(&["a.txt", "b.txt", "c/d.txt"]);
    let mut browser = StorageBrowser::open(store.clone()).await;
    assert_eq!(browser.entries().len(), 3);

    store.fail_listings();
    browser.refresh().await;

    assert_eq!(browser.entries().len(), 3);
    assert!(browser.error().unwrap().contains("listing unavailable"));
    assert!(!browser.is_loading());
}

#[tokio::test]
async fn open_with_unavailable_listing_reports_error() {
    let store = seeded(&["a.txt"]);
    store.fail_listings();

    let browser = StorageBrowser::open(store).await;

    assert!(browser.entries().is_empty());
    assert!(browser.error().is_some());
}

#[tokio::test]
async fn stale_listing_result_is_dropped() {
    let store = seeded(&["images/photo.png", "readme.txt"]);
    let mut browser = StorageBrowser::open(store.clone()).await;

    // Start a root listing, then navigate away before handing back the
    // outcome.
    let ticket = browser.begin_listing(StoragePath::root()).unwrap();
    browser.navigate_into("images").await;
    let in_images = browser.entries().to_vec();

    let result = list_entries(store.as_ref(), ticket.path()).await;
    browser.finish_listing(ticket, result);

    assert_eq!(browser.path().as_str(), "images");
    assert_eq!(browser.entries(), in_images.as_slice());
    assert!(!browser.is_loading());
}

#[tokio::test]
async fn duplicate_listing_for_same_path_is_refused() {
    let store = seeded(&[]);
    let mut browser = StorageBrowser::new(store);

    let first = browser.begin_listing(StoragePath::root());
    let second = browser.begin_listing(StoragePath::root());

    assert!(first.is_some());
    assert!(second.is_none());
    assert!(browser.is_loading());

    // A different target is a new listing, not a duplicate.
    let other = browser.begin_listing(StoragePath::root().descend("images"));
    assert!(other.is_some());
}

#[tokio::test]
async fn deleting_a_file_refreshes_the_listing() {
    let store = seeded(&["a.txt", "b.txt"]);
    let mut browser = StorageBrowser::open(store.clone()).await;

    let entry = browser.entries()[0].clone();
    assert_eq!(entry.name, "a.txt");
    browser.request_delete(&entry).await;

    assert!(browser.error().is_none());
    assert_eq!(browser.entries().len(), 1);
    assert_eq!(browser.entries()[0].name, "b.txt");
    assert!(!store.contains("a.txt"));
}

#[tokio::test]
async fn failed_delete_keeps_listing_and_reports() {
    let store = seeded(&["a.txt", "b.txt"]);
    store.fail_delete_of("a.txt");
    let mut browser = StorageBrowser::open(store.clone()).await;

    let entry = browser.entries()[0].clone();
    browser.request_delete(&entry).await;

    assert_eq!(browser.entries().len(), 2);
    assert!(browser.error().unwrap().contains("could not delete 'a.txt'"));
    assert!(store.contains("a.txt"));
}

#[tokio::test]
async fn deleting_a_folder_removes_the_whole_subtree() {
    let store = seeded(&[
        "images/photo.png",
        "images/vacation/beach.png",
        "images/vacation/sunset.png",
        "readme.txt",
    ]);
    let mut browser = StorageBrowser::open(store.clone()).await;

    let folder = browser.entries()[0].clone();
    assert_eq!(folder.kind, EntryKind::Folder);
    browser.request_delete(&folder).await;

    assert!(browser.error().is_none());
    assert_eq!(store.keys(), ["readme.txt"]);
    assert_eq!(browser.entries().len(), 1);
}

#[tokio::test]
async fn partial_folder_delete_reports_and_keeps_listing() {
    let store = seeded(&["images/a.png", "images/b.png", "images/c.png"]);
    store.fail_delete_of("images/b.png");
    let mut browser = StorageBrowser::open(store.clone()).await;

    let folder = browser.entries()[0].clone();
    browser.request_delete(&folder).await;

    assert!(browser.error().unwrap().contains("1 of 3"));
    // The two deletable objects are gone regardless of the failure.
    assert_eq!(store.keys(), ["images/b.png"]);
    assert_eq!(browser.entries().len(), 1);
    assert_eq!(browser.entries()[0].name, "images");
}

#[tokio::test]
async fn creating_a_folder_uploads_a_placeholder() {
    let store = seeded(&["readme.txt"]);
    let mut browser = StorageBrowser::open(store.clone()).await;

    browser.open_folder_dialog();
    browser.dialog_mut().unwrap().name = "drafts".to_string();
    browser.submit_folder().await;

    assert!(browser.dialog().is_none());
    let (content, content_type) = store.object("drafts/placeholder.txt").unwrap();
    assert_eq!(content, Bytes::from_static(b"placeholder"));
    assert_eq!(content_type, "text/plain");
    assert_eq!(
        browser.entries()[0],
        Entry {
            name: "drafts".to_string(),
            full_path: "drafts".to_string(),
            kind: EntryKind::Folder,
        }
    );
}

#[tokio::test]
async fn folder_names_are_trimmed_and_must_not_be_empty() {
    let store = seeded(&[]);
    let mut browser = StorageBrowser::open(store.clone()).await;

    browser.open_folder_dialog();
    browser.dialog_mut().unwrap().name = "   ".to_string();
    browser.submit_folder().await;

    let dialog = browser.dialog().unwrap();
    assert_eq!(dialog.error.as_deref(), Some("name must not be empty"));
    assert!(store.keys().is_empty());

    browser.dialog_mut().unwrap().name = "  drafts  ".to_string();
    browser.submit_folder().await;

    assert!(browser.dialog().is_none());
    assert!(store.contains("drafts/placeholder.txt"));
}

#[tokio::test]
async fn failed_create_keeps_the_dialog_open() {
    let store = seeded(&[]);
    store.fail_uploads();
    let mut browser = StorageBrowser::open(store.clone()).await;

    browser.open_folder_dialog();
    browser.dialog_mut().unwrap().name = "drafts".to_string();
    browser.submit_folder().await;

    let dialog = browser.dialog().unwrap();
    assert_eq!(dialog.kind, CreateKind::Folder);
    assert_eq!(dialog.name, "drafts");
    assert!(dialog.error.as_deref().unwrap().contains("upload rejected"));

    browser.cancel_dialog();
    assert!(browser.dialog().is_none());
}

#[tokio::test]
async fn uploading_a_file_lands_under_the_current_path() {
    let store = seeded(&["docs/placeholder.txt"]);
    let mut browser = StorageBrowser::open(store.clone()).await;
    browser.navigate_into("docs").await;

    browser.open_upload_dialog();
    browser.dialog_mut().unwrap().name = "notes.txt".to_string();
    browser
        .submit_file(Bytes::from_static(b"hello"), "text/plain")
        .await;

    assert!(browser.dialog().is_none());
    assert!(store.contains("docs/notes.txt"));
    let names: Vec<_> = browser.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["notes.txt", "placeholder.txt"]);
}

#[tokio::test]
async fn open_file_hands_out_a_download_url() {
    let store = seeded(&["images/photo.png"]);
    let mut browser = StorageBrowser::open(store).await;
    browser.navigate_into("images").await;

    let entry = browser.entries()[0].clone();
    let url = browser.open_file(&entry).unwrap();

    assert_eq!(url, "memory://images/photo.png");
}
