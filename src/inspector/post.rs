use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PostError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("post type not chosen")]
    MissingType,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Blog,
    Article,
}

/// A post as stored in the `posts` collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub title: String,
    pub subtitle: String,
    pub date_written: String,
    /// Document id, derived from the title; see [`generate_path`].
    pub path: String,
    pub post_type: PostType,
    pub image_urls: Vec<String>,
    pub main_text: Vec<String>,
}

/// Document id for a post title: lowercased with all whitespace removed,
/// so "My First Post" stores under `posts/myfirstpost`.
pub fn generate_path(title: &str) -> String {
    title.to_lowercase().split_whitespace().collect()
}

/// In-progress post, as typed so far. The two array fields start out with
/// one empty slot each so there is always a row to type into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub subtitle: String,
    pub date_written: String,
    pub post_type: Option<PostType>,
    pub image_urls: Vec<String>,
    pub main_text: Vec<String>,
}

impl Default for PostDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            date_written: String::new(),
            post_type: None,
            image_urls: vec![String::new()],
            main_text: vec![String::new()],
        }
    }
}

impl PostDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path the post will store under, kept in sync with the title.
    pub fn path(&self) -> String {
        generate_path(&self.title)
    }

    pub fn add_image_url(&mut self) {
        self.image_urls.push(String::new());
    }

    /// Out-of-range indices are ignored, as are out-of-range updates.
    pub fn remove_image_url(&mut self, index: usize) {
        if index < self.image_urls.len() {
            self.image_urls.remove(index);
        }
    }

    pub fn set_image_url(&mut self, index: usize, value: &str) {
        if let Some(slot) = self.image_urls.get_mut(index) {
            *slot = value.to_string();
        }
    }

    pub fn add_paragraph(&mut self) {
        self.main_text.push(String::new());
    }

    pub fn remove_paragraph(&mut self, index: usize) {
        if index < self.main_text.len() {
            self.main_text.remove(index);
        }
    }

    pub fn set_paragraph(&mut self, index: usize, value: &str) {
        if let Some(slot) = self.main_text.get_mut(index) {
            *slot = value.to_string();
        }
    }

    /// Turns the draft into a storable [`Post`]. Requires a non-empty
    /// title (the path derives from it) and a chosen post type; empty
    /// array slots are dropped on the way out.
    pub fn finish(&self) -> Result<Post, PostError> {
        let path = self.path();
        if path.is_empty() {
            return Err(PostError::EmptyTitle);
        }
        let post_type = self.post_type.ok_or(PostError::MissingType)?;

        let keep_filled = |values: &[String]| -> Vec<String> {
            values
                .iter()
                .filter(|value| !value.trim().is_empty())
                .cloned()
                .collect()
        };

        Ok(Post {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            date_written: self.date_written.clone(),
            path,
            post_type,
            image_urls: keep_filled(&self.image_urls),
            main_text: keep_filled(&self.main_text),
        })
    }
}
