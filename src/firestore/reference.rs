use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;

use crate::core::parse_error_response;

use super::models::{
    fields_from_serializable, Document, DocumentItem, ListDocumentsResponse,
};
use super::FirestoreError;

#[derive(Clone)]
pub struct DocumentReference<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) path: String,
}

impl<'a> DocumentReference<'a> {
    /// Fetches the document, or `None` when it does not exist.
    pub async fn get(&self) -> Result<Option<DocumentItem>, FirestoreError> {
        let response = self.client.get(&self.path).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let message = parse_error_response(response, "Get document failed").await;
            return Err(FirestoreError::ApiError(format!(
                "Get document failed {}: {}",
                status, message
            )));
        }

        let doc: Document = response.json().await?;
        Ok(Some(DocumentItem::try_from(doc)?))
    }

    /// Creates or fully replaces the document at this id.
    pub async fn set<T: Serialize>(&self, value: &T) -> Result<(), FirestoreError> {
        let fields = fields_from_serializable(value)?;
        let body = serde_json::to_vec(&serde_json::json!({ "fields": fields }))?;

        let response = self
            .client
            .patch(&self.path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = parse_error_response(response, "Set document failed").await;
            return Err(FirestoreError::ApiError(format!(
                "Set document failed {}: {}",
                status, message
            )));
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct CollectionReference<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) path: String,
}

impl<'a> CollectionReference<'a> {
    pub fn doc(&self, document_id: &str) -> DocumentReference<'a> {
        DocumentReference {
            client: self.client,
            path: format!("{}/{}", self.path, document_id),
        }
    }

    /// Fetches the documents of this collection, one page worth, in the
    /// order the API returned them.
    pub async fn list(&self) -> Result<Vec<DocumentItem>, FirestoreError> {
        let response = self.client.get(&self.path).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = parse_error_response(response, "List documents failed").await;
            return Err(FirestoreError::ApiError(format!(
                "List documents failed {}: {}",
                status, message
            )));
        }

        let list: ListDocumentsResponse = response.json().await?;
        list.documents
            .into_iter()
            .map(DocumentItem::try_from)
            .collect()
    }

    /// Creates a document with a server-generated id. Returns the stored
    /// document as the server reports it.
    pub async fn add<T: Serialize>(&self, value: &T) -> Result<DocumentItem, FirestoreError> {
        let fields = fields_from_serializable(value)?;
        let body = serde_json::to_vec(&serde_json::json!({ "fields": fields }))?;

        let response = self
            .client
            .post(&self.path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = parse_error_response(response, "Add document failed").await;
            return Err(FirestoreError::ApiError(format!(
                "Add document failed {}: {}",
                status, message
            )));
        }

        let doc: Document = response.json().await?;
        DocumentItem::try_from(doc)
    }
}
