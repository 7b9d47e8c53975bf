pub mod middleware;

use serde::Deserialize;

/// Error envelope returned by Google JSON APIs (Firestore, Cloud Storage,
/// Identity Toolkit all share it).
#[derive(Debug, Deserialize)]
pub struct GoogleErrorResponse {
    pub error: GoogleErrorDetails,
}

#[derive(Debug, Deserialize)]
pub struct GoogleErrorDetails {
    pub code: u16,
    pub message: String,
    pub status: Option<String>,
    pub errors: Option<Vec<GoogleSubError>>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleSubError {
    pub message: String,
    pub domain: Option<String>,
    pub reason: Option<String>,
}

impl GoogleErrorResponse {
    pub fn display_message(&self) -> String {
        format!("{} (code: {})", self.error.message, self.error.code)
    }
}

/// Reads a failed response body as the Google error envelope, falling back
/// to `default_msg` plus the HTTP status when the body is something else.
pub async fn parse_error_response(response: reqwest::Response, default_msg: &str) -> String {
    let status = response.status();
    match response.json::<GoogleErrorResponse>().await {
        Ok(error_resp) => error_resp.display_message(),
        Err(_) => format!("{}: {}", default_msg, status),
    }
}
