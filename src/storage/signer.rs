//! V4 signed URL generation (GOOG4-RSA-SHA256), performed locally with
//! the service account private key. No network calls involved.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Digest, Sha256};
use yup_oauth2::ServiceAccountKey;

use super::StorageError;

const SIGNING_ALGORITHM: &str = "GOOG4-RSA-SHA256";
const STORAGE_HOST: &str = "storage.googleapis.com";

pub(super) fn sign_download_url(
    key: &ServiceAccountKey,
    bucket: &str,
    object: &str,
    ttl: Duration,
) -> Result<String, StorageError> {
    sign_download_url_at(key, bucket, object, ttl, Utc::now())
}

pub(super) fn sign_download_url_at(
    key: &ServiceAccountKey,
    bucket: &str,
    object: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, StorageError> {
    let datestamp = now.format("%Y%m%d").to_string();
    let timestamp = now.format("%Y%m%dT%H%M%SZ").to_string();

    let scope = format!("{}/auto/storage/goog4_request", datestamp);
    let credential = format!("{}/{}", key.client_email, scope);
    let expires = ttl.as_secs().to_string();

    let canonical_uri = format!("/{}/{}", bucket, percent_encode(object, true));
    let host_header = format!("host:{}", STORAGE_HOST);

    // Query parameters must be sorted by name; this list already is.
    let query_params = [
        ("X-Goog-Algorithm", SIGNING_ALGORITHM),
        ("X-Goog-Credential", credential.as_str()),
        ("X-Goog-Date", timestamp.as_str()),
        ("X-Goog-Expires", expires.as_str()),
        ("X-Goog-SignedHeaders", "host"),
    ];
    let canonical_query = query_params
        .iter()
        .map(|(name, value)| format!("{}={}", name, percent_encode(value, false)))
        .collect::<Vec<_>>()
        .join("&");

    let canonical_request = [
        "GET",
        canonical_uri.as_str(),
        canonical_query.as_str(),
        host_header.as_str(),
        "",
        "host",
        "UNSIGNED-PAYLOAD",
    ]
    .join("\n");

    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        SIGNING_ALGORITHM,
        timestamp,
        scope,
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let private_key = RsaPrivateKey::from_pkcs8_pem(&key.private_key)
        .map_err(|err| StorageError::SigningError(format!("invalid private key: {}", err)))?;
    let digest = Sha256::digest(string_to_sign.as_bytes());
    let signature = private_key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(|err| StorageError::SigningError(err.to_string()))?;

    Ok(format!(
        "https://{}{}?{}&X-Goog-Signature={}",
        STORAGE_HOST,
        canonical_uri,
        canonical_query,
        hex::encode(signature)
    ))
}

/// Strict RFC 3986 percent-encoding. Keeps `/` when encoding a path,
/// encodes it when encoding a query value or a single path segment.
pub(super) fn percent_encode(input: &str, keep_slashes: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for &byte in input.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if keep_slashes => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
