//! Storage module - Thin client for the Supabase Storage HTTP API.
//!
//! Covers the three calls a sync run needs:
//! - Create a bucket (409 means it already exists, which is fine)
//! - Delete an object (best-effort cleanup before overwrite)
//! - Create an object from raw bytes with a content-type
//!
//! All requests carry the bearer access token plus the project `apikey`
//! header. Responses outside the expected statuses surface as
//! [`StorageError::Status`] with a truncated body excerpt.

use serde::Serialize;
use thiserror::Error;

/// Max response-body characters kept in an error reason.
const BODY_EXCERPT_LEN: usize = 100;

/// Errors from a single Storage API call.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Server answered with an unexpected HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request never completed (connection, TLS, timeout, ...).
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Result of a bucket-creation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    /// Bucket was created by this call.
    Created,
    /// Bucket already existed (HTTP 409).
    AlreadyExists,
}

/// Request body for `POST /storage/v1/bucket`.
#[derive(Serialize)]
struct CreateBucketRequest<'a> {
    id: &'a str,
    name: &'a str,
    public: bool,
}

/// Blocking client for one Supabase project's Storage API.
pub struct StorageClient {
    client: reqwest::blocking::Client,
    base_url: String,
    bucket: String,
    access_token: String,
    api_key: String,
}

impl StorageClient {
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        access_token: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
            bucket: bucket.into(),
            access_token: access_token.into(),
            api_key: api_key.into(),
        }
    }

    /// Attempt to create the bucket.
    ///
    /// 200/201 means created, 409 means it already exists; both are success
    /// for our purposes. Anything else is an error with the status and a
    /// body excerpt.
    pub fn create_bucket(&self, public: bool) -> Result<BucketStatus, StorageError> {
        let request = CreateBucketRequest {
            id: &self.bucket,
            name: &self.bucket,
            public,
        };

        let response = self
            .client
            .post(format!("{}/storage/v1/bucket", self.base_url))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("apikey", &self.api_key)
            .json(&request)
            .send()?;

        match response.status().as_u16() {
            200 | 201 => Ok(BucketStatus::Created),
            409 => Ok(BucketStatus::AlreadyExists),
            status => Err(StorageError::Status {
                status,
                body: body_excerpt(response),
            }),
        }
    }

    /// Delete the object at `key`.
    ///
    /// Used as best-effort cleanup before an upload; the object may not
    /// exist, so callers typically ignore the result.
    pub fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(self.object_url(key))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("apikey", &self.api_key)
            .send()?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StorageError::Status {
                status: response.status().as_u16(),
                body: body_excerpt(response),
            })
        }
    }

    /// Create the object at `key` from `body` (raw bytes or an open file,
    /// which reqwest streams instead of buffering).
    ///
    /// 2xx is success; any other status is an error carrying the status
    /// code and a body excerpt.
    pub fn put_object(
        &self,
        key: &str,
        body: impl Into<reqwest::blocking::Body>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let response = self
            .client
            .post(self.object_url(key))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("apikey", &self.api_key)
            .header("Content-Type", content_type)
            .body(body.into())
            .send()?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StorageError::Status {
                status: response.status().as_u16(),
                body: body_excerpt(response),
            })
        }
    }

    /// Public download URL for `key` (only meaningful for public buckets).
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }
}

/// Read the response body and cut it down to a short reason string.
fn body_excerpt(response: reqwest::blocking::Response) -> String {
    let body = response.text().unwrap_or_default();
    body.chars().take(BODY_EXCERPT_LEN).collect()
}
