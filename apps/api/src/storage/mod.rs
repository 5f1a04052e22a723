//! Blob storage for uploaded résumés.
//!
//! The intake pipeline only sees the `BlobStore` trait; `S3BlobStore` is the
//! production implementation (MinIO locally, S3 in production).

pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

pub use s3::S3BlobStore;

/// Prefix every résumé object key is scoped under.
pub const RESUME_PREFIX: &str = "resumes";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object '{0}' not found")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key` and returns a retrievable URL.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str)
        -> Result<String, StorageError>;

    async fn get(&self, key: &str) -> Result<Bytes, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Builds a fresh `resumes/<uuid>.<ext>` key, keeping the extension exactly
/// as the applicant's filename spelled it.
pub fn resume_object_key(filename: &str) -> String {
    let extension = filename.rsplit('.').next().unwrap_or(filename);
    format!("{RESUME_PREFIX}/{}.{extension}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_key_is_prefixed_and_keeps_extension() {
        let key = resume_object_key("Jane.Doe.CV.PDF");
        assert!(key.starts_with("resumes/"));
        assert!(key.ends_with(".PDF"));

        let id = key
            .trim_start_matches("resumes/")
            .trim_end_matches(".PDF");
        assert!(Uuid::parse_str(id).is_ok(), "key was {key}");
    }

    #[test]
    fn test_resume_keys_are_unique() {
        assert_ne!(resume_object_key("a.pdf"), resume_object_key("a.pdf"));
    }
}
