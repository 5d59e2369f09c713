//! Trait for publishing finished artifacts.

use anyhow::Result;
use bytes::Bytes;

/// Destination for published artifacts (e.g. an S3 bucket).
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// Stores `body` under `key`. Returns the key actually written, which may
    /// differ from `key` when the publisher transforms the artifact.
    async fn publish(&self, body: Bytes, key: &str, content_type: &str) -> Result<String>;
}
