use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use tracing::info;

use crate::services::Publisher;

/// Publishes artifacts to an S3 bucket, optionally gzip-compressed.
pub struct S3Publisher {
    client: aws_sdk_s3::Client,
    bucket: String,
    gzip: bool,
}

impl S3Publisher {
    pub fn new(client: aws_sdk_s3::Client, bucket: &str, gzip: bool) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            gzip,
        }
    }

    /// Builds a client from the ambient AWS configuration (env vars, profile, instance role).
    pub async fn from_env(bucket: &str, gzip: bool) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket, gzip)
    }
}

/// Gzip-compresses `body`.
pub fn gzip_bytes(body: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    Ok(encoder.finish()?)
}

#[async_trait]
impl Publisher for S3Publisher {
    #[tracing::instrument(skip(self, body), fields(bucket = %self.bucket, gzip = self.gzip))]
    async fn publish(&self, body: Bytes, key: &str, content_type: &str) -> Result<String> {
        let (body, key) = if self.gzip {
            (Bytes::from(gzip_bytes(&body)?), format!("{key}.gz"))
        } else {
            (body, key.to_string())
        };

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(body));
        if self.gzip {
            request = request.content_encoding("gzip");
        }

        request
            .send()
            .await
            .with_context(|| format!("S3 PutObject failed for s3://{}/{key}", self.bucket))?;

        info!(key = %key, "Uploaded to S3");
        Ok(key)
    }
}
