use crate::fetch::client::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// The header name and value are validated once, at construction, so every
/// request carries the same pre-parsed header.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    key: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .with_context(|| format!("invalid API key header name '{header_name}'"))?;
        let mut key = HeaderValue::from_str(key).context("API key is not a valid header value")?;
        key.set_sensitive(true);

        Ok(Self {
            inner,
            header_name,
            key,
        })
    }

    /// Uses the `X-API-Key` header expected by the station API.
    pub fn x_api_key(inner: C, key: &str) -> Result<Self> {
        Self::new(inner, "X-API-Key", key)
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.key.clone());
        self.inner.execute(req).await
    }
}
