mod client;
mod basic;
pub mod auth;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::Result;
use reqwest::header::{ACCEPT, HeaderValue};

/// Issues a GET for `url` and returns the body, failing on non-2xx statuses.
pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    url: reqwest::Url,
) -> Result<Vec<u8>> {
    let mut req = reqwest::Request::new(reqwest::Method::GET, url);
    req.headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/json"));

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}
