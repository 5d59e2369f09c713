use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport seam for station requests. Wrappers such as
/// [`ApiKey`](super::auth::ApiKey) decorate a request before delegating.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
