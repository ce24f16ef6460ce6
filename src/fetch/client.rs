use async_trait::async_trait;
use reqwest::{Request, Response};

/// Seam between the fetcher and the transport, so credentials can be layered
/// on with wrappers such as [`UrlParam`](super::auth::UrlParam).
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
