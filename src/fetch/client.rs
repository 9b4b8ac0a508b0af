use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Wrappers such as [`super::auth::UrlParam`]
/// decorate another `HttpClient` before delegating to it.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
