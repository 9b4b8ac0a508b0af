use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use std::fmt;

/// An [`HttpClient`] wrapper that appends an API key as a URL query parameter.
///
/// BusTime expects its key as `key=<value>` on every request.
pub struct UrlParam<C> {
    pub inner: C,
    pub param_name: String,
    pub key: String,
}

impl<C> UrlParam<C> {
    /// Wraps `inner` so every request carries `key=<key>`.
    pub fn bustime(inner: C, key: String) -> Self {
        Self {
            inner,
            param_name: "key".to_string(),
            key,
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for UrlParam<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlParam")
            .field("inner", &self.inner)
            .field("param_name", &self.param_name)
            .field("key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for UrlParam<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.key);
        self.inner.execute(req).await
    }
}
