use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use super::client::HttpClient;

/// An [`HttpClient`] wrapper that inserts a fixed set of headers into every
/// request, replacing any value already present for the same name.
pub struct StaticHeaders<C> {
    inner: C,
    headers: HeaderMap,
}

impl<C> StaticHeaders<C> {
    pub fn new(inner: C, headers: HeaderMap) -> Self {
        Self { inner, headers }
    }

    /// Sends `user_agent` as the `User-Agent` of every request. The API
    /// rejects requests without a browser-like agent string.
    pub fn user_agent(inner: C, user_agent: &str) -> Result<Self> {
        let value = HeaderValue::from_str(user_agent)
            .with_context(|| format!("invalid user agent '{user_agent}'"))?;
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, value);
        Ok(Self::new(inner, headers))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for StaticHeaders<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        for (name, value) in &self.headers {
            req.headers_mut().insert(name.clone(), value.clone());
        }
        self.inner.execute(req).await
    }
}
