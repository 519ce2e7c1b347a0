//! Fetcher: one GraphQL POST per zip code.

mod client;
pub mod graphql;
mod headers;

pub use client::{BasicClient, HttpClient};
pub use headers::StaticHeaders;

use anyhow::Result;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, StatusCode, Url};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, error};

use graphql::GraphQlRequest;

/// Posts the station search for `zip` and returns the parsed JSON body.
///
/// A non-200 answer is logged with its raw body and yields `Ok(None)`.
/// Transport and JSON decode failures are returned as errors.
pub async fn fetch_stations<C: HttpClient + ?Sized>(
    client: &C,
    endpoint: &str,
    zip: &str,
) -> Result<Option<Value>> {
    let url: Url = endpoint.parse()?;
    let mut req = Request::new(Method::POST, url);
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *req.body_mut() = Some(serde_json::to_vec(&GraphQlRequest::location_search(zip))?.into());

    let resp = client.execute(req).await?;
    let status = resp.status();

    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        error!(zip, status = status.as_u16(), body = %body, "Failed to fetch station data");
        return Ok(None);
    }

    let data: Value = resp.json().await?;
    if tracing::enabled!(tracing::Level::DEBUG) {
        debug!(zip, body = %serde_json::to_string_pretty(&data)?, "Station data received");
    }
    Ok(Some(data))
}

/// Fetches every zip in `zips`, running at most `concurrency` requests at a
/// time. Zips whose fetch fails are logged and left out of the result.
pub async fn fetch_all<C>(
    client: Arc<C>,
    endpoint: &str,
    zips: &[String],
    concurrency: usize,
) -> BTreeMap<String, Value>
where
    C: HttpClient + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = Vec::with_capacity(zips.len());

    for zip in zips {
        let sem = semaphore.clone();
        let client = client.clone();
        let endpoint = endpoint.to_string();
        let zip = zip.clone();

        let span = tracing::info_span!("fetch_zip", zip = %zip);

        let task = tokio::spawn(
            async move {
                let Ok(_permit) = sem.acquire().await else {
                    return None;
                };

                match fetch_stations(client.as_ref(), &endpoint, &zip).await {
                    Ok(Some(data)) => Some((zip, data)),
                    Ok(None) => None,
                    Err(e) => {
                        error!(error = %e, "Station fetch failed");
                        None
                    }
                }
            }
            .instrument(span),
        );

        tasks.push(task);
    }

    let mut results = BTreeMap::new();
    for task in tasks {
        match task.await {
            Ok(Some((zip, data))) => {
                results.insert(zip, data);
            }
            Ok(None) => {}
            Err(e) => error!(error = %e, "Fetch task aborted"),
        }
    }

    debug!(requested = zips.len(), fetched = results.len(), "Fetch round complete");
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers every request with a fixed status and body, recording what
    /// it was sent.
    struct CannedClient {
        status: u16,
        body: String,
        seen: Mutex<Vec<(Method, String, Value, Option<String>)>>,
    }

    impl CannedClient {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpClient for CannedClient {
        async fn execute(&self, req: Request) -> reqwest::Result<reqwest::Response> {
            let body = req
                .body()
                .and_then(|b| b.as_bytes())
                .map(|b| serde_json::from_slice(b).unwrap())
                .unwrap_or(Value::Null);
            let content_type = req
                .headers()
                .get(CONTENT_TYPE)
                .map(|v| v.to_str().unwrap().to_string());
            self.seen.lock().unwrap().push((
                req.method().clone(),
                req.url().to_string(),
                body,
                content_type,
            ));

            let resp = http::Response::builder()
                .status(self.status)
                .body(self.body.clone())
                .unwrap();
            Ok(reqwest::Response::from(resp))
        }
    }

    #[tokio::test]
    async fn test_fetch_stations_ok_returns_json() {
        let client = CannedClient::new(200, r#"{"data":{"ok":true}}"#);

        let result = fetch_stations(&client, "http://example.test/graphql", "07305")
            .await
            .unwrap();

        assert_eq!(result, Some(serde_json::json!({"data": {"ok": true}})));

        let seen = client.seen.lock().unwrap();
        let (method, url, body, content_type) = &seen[0];
        assert_eq!(*method, Method::POST);
        assert_eq!(url, "http://example.test/graphql");
        assert_eq!(body["variables"]["search"], "07305");
        assert_eq!(content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_fetch_stations_non_200_is_none() {
        let client = CannedClient::new(403, "blocked");

        let result = fetch_stations(&client, "http://example.test/graphql", "07305")
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_fetch_stations_invalid_json_is_error() {
        let client = CannedClient::new(200, "<html>not json</html>");

        let result = fetch_stations(&client, "http://example.test/graphql", "07305").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_stations_bad_endpoint_is_error() {
        let client = CannedClient::new(200, "{}");

        let result = fetch_stations(&client, "not a url", "07305").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_all_keys_by_zip_and_skips_failures() {
        let ok = Arc::new(CannedClient::new(200, r#"{"data":null}"#));
        let zips = vec!["07305".to_string(), "07304".to_string()];

        let results = fetch_all(ok.clone(), "http://example.test/graphql", &zips, 2).await;
        assert_eq!(
            results.keys().cloned().collect::<Vec<_>>(),
            vec!["07304".to_string(), "07305".to_string()]
        );
        assert_eq!(ok.seen.lock().unwrap().len(), 2);

        let failing = Arc::new(CannedClient::new(500, "oops"));
        let results = fetch_all(failing, "http://example.test/graphql", &zips, 1).await;
        assert!(results.is_empty());
    }
}
