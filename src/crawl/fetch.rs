// src/crawl/fetch.rs
// =============================================================================
// This module downloads pages.
//
// The crawl engine only knows about the `Fetcher` trait, so tests can plug
// in an in-memory web and the binary plugs in `HttpFetcher` (reqwest).
//
// Failure modes a Task can hit:
// - Transport: the request never produced a response (timeout, DNS,
//   connection refused, redirect loop...)
// - Body: we got a response but couldn't read its body
//
// A 404 or 500 is *not* a failure here - the server answered, and whatever
// markup it sent back still gets scanned for links.
//
// Rust concepts:
// - Traits with async methods: `impl Future` in the return position
// - thiserror: derive Display/Error for our error enum
// =============================================================================

use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use super::error::CrawlError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Fetches the body of a Location as text.
pub trait Fetcher: Send + Sync + Clone + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: None,
        }
    }
}

/// The real fetcher. One reqwest Client is shared by every Task
/// (cloning it only bumps a reference count).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self, CrawlError> {
        let mut builder = Client::builder()
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(user_agent) = &options.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        } else {
            builder = builder.user_agent(concat!("sitecrawl/", env!("CARGO_PKG_VERSION")));
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "non-success status, scanning body anyway");
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

// Sorts reqwest's transport errors into the buckets we report
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::TooManyRedirects
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else {
        FetchError::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/next">"#))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetchOptions::default()).unwrap();
        let body = fetcher.fetch(&server.uri()).await.unwrap();
        assert_eq!(body, r#"<a href="/next">"#);
    }

    #[tokio::test]
    async fn test_error_status_still_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetchOptions::default()).unwrap();
        let body = fetcher.fetch(&format!("{}/missing", server.uri())).await.unwrap();
        assert_eq!(body, "not here");
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let options = FetchOptions {
            timeout: Duration::from_millis(200),
            user_agent: None,
        };
        let fetcher = HttpFetcher::new(&options).unwrap();
        let result = fetcher.fetch(&server.uri()).await;
        assert_eq!(result, Err(FetchError::Timeout));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_failure() {
        let fetcher = HttpFetcher::new(&FetchOptions::default()).unwrap();
        // Port 1 on localhost: nothing listens there
        let result = fetcher.fetch("http://127.0.0.1:1/").await;
        assert!(matches!(result, Err(FetchError::Connect(_))));
    }
}
