//! HTTP retry wrapper: backoff on 429/5xx and transient network errors.

use reqwest::Method;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

use aeolint::{request_with_retry, RetryConfig};

/// Responds with a sequence of statuses, then the last one forever.
struct StatusSequence {
    statuses: Vec<u16>,
    hits: std::sync::atomic::AtomicUsize,
}

impl StatusSequence {
    fn new(statuses: &[u16]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            hits: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

impl Respond for StatusSequence {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        let hit = self.hits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let status = self
            .statuses
            .get(hit)
            .or(self.statuses.last())
            .copied()
            .unwrap_or(200);
        ResponseTemplate::new(status)
    }
}

fn fast_config(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        backoff_base: 0.01,
        ..Default::default()
    }
}

#[tokio::test]
async fn success_returns_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let response = request_with_retry(&client, Method::GET, &server.uri(), &fast_config(3))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn rate_limit_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(StatusSequence::new(&[429, 200]))
        .expect(2)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let response = request_with_retry(&client, Method::GET, &server.uri(), &fast_config(3))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn exhausted_retries_return_the_last_retryable_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3) // initial + 2 retries
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let response = request_with_retry(&client, Method::GET, &server.uri(), &fast_config(2))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 503);
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let response = request_with_retry(&client, Method::GET, &server.uri(), &fast_config(3))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn network_error_is_retried_until_exhaustion_then_raised() {
    // Nothing listens here; every attempt is a connect error.
    let client = reqwest::Client::new();
    let result = request_with_retry(
        &client,
        Method::GET,
        "http://127.0.0.1:1/",
        &fast_config(1),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn server_error_then_success_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(StatusSequence::new(&[500, 502, 200]))
        .expect(3)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let response = request_with_retry(&client, Method::GET, &server.uri(), &fast_config(3))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}
