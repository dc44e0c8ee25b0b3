// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "abcdefghij0123456789";

fn config(server: &MockServer) -> ProviderConfig {
    ProviderConfig::builder(TOKEN)
        .base_url(server.uri())
        .rps(1000.0)
        .retries(3)
        .min_backoff(Duration::from_millis(10))
        .max_backoff(Duration::from_millis(40))
        .build()
}

fn client(server: &MockServer) -> StatusCakeClient {
    StatusCakeClient::with_logging(config(server), LoggingConfig::quiet()).unwrap()
}

#[test]
fn test_invalid_token_rejected() {
    let config = ProviderConfig::builder("short").build();
    match StatusCakeClient::new(config) {
        Err(StatusCakeError::Config(msg)) => assert!(msg.contains("API token")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_excerpt_truncates_on_char_boundary() {
    let long = "é".repeat(600);
    let cut = excerpt(&long);
    assert_eq!(cut.chars().count(), BODY_EXCERPT_LEN + 3);
    assert!(cut.ends_with("..."));
    assert_eq!(excerpt("short"), "short");
}

#[test]
fn test_parse_retry_after() {
    let mut headers = HeaderMap::new();
    assert_eq!(parse_retry_after(&headers), None);
    headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
    assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(7)));
    headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
    assert_eq!(parse_retry_after(&headers), None);
}

#[tokio::test]
async fn test_sends_bearer_token_and_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ssl/1"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(header(
            "user-agent",
            concat!("statuscake-sync/", env!("CARGO_PKG_VERSION")),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let data: serde_json::Value = client(&server).get("/ssl/1").await.unwrap();
    assert_eq!(data["id"], "1");
}

#[tokio::test]
async fn test_create_returns_new_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contact-groups"))
        .and(body_json(json!({"name": "Ops"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"new_id": "42"}})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/uptime"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"new_id": 7}})))
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(
        client.create("/contact-groups", &json!({"name": "Ops"})).await.unwrap(),
        "42"
    );
    assert_eq!(client.create("/uptime", &json!({})).await.unwrap(), "7");
}

#[tokio::test]
async fn test_list_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uptime-locations"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"a": 1}, {"a": 2}]})),
        )
        .mount(&server)
        .await;

    let items: Vec<serde_json::Value> = client(&server).list("/uptime-locations").await.unwrap();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ssl/404"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .get::<serde_json::Value>("/ssl/404")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_client_error_is_permanent_with_excerpt() {
    let server = MockServer::start().await;
    let body = format!(r#"{{"message":"invalid","errors":{{"check_rate":["{}"]}}}}"#, "x".repeat(1000));
    Mock::given(method("PUT"))
        .and(path("/uptime/1"))
        .respond_with(ResponseTemplate::new(400).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    match client(&server).update("/uptime/1", &json!({"check_rate": 1})).await {
        Err(StatusCakeError::Permanent { status, body, .. }) => {
            assert_eq!(status, 400);
            assert!(body.starts_with(r#"{"message":"invalid""#));
            assert_eq!(body.chars().count(), BODY_EXCERPT_LEN + 3);
        }
        other => panic!("expected permanent error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_errors_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pagespeed/1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pagespeed/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"name": "x"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let data: serde_json::Value = client.get("/pagespeed/1").await.unwrap();
    assert_eq!(data["name"], "x");
    assert_eq!(client.metrics().failed_requests(), 3);
    assert_eq!(client.metrics().successful_requests(), 1);
    assert_eq!(client.limiter().acquired(), 4);
}

#[tokio::test]
async fn test_exhausted_retries_report_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(4)
        .mount(&server)
        .await;

    match client(&server).get::<serde_json::Value>("/ssl/1").await {
        Err(StatusCakeError::Transient {
            attempts, status, ..
        }) => {
            assert_eq!(attempts, 4);
            assert_eq!(status, Some(502));
        }
        other => panic!("expected transient error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_retry_after_is_honoured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;

    let config = ProviderConfig::builder(TOKEN)
        .base_url(server.uri())
        .min_backoff(Duration::from_millis(10))
        .max_backoff(Duration::from_secs(2))
        .build();
    let client = StatusCakeClient::new(config).unwrap();

    let start = Instant::now();
    let _: serde_json::Value = client.get("/ssl/1").await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_deadline_surfaces_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = ProviderConfig::builder(TOKEN)
        .base_url(server.uri())
        .retries(10)
        .min_backoff(Duration::from_secs(1))
        .max_backoff(Duration::from_secs(1))
        .build();
    let client = StatusCakeClient::new(config)
        .unwrap()
        .with_timeout(Duration::from_millis(500));

    let start = Instant::now();
    match client.get::<serde_json::Value>("/ssl/1").await {
        Err(StatusCakeError::Timeout { attempts, .. }) => assert_eq!(attempts, 1),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_lost_mutation_response_is_unknown_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"data": {"new_id": "1"}}))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::builder(TOKEN)
        .base_url(server.uri())
        .request_timeout(Duration::from_millis(200))
        .build();
    let client = StatusCakeClient::new(config).unwrap();

    match client.create("/contact-groups", &json!({"name": "Ops"})).await {
        Err(StatusCakeError::UnknownState { message, .. }) => {
            assert!(message.contains("POST /contact-groups"));
        }
        other => panic!("expected unknown state, got {other:?}"),
    }
}

#[tokio::test]
async fn test_timed_out_read_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
        .mount(&server)
        .await;

    let config = ProviderConfig::builder(TOKEN)
        .base_url(server.uri())
        .min_backoff(Duration::from_millis(10))
        .max_backoff(Duration::from_millis(10))
        .request_timeout(Duration::from_millis(200))
        .build();
    let client = StatusCakeClient::new(config).unwrap();

    let data: serde_json::Value = client.get("/ssl/1").await.unwrap();
    assert_eq!(data["ok"], true);
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    match client(&server).get::<serde_json::Value>("/ssl/1").await {
        Err(StatusCakeError::Decode { .. }) => {}
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_failure_is_transient() {
    let config = ProviderConfig::builder(TOKEN)
        .base_url("http://127.0.0.1:1")
        .retries(1)
        .min_backoff(Duration::from_millis(10))
        .max_backoff(Duration::from_millis(10))
        .build();
    let client = StatusCakeClient::new(config).unwrap();

    let err = client
        .create("/contact-groups", &json!({"name": "Ops"}))
        .await
        .unwrap_err();
    match err {
        StatusCakeError::Transient {
            attempts, status, ..
        } => {
            assert_eq!(attempts, 2);
            assert_eq!(status, None);
        }
        other => panic!("expected transient error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_clones_share_limiter() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client(&server);
    let scoped = client.with_timeout(Duration::from_secs(5));
    client.delete("/ssl/1").await.unwrap();
    scoped.delete("/ssl/2").await.unwrap();

    assert_eq!(client.limiter().acquired(), 2);
    assert_eq!(scoped.limiter().acquired(), 2);
}

#[tokio::test]
async fn test_deadline_before_first_attempt_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::builder(TOKEN)
        .base_url(server.uri())
        .rps(RateLimiter::MIN_RATE)
        .build();
    let client = StatusCakeClient::new(config).unwrap();
    let _: serde_json::Value = client.get("/ssl/1").await.unwrap();

    let scoped = client.with_timeout(Duration::from_secs(1));
    match scoped.get::<serde_json::Value>("/ssl/1").await {
        Err(StatusCakeError::Timeout { attempts, .. }) => assert_eq!(attempts, 0),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(client.limiter().acquired(), 1);
}

#[test]
fn test_vanishing_rate_is_rejected() {
    let config = ProviderConfig::builder(TOKEN).rps(1e-300).build();
    match StatusCakeClient::new(config) {
        Err(StatusCakeError::Config(msg)) => assert!(msg.contains("rps"), "{msg}"),
        other => panic!("expected config error, got {other:?}"),
    }
}
