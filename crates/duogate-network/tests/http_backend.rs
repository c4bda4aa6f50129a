//! Integration tests for HttpBackend
//!
//! Each test starts a one-shot HTTP responder on a local TCP port, points the
//! backend at it, and checks both the request line the backend sent and how
//! it interpreted the canned response.

use duogate_core::{CardCode, Direction};
use duogate_network::{AccessBackend, AuthorizationOutcome, BackendConfig, BackendError, HttpBackend};
use rstest::rstest;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serve exactly one request with the given status line and body.
///
/// Resolves the returned receiver with the request line ("GET /path?query HTTP/1.1").
async fn respond_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (line_tx, line_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let request = String::from_utf8_lossy(&request);
        let line = request.lines().next().unwrap_or_default().to_string();
        let _ = line_tx.send(line);

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
    });

    (format!("http://{addr}/check"), line_rx)
}

fn backend(endpoint: String) -> HttpBackend {
    HttpBackend::new(BackendConfig {
        endpoint,
        request_timeout_ms: 1000,
        ..BackendConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_ok_body_grants_access() {
    let (endpoint, request_line) = respond_once("200 OK", "OK: welcome").await;
    let code = CardCode::new("1234").unwrap();

    let outcome = backend(endpoint).authorize(&code, Direction::In).await.unwrap();

    assert_eq!(outcome, AuthorizationOutcome::Granted);
    assert_eq!(
        request_line.await.unwrap(),
        "GET /check?code=1234&direction=in&verbose=0 HTTP/1.1"
    );
}

#[tokio::test]
async fn test_denied_body_is_rejection() {
    let (endpoint, _request_line) = respond_once("200 OK", "DENIED").await;
    let code = CardCode::new("1234").unwrap();

    let outcome = backend(endpoint).authorize(&code, Direction::In).await.unwrap();

    assert_eq!(
        outcome,
        AuthorizationOutcome::Denied {
            status: 200,
            body: "DENIED".to_string()
        }
    );
}

#[rstest]
#[case("403 Forbidden", "OK")]
#[case("500 Internal Server Error", "OK: but broken")]
#[case("404 Not Found", "")]
#[tokio::test]
async fn test_non_200_is_rejection(#[case] status: &'static str, #[case] body: &'static str) {
    let (endpoint, _request_line) = respond_once(status, body).await;
    let code = CardCode::new("55").unwrap();

    let outcome = backend(endpoint).authorize(&code, Direction::Out).await.unwrap();

    assert!(!outcome.is_granted());
}

#[tokio::test]
async fn test_custom_accept_prefix() {
    let (endpoint, _request_line) = respond_once("200 OK", "accepted").await;
    let backend = HttpBackend::new(BackendConfig {
        endpoint,
        accept_prefix: "accepted".to_string(),
        ..BackendConfig::default()
    })
    .unwrap();
    let code = CardCode::new("1").unwrap();

    assert!(backend.authorize(&code, Direction::In).await.unwrap().is_granted());
}

#[tokio::test]
async fn test_passage_notification_query() {
    let (endpoint, request_line) = respond_once("200 OK", "logged").await;
    let code = CardCode::new("1234").unwrap();

    let status = backend(endpoint)
        .notify_passage(&code, Direction::In)
        .await
        .unwrap();

    assert_eq!(status, 200);
    assert_eq!(
        request_line.await.unwrap(),
        "GET /check?code=1234&direction=in&passed=1&verbose=0 HTTP/1.1"
    );
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let code = CardCode::new("1234").unwrap();
    let result = backend(format!("http://{addr}/check"))
        .authorize(&code, Direction::In)
        .await;

    assert!(matches!(result, Err(BackendError::Transport(_))));
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    });

    let backend = HttpBackend::new(BackendConfig {
        endpoint: format!("http://{addr}/check"),
        request_timeout_ms: 200,
        ..BackendConfig::default()
    })
    .unwrap();
    let code = CardCode::new("1234").unwrap();

    match backend.authorize(&code, Direction::In).await {
        Err(BackendError::Transport(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}
