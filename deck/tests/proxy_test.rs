//! End-to-end tests for the pagination proxy
//!
//! A mockito server stands in for the upstream listing; the proxy is bound to
//! an ephemeral port and exercised over real HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use demodeck::server::{ProxyServer, create_listener};
use demodeck::upstream::{HttpUserSource, UserSource};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

fn users_page(skip: u64, limit: u64, total: u64) -> Value {
    let end = (skip + limit).min(total);
    let users: Vec<Value> = (skip..end)
        .map(|i| {
            json!({
                "id": i + 1,
                "firstName": format!("First{}", i + 1),
                "lastName": "Doe",
                "email": format!("user{}@x.com", i + 1),
                "username": format!("user{}", i + 1),
                "hair": { "color": "Brown" },
            })
        })
        .collect();
    json!({ "users": users, "total": total, "skip": skip, "limit": end - skip })
}

type RunningProxy = (SocketAddr, mpsc::Sender<()>, JoinHandle<eyre::Result<()>>);

async fn start_proxy(upstream: &ServerGuard) -> RunningProxy {
    start_proxy_with(&upstream.url(), Duration::from_secs(5)).await
}

async fn start_proxy_with(upstream_url: &str, timeout: Duration) -> RunningProxy {
    let source: Arc<dyn UserSource> = Arc::new(HttpUserSource::new(upstream_url, timeout).expect("client"));
    let (listener, addr) = create_listener("127.0.0.1:0".parse().unwrap()).await.expect("bind");
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let handle = tokio::spawn(ProxyServer::new(source).serve(listener, shutdown_rx));
    (addr, shutdown_tx, handle)
}

fn query(limit: &str, skip: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("limit".into(), limit.into()),
        Matcher::UrlEncoded("skip".into(), skip.into()),
    ])
}

#[tokio::test]
async fn test_get_first_page_passes_through() {
    let mut upstream = Server::new_async().await;
    let expected = users_page(0, 5, 100);
    let mock = upstream
        .mock("GET", "/users")
        .match_query(query("5", "0"))
        .with_header("content-type", "application/json")
        .with_body(expected.to_string())
        .create_async()
        .await;

    let (addr, shutdown_tx, handle) = start_proxy(&upstream).await;
    let response = reqwest::get(format!("http://{}/api/data?limit=5&skip=0", addr))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, expected);
    assert_eq!(body["users"][0]["hair"]["color"], "Brown");
    mock.assert_async().await;

    shutdown_tx.send(()).await.unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_body_is_relayed_byte_for_byte() {
    let mut upstream = Server::new_async().await;
    let raw = concat!(
        r#"{"users":[{"lastName":"Johnson","id":1,"weight":70.50,"height":193.24,"firstName":"Emily"}],"#,
        r#""total":208,"skip":0,"limit":1}"#
    );
    upstream
        .mock("GET", "/users")
        .match_query(query("1", "0"))
        .with_body(raw)
        .create_async()
        .await;

    let (addr, _shutdown_tx, _handle) = start_proxy(&upstream).await;
    let response = reqwest::get(format!("http://{}/api/data?limit=1&skip=0", addr))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), raw);
}

#[tokio::test]
async fn test_silent_upstream_times_out_as_500() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let (addr, _shutdown_tx, _handle) = start_proxy_with(&upstream_url, Duration::from_millis(200)).await;
    let response = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
        .get(format!("http://{}/api/data?limit=5&skip=0", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
}

#[tokio::test]
async fn test_percent_encoded_and_large_params_are_forwarded() {
    let mut upstream = Server::new_async().await;
    let mock = upstream
        .mock("GET", "/users")
        .match_query(query("5000000000", "5"))
        .with_body(users_page(5, 0, 100).to_string())
        .create_async()
        .await;

    let (addr, _shutdown_tx, _handle) = start_proxy(&upstream).await;
    let response = reqwest::get(format!("http://{}/api/data?limit=5000000000&skip=%35", addr))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_last_page() {
    let mut upstream = Server::new_async().await;
    let expected = users_page(95, 5, 100);
    upstream
        .mock("GET", "/users")
        .match_query(query("5", "95"))
        .with_body(expected.to_string())
        .create_async()
        .await;

    let (addr, _shutdown_tx, _handle) = start_proxy(&upstream).await;
    let response = reqwest::Client::new()
        .post(format!("http://{}/api/data?limit=5&skip=95", addr))
        .body("ignored")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["skip"], 95);
    assert_eq!(body["users"].as_array().unwrap().len(), 5);
    assert_eq!(body["users"][4]["id"], 100);
}

#[tokio::test]
async fn test_missing_params_use_defaults() {
    let mut upstream = Server::new_async().await;
    let mock = upstream
        .mock("GET", "/users")
        .match_query(query("10", "0"))
        .with_body(users_page(0, 10, 100).to_string())
        .create_async()
        .await;

    let (addr, _shutdown_tx, _handle) = start_proxy(&upstream).await;
    let response = reqwest::get(format!("http://{}/api/data", addr)).await.unwrap();

    assert_eq!(response.status(), 200);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upstream_error_becomes_500() {
    let mut upstream = Server::new_async().await;
    upstream
        .mock("GET", "/users")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let (addr, _shutdown_tx, _handle) = start_proxy(&upstream).await;
    let response = reqwest::get(format!("http://{}/api/data?limit=5&skip=0", addr))
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
}

#[tokio::test]
async fn test_non_object_upstream_body_becomes_500() {
    let mut upstream = Server::new_async().await;
    upstream
        .mock("GET", "/users")
        .match_query(Matcher::Any)
        .with_body("[1, 2, 3]")
        .create_async()
        .await;

    let (addr, _shutdown_tx, _handle) = start_proxy(&upstream).await;
    let response = reqwest::get(format!("http://{}/api/data", addr)).await.unwrap();

    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn test_unknown_path_and_method() {
    let upstream = Server::new_async().await;
    let (addr, _shutdown_tx, _handle) = start_proxy(&upstream).await;

    let response = reqwest::get(format!("http://{}/api/users", addr)).await.unwrap();
    assert_eq!(response.status(), 404);

    let response = reqwest::Client::new()
        .delete(format!("http://{}/api/data", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 405);
    assert_eq!(response.headers()["allow"], "GET, POST");
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let upstream = Server::new_async().await;
    let (addr, shutdown_tx, handle) = start_proxy(&upstream).await;

    shutdown_tx.send(()).await.unwrap();
    handle.await.unwrap().unwrap();

    let result = reqwest::Client::builder()
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap()
        .get(format!("http://{}/api/data", addr))
        .send()
        .await;
    assert!(result.is_err());
}
