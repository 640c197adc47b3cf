#![allow(clippy::unwrap_used)]
// Integration tests for `WpEngineClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wpe_api::{CacheType, ClientConfig, Credentials, Error, ErrorBody, Method, WpEngineClient};

// ── Helpers ─────────────────────────────────────────────────────────

const AUTH: &str = "Basic dXNlcjpwdw==";

fn client_for(base: &str, timeout: Duration) -> WpEngineClient {
    let creds = Credentials::new("user", SecretString::from("pw".to_owned())).unwrap();
    let config = ClientConfig::new(creds)
        .unwrap()
        .with_base_url(Url::parse(base).unwrap())
        .with_timeout(timeout);
    WpEngineClient::new(config).unwrap()
}

async fn setup() -> (MockServer, WpEngineClient) {
    let server = MockServer::start().await;
    let client = client_for(&format!("{}/v1/", server.uri()), Duration::from_secs(5));
    (server, client)
}

fn site(id: &str, name: &str, installs: Value) -> Value {
    json!({
        "id": id,
        "name": name,
        "account": { "id": "acc1" },
        "group_name": null,
        "installs": installs
    })
}

/// A base URL whose port has nothing listening.
fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/v1/")
}

// ── Sites ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_sites_single_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .and(header("authorization", AUTH))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "previous": null,
            "next": null,
            "count": 1,
            "results": [site("s1", "demo", json!([
                { "id": "i1", "name": "foo", "environment": "production", "php_version": "8.1" },
                { "id": "i2", "name": "foostg", "environment": "staging", "php_version": "8.2" }
            ]))]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = client.list_sites().await.unwrap();

    assert_eq!(listing.len(), 1);
    let demo = &listing["demo"];
    assert_eq!(demo.id, "s1");
    assert_eq!(demo.account, "acc1");
    assert_eq!(demo.group, None);
    assert_eq!(
        demo.installs.keys().collect::<Vec<_>>(),
        vec!["foo", "foostg"]
    );
    assert_eq!(
        demo.installs["foo"].admin,
        "https://my.wpengine.com/installs/foo/launch_wp_admin?account_id=acc1"
    );
    assert_eq!(demo.installs["foostg"].php.as_deref(), Some("8.2"));
}

#[tokio::test]
async fn test_list_sites_follows_next_cursor_once() {
    let (server, client) = setup().await;
    let next = format!("{}/v1/sites?limit=1&offset=1", server.uri());

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": next,
            "count": 2,
            "results": [site("s1", "alpha", json!([
                { "id": "i1", "name": "alphaprod", "environment": "production", "php": "8.1" }
            ]))]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "previous": format!("{}/v1/sites?limit=1&offset=0", server.uri()),
            "count": 2,
            "results": [site("s2", "beta", json!([
                { "id": "i2", "name": "betaprod", "environment": "production", "php": "7.4" }
            ]))]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = client.list_sites().await.unwrap();

    assert_eq!(listing.keys().collect::<Vec<_>>(), vec!["alpha", "beta"]);
    assert!(listing["alpha"].installs.contains_key("alphaprod"));
    assert!(listing["beta"].installs.contains_key("betaprod"));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_site_without_installs_serializes_without_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": "s1", "name": "bare", "account": { "id": "a9" }, "group_name": "Clients" }]
        })))
        .mount(&server)
        .await;

    let listing = client.list_sites().await.unwrap();
    assert_eq!(
        serde_json::to_value(&listing).unwrap(),
        json!({ "bare": { "id": "s1", "name": "bare", "account": "a9", "group": "Clients" } })
    );
}

#[tokio::test]
async fn test_relative_cursor_resolves_under_base() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": "sites?offset=1",
            "results": [site("s1", "alpha", json!([]))]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": null,
            "results": [site("s2", "beta", json!([]))]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = client.list_sites().await.unwrap();
    assert_eq!(listing.keys().collect::<Vec<_>>(), vec!["alpha", "beta"]);
}

#[tokio::test]
async fn test_empty_cursor_ends_pagination() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": "",
            "results": [site("s1", "only", json!([]))]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = client.list_sites().await.unwrap();
    assert_eq!(listing.keys().collect::<Vec<_>>(), vec!["only"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_foreign_cursor_is_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": "https://evil.example.test/v1/sites?offset=1",
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.list_sites().await;
    assert!(
        matches!(result, Err(Error::Decode { .. })),
        "expected Decode error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_repeating_cursor_is_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": format!("{}/v1/sites", server.uri()),
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.list_sites().await;
    assert!(matches!(result, Err(Error::Decode { .. })));
}

#[tokio::test]
async fn test_malformed_page_is_decode_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = client.list_sites().await;
    match result {
        Err(Error::Decode { body, .. }) => assert!(body.contains("maintenance")),
        other => panic!("expected Decode error, got: {other:?}"),
    }
}

// ── Backups ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_backup_posts_json_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/installs/123/backups"))
        .and(header("authorization", AUTH))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "description": "nightly",
            "notification_emails": "a@b.com"
        })))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(json!({ "id": "b-1", "status": "requested" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .create_backup("123", "nightly", "a@b.com")
        .await
        .unwrap();

    assert_eq!(resp, json!({ "id": "b-1", "status": "requested" }));
}

// ── Cache purge ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_purge_cache_posts_object_then_page() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/installs/123/purge_cache"))
        .and(body_json(json!({ "type": "object" })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "purged": "object" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/installs/123/purge_cache"))
        .and(body_json(json!({ "type": "page" })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client.purge_cache("123").await.unwrap();

    assert_eq!(outcome.object, json!({ "purged": "object" }));
    assert_eq!(outcome.page, Value::Null);
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({ "object": { "purged": "object" }, "page": null })
    );

    let requests = server.received_requests().await.unwrap();
    let types: Vec<Value> = requests
        .iter()
        .map(|r| serde_json::from_slice::<Value>(&r.body).unwrap()["type"].clone())
        .collect();
    assert_eq!(types, vec![json!("object"), json!("page")]);
}

#[tokio::test]
async fn test_purge_single_layer() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/installs/abc/purge_cache"))
        .and(body_json(json!({ "type": "page" })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .purge_cache_type("abc", CacheType::Page)
        .await
        .unwrap();
    assert_eq!(resp, Value::Null);
}

#[tokio::test]
async fn test_purge_cache_sends_page_after_object_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/installs/123/purge_cache"))
        .and(body_json(json!({ "type": "object" })))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "object cache busy" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/installs/123/purge_cache"))
        .and(body_json(json!({ "type": "page" })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.purge_cache("123").await;
    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "object cache busy");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

// ── Generic request helper ──────────────────────────────────────────

#[tokio::test]
async fn test_request_get_encodes_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/installs"))
        .and(query_param("limit", "5"))
        .and(query_param("account_id", "acc 1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let Value::Object(args) = json!({ "limit": 5, "account_id": "acc 1" }) else {
        unreachable!()
    };
    let resp = client
        .request(Method::GET, "installs", &args)
        .await
        .unwrap();
    assert_eq!(resp, json!({ "results": [] }));
}

#[tokio::test]
async fn test_request_post_sends_empty_object() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/installs/9/purge_cache"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .request(Method::POST, "/installs/9/purge_cache", &serde_json::Map::new())
        .await
        .unwrap();
    assert_eq!(resp, Value::Null);
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad Credentials" })),
        )
        .mount(&server)
        .await;

    let result = client.list_sites().await;
    match result {
        Err(Error::Authentication { message }) => assert_eq!(message, "Bad Credentials"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_api_error_carries_status_and_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/installs/missing/backups"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found",
            "errors": [{ "resource": "Install", "message": "install does not exist" }]
        })))
        .mount(&server)
        .await;

    let result = client.create_backup("missing", "x", "a@b.com").await;
    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found (install does not exist)");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    let client = client_for(
        &format!("{}/v1/", server.uri()),
        Duration::from_millis(200),
    );

    Mock::given(method("GET"))
        .and(path("/v1/sites"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = client.list_sites().await;
    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
}

#[tokio::test]
async fn test_transport_failure_surfaces_on_every_operation() {
    let client = client_for(&dead_base_url(), Duration::from_secs(5));

    let errors = vec![
        client.list_sites().await.unwrap_err(),
        client.create_backup("1", "d", "a@b.com").await.unwrap_err(),
        client.purge_cache("1").await.unwrap_err(),
        client
            .request(Method::GET, "sites", &serde_json::Map::new())
            .await
            .unwrap_err(),
    ];

    for err in &errors {
        assert!(
            matches!(err, Error::Transport(_)),
            "expected Transport error, got: {err:?}"
        );
        assert!(err.is_transient());
        let body = serde_json::to_value(ErrorBody::from(err)).unwrap();
        let message = body["error"].as_str().unwrap();
        assert!(!message.is_empty());
        assert_eq!(
            message.matches("error sending request").count(),
            1,
            "reqwest message repeated: {message}"
        );
    }
}
