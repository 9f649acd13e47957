//! End-to-end dispatch against a mock Slack Web API.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use slack_web_api_mcp::catalog::{Catalog, ToolRegistry};
use slack_web_api_mcp::engine::{
    DispatchSettings, Dispatcher, NormalizedResult, ReqwestExecutor, UnknownArgumentPolicy,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn registry_from(catalog: Catalog, settings: DispatchSettings) -> ToolRegistry {
    let executor = ReqwestExecutor::with_timeout(Some(Duration::from_secs(5))).unwrap();
    let dispatcher = Arc::new(Dispatcher::new(settings, Arc::new(executor)));
    ToolRegistry::new(catalog, dispatcher)
}

fn registry_with(settings: DispatchSettings) -> ToolRegistry {
    registry_from(Catalog::builtin().unwrap(), settings)
}

fn registry(server: &MockServer) -> ToolRegistry {
    registry_with(DispatchSettings::new(server.uri()))
}

async fn invoke(registry: &ToolRegistry, tool: &str, args: serde_json::Value) -> NormalizedResult {
    registry
        .get(tool)
        .unwrap()
        .invoke(args, CancellationToken::new())
        .await
}

#[tokio::test]
async fn get_routes_query_and_header_arguments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files.list"))
        .and(query_param("user", "U1"))
        .and(query_param("channel", "C1"))
        .and(header("token", "T"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true,"files":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let result = invoke(
        &registry(&server),
        "get_files.list",
        json!({"token": "T", "user": "U1", "channel": "C1"}),
    )
    .await;

    assert!(result.is_success(), "{}", result.text());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("user=U1&channel=C1"));
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn post_sends_only_body_arguments_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .and(header("token", "T"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"channel": "C1", "text": "hi"})))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let result = invoke(
        &registry(&server),
        "post_chat.postMessage",
        json!({"token": "T", "channel": "C1", "text": "hi"}),
    )
    .await;

    assert_eq!(result, NormalizedResult::Success("{\n  \"ok\": true\n}".into()));
}

#[tokio::test]
async fn error_status_is_reported_with_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations.replies"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"error":"not_found"}"#))
        .mount(&server)
        .await;

    let result = invoke(
        &registry(&server),
        "get_conversations.replies",
        json!({"channel": "C1", "ts": "1.0"}),
    )
    .await;

    assert_eq!(
        result,
        NormalizedResult::Failure(r#"API error: {"error":"not_found"}"#.into())
    );
}

#[tokio::test]
async fn non_json_success_falls_back_to_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = invoke(&registry(&server), "get_api.test", json!({})).await;

    assert_eq!(result, NormalizedResult::Success("not json".into()));
}

#[tokio::test]
async fn missing_required_argument_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let result = invoke(
        &registry(&server),
        "post_chat.postMessage",
        json!({"token": "T", "text": "hi"}),
    )
    .await;

    assert!(!result.is_success());
    assert!(result.text().starts_with("Invalid arguments:"));
    assert!(result.text().contains("channel"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn bearer_token_is_attached_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations.replies"))
        .and(header("authorization", "Bearer xoxb-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry_with(DispatchSettings::new(server.uri()).with_bearer_token("xoxb-test"));
    let result = invoke(&registry, "get_conversations.replies", json!({"channel": "C1"})).await;

    assert!(result.is_success(), "{}", result.text());
}

#[tokio::test]
async fn api_test_carries_the_configured_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.test"))
        .and(header("authorization", "Bearer xoxb-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry_with(DispatchSettings::new(server.uri()).with_bearer_token("xoxb-test"));
    let result = invoke(&registry, "get_api.test", json!({"foo": "bar"})).await;

    assert!(result.is_success(), "{}", result.text());
}

#[tokio::test]
async fn unauthenticated_operations_skip_the_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bots.info"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .mount(&server)
        .await;

    let catalog = Catalog::from_json(
        r#"{"operations": [{
            "method": "GET",
            "route": "/bots.info",
            "parameters": [{"name": "bot", "location": "query"}],
            "requires_bearer_auth": false
        }]}"#,
    )
    .unwrap();
    let registry = registry_from(
        catalog,
        DispatchSettings::new(server.uri()).with_bearer_token("xoxb-test"),
    );
    invoke(&registry, "get_bots.info", json!({"bot": "B1"})).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("bot=B1"));
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn query_values_are_percent_encoded_and_coerced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files.list"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .mount(&server)
        .await;

    invoke(
        &registry(&server),
        "get_files.list",
        json!({"types": ["spaces", "snippets"], "ts_from": "12:30 pm", "count": 5}),
    )
    .await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.query(),
        Some("ts_from=12%3A30+pm&types=spaces%2Csnippets&count=5")
    );
}

#[tokio::test]
async fn strict_mode_rejects_unknown_arguments() {
    let server = MockServer::start().await;
    let registry = registry_with(
        DispatchSettings::new(server.uri()).with_unknown_arguments(UnknownArgumentPolicy::Reject),
    );

    let result = invoke(&registry, "get_api.test", json!({"bogus": 1})).await;

    assert!(!result.is_success());
    assert!(result.text().contains("bogus"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_host_is_a_transport_failure() {
    let registry = registry_with(DispatchSettings::new("http://127.0.0.1:9"));

    let result = invoke(&registry, "get_api.test", json!({})).await;

    assert!(!result.is_success());
    assert!(result.text().starts_with("Request failed:"), "{}", result.text());
}

#[tokio::test]
async fn cancellation_interrupts_a_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"ok":true}"#)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let registry = registry(&server);
    let cancellation = CancellationToken::new();
    let trigger = cancellation.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let result = registry
        .get("get_api.test")
        .unwrap()
        .invoke(json!({}), cancellation)
        .await;

    assert_eq!(result, NormalizedResult::Failure("Request cancelled".into()));
}
