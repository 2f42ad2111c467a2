//! HTTP integration tests — request → dispatch → response round-trip.

use mcp_gateway::http::GatewayServer;
use mcp_gateway::tools::Capabilities;
use mcp_gateway::types::{ServerConfig, ToolsConfig};
use mcp_gateway::Gateway;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Helper: spin up a GatewayServer on a random port, return (base_url, server).
async fn start_test_server(tools: ToolsConfig) -> (String, Arc<GatewayServer>) {
    let gateway = Arc::new(Gateway::from_config(&tools, &Capabilities::local()).unwrap());
    let server = Arc::new(GatewayServer::new(gateway, ServerConfig::default()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    let running = Arc::clone(&server);
    tokio::spawn(async move {
        let _ = running.serve_on(listener).await;
    });

    (format!("http://{addr}"), server)
}

/// Helper: POST a tool call, return (status, body).
async fn call(base: &str, tool: &str, input: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}/mcp"))
        .json(&json!({ "tool": tool, "input": input }))
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_read_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    std::fs::write(&path, "hello").unwrap();

    let (base, server) = start_test_server(ToolsConfig::default()).await;
    let (status, body) = call(&base, "readFile", json!({ "path": path })).await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({ "result": "hello" }));
    server.shutdown();
}

#[tokio::test]
async fn test_write_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");

    let (base, server) = start_test_server(ToolsConfig::default()).await;
    let (status, body) = call(
        &base,
        "writeFile",
        json!({ "path": path, "content": "written" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "result": "success" }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "written");
    server.shutdown();
}

#[tokio::test]
async fn test_unknown_tool() {
    let (base, server) = start_test_server(ToolsConfig::default()).await;
    let (status, body) = call(&base, "bogus", json!({})).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "tool_unknown" }));
    server.shutdown();
}

#[tokio::test]
async fn test_invalid_input() {
    let (base, server) = start_test_server(ToolsConfig::default()).await;
    let (status, body) = call(&base, "readFile", json!({ "path": 7 })).await;

    assert_eq!(status, 400);
    assert_eq!(
        body,
        json!({ "error": "invalid input: field 'path': expected string, got number" })
    );
    server.shutdown();
}

#[tokio::test]
async fn test_unwritable_path_keeps_serving() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("no-such-dir").join("out.txt");

    let (base, server) = start_test_server(ToolsConfig::default()).await;
    let (status, body) = call(&base, "writeFile", json!({ "path": bad, "content": "x" })).await;
    assert_eq!(status, 500);
    assert!(body["error"].is_string());

    // Process still serves subsequent requests
    let (status, body) = call(&base, "bogus", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "tool_unknown" }));
    server.shutdown();
}

#[tokio::test]
async fn test_malformed_body() {
    let (base, server) = start_test_server(ToolsConfig::default()).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/mcp"))
        .header("content-type", "application/json")
        .body("{\"tool\":")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("invalid request:"));
    server.shutdown();
}

#[tokio::test]
async fn test_tools_and_health() {
    let (base, server) = start_test_server(ToolsConfig::default()).await;
    let client = reqwest::Client::new();

    let tools: Value = client
        .get(format!("{base}/tools"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tools["count"], 3);
    let names: Vec<&str> = tools["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["readFile", "runTests", "writeFile"]);

    let health: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["tools"], 3);
    server.shutdown();
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_tests_with_configured_command() {
    let mut tools = ToolsConfig::default();
    tools.run_tests.command = vec!["sh".into(), "-c".into(), "echo 2 passed".into()];

    let (base, server) = start_test_server(tools).await;
    let (status, body) = call(&base, "runTests", json!({})).await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({ "result": "2 passed\n" }));
    server.shutdown();
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_tests_timeout() {
    let mut tools = ToolsConfig::default();
    tools.run_tests.command = vec!["sleep".into(), "10".into()];
    tools.run_tests.policy.timeout = Some(Duration::from_millis(200));

    let (base, server) = start_test_server(tools).await;
    let (status, body) = call(&base, "runTests", json!({})).await;

    assert_eq!(status, 504);
    assert_eq!(body, json!({ "error": "tool 'runTests' timed out after 200ms" }));
    server.shutdown();
}
