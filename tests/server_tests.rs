use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mcp_server_peakmojo::api::{AdapterError, ApiAdapter, ApiRequest};
use mcp_server_peakmojo::config::{Credential, Settings};
use mcp_server_peakmojo::peakmojo::build_server;
use mcp_server_peakmojo::McpServer;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Echoes the request line; `/slow` paths answer late, `/broken` paths fail
struct StubApi;

#[async_trait]
impl ApiAdapter for StubApi {
    async fn invoke(
        &self,
        request: &ApiRequest,
        _credential: &Credential,
    ) -> Result<Value, AdapterError> {
        let path = request.path();
        if path.ends_with("/slow") {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        if path.ends_with("/broken") {
            return Err(AdapterError::client(404, "no such thing"));
        }
        if path == "/v1/users" {
            return Ok(json!([{"id": "u1"}, {"id": "u2"}]));
        }
        Ok(json!({"request": request.to_string()}))
    }
}

async fn server(max_in_flight: usize) -> McpServer {
    let mut settings = Settings::default();
    settings.server.max_in_flight = max_in_flight;
    settings.retry.max_retries = 0;
    build_server(&settings, Arc::new(StubApi), Credential::new("test-key"))
        .await
        .unwrap()
}

/// Feed `lines` to the server, close its input and collect every reply
async fn exchange(server: McpServer, lines: &[String]) -> Vec<Value> {
    let (mut input, server_input) = tokio::io::duplex(64 * 1024);
    let (server_output, mut output) = tokio::io::duplex(64 * 1024);

    let serving = tokio::spawn(async move { server.serve(server_input, server_output).await });

    for line in lines {
        input.write_all(line.as_bytes()).await.unwrap();
        input.write_all(b"\n").await.unwrap();
    }
    drop(input);

    let mut raw = String::new();
    output.read_to_string(&mut raw).await.unwrap();
    serving.await.unwrap().unwrap();

    raw.lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn request(id: Value, method: &str, params: Value) -> String {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string()
}

fn user_call(id: u64, user_id: &str) -> String {
    request(
        json!(id),
        "tools/call",
        json!({"name": "get_peakmojo_user", "arguments": {"user_id": user_id}}),
    )
}

fn by_id(replies: &[Value], id: Value) -> &Value {
    replies
        .iter()
        .find(|reply| reply["id"] == id)
        .unwrap_or_else(|| panic!("no reply for id {}", id))
}

#[tokio::test]
async fn test_session_over_stdio() {
    let lines = vec![
        request(
            json!(1),
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "it", "version": "0"}
            }),
        ),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
        request(json!(2), "tools/list", json!({})),
        request(json!(3), "resources/list", json!({})),
        request(json!("four"), "ping", json!({})),
        request(json!(5), "prompts/list", json!({})),
    ];
    let replies = exchange(server(4).await, &lines).await;
    assert_eq!(replies.len(), 5);

    let init = &by_id(&replies, json!(1))["result"];
    assert_eq!(init["protocolVersion"], json!("2024-11-05"));
    assert_eq!(init["serverInfo"]["name"], json!("peakmojo"));
    assert!(init["capabilities"]["tools"].is_object());
    assert!(init["capabilities"]["resources"].is_object());

    let tools = by_id(&replies, json!(2))["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 19);
    let names: HashSet<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    assert!(names.contains("add_certificate_skill_courses"));

    let resources = by_id(&replies, json!(3))["result"]["resources"]
        .as_array()
        .unwrap();
    assert_eq!(resources.len(), 11);
    assert!(resources
        .iter()
        .all(|r| r["uri"].as_str().unwrap().starts_with("peakmojo://")));

    assert_eq!(by_id(&replies, json!("four"))["result"], json!({}));
    assert_eq!(by_id(&replies, json!(5))["error"]["code"], json!(-32601));
}

#[tokio::test]
async fn test_malformed_lines_do_not_stop_serving() {
    let lines = vec![
        "{not json".to_string(),
        String::new(),
        "   ".to_string(),
        "[]".to_string(),
        user_call(1, "u1"),
    ];
    let replies = exchange(server(2).await, &lines).await;
    assert_eq!(replies.len(), 3);

    let parse_error = replies
        .iter()
        .find(|r| r["error"]["code"] == json!(-32700))
        .unwrap();
    assert_eq!(parse_error["id"], Value::Null);

    assert!(replies.iter().any(|r| r["error"]["code"] == json!(-32600)));

    let ok = &by_id(&replies, json!(1))["result"];
    assert_eq!(ok["isError"], json!(false));
    assert_eq!(
        ok["structuredContent"]["request"],
        json!("GET /v1/users/u1")
    );
}

#[tokio::test]
async fn test_every_request_gets_exactly_one_reply() {
    let lines: Vec<String> = (1..=20).map(|id| user_call(id, &format!("u{}", id))).collect();
    let replies = exchange(server(8).await, &lines).await;

    assert_eq!(replies.len(), 20);
    let ids: HashSet<u64> = replies.iter().filter_map(|r| r["id"].as_u64()).collect();
    assert_eq!(ids, (1..=20).collect());
}

#[tokio::test]
async fn test_single_slot_preserves_order() {
    let lines = vec![user_call(1, "slow"), user_call(2, "a"), user_call(3, "b")];
    let replies = exchange(server(1).await, &lines).await;

    let ids: Vec<Value> = replies.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn test_slow_calls_do_not_block_others() {
    let lines = vec![user_call(1, "slow"), user_call(2, "fast")];
    let replies = exchange(server(4).await, &lines).await;

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["id"], json!(2));
    assert_eq!(replies[1]["id"], json!(1));
}

#[tokio::test]
async fn test_tool_failures_are_results_not_errors() {
    let lines = vec![
        user_call(1, "broken"),
        user_call(2, ""),
        request(
            json!(3),
            "tools/call",
            json!({"name": "nope", "arguments": {}}),
        ),
    ];
    let replies = exchange(server(4).await, &lines).await;

    let kinds: Vec<Value> = [1, 2, 3]
        .iter()
        .map(|id| {
            let result = &by_id(&replies, json!(id))["result"];
            assert_eq!(result["isError"], json!(true));
            result["structuredContent"]["error"]["kind"].clone()
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            json!("client_error"),
            json!("schema_violation"),
            json!("unknown_tool")
        ]
    );
    assert_eq!(
        by_id(&replies, json!(1))["result"]["structuredContent"]["error"]["status"],
        json!(404)
    );
}

#[tokio::test]
async fn test_resource_reads() {
    let lines = vec![
        request(json!(1), "resources/read", json!({"uri": "peakmojo://users"})),
        request(json!(2), "resources/read", json!({"uri": "peakmojo://unknown"})),
        request(json!(3), "resources/read", json!({"uri": "https://example.com/x"})),
        request(json!(4), "resources/read", json!({})),
    ];
    let replies = exchange(server(4).await, &lines).await;

    let contents = &by_id(&replies, json!(1))["result"]["contents"][0];
    assert_eq!(contents["uri"], json!("peakmojo://users"));
    assert_eq!(contents["mimeType"], json!("application/json"));
    let text: Value = serde_json::from_str(contents["text"].as_str().unwrap()).unwrap();
    assert_eq!(text, json!([{"id": "u1"}, {"id": "u2"}]));

    assert_eq!(by_id(&replies, json!(2))["error"]["code"], json!(-32002));
    assert_eq!(by_id(&replies, json!(3))["error"]["code"], json!(-32602));
    assert_eq!(by_id(&replies, json!(4))["error"]["code"], json!(-32602));
}
