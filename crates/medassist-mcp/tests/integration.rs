//! Integration tests for the blocking MCP client.
//!
//! These tests drive the mock MCP server binary through the full protocol flow.

use medassist_mcp::{Framing, McpError, ServerParameters, SyncMcpClient, with_client};
use serde_json::{Map, Value, json};

fn mock_server() -> ServerParameters {
    ServerParameters::new("mock", env!("CARGO_BIN_EXE_mock-mcp-server"))
}

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn test_open_and_handshake() {
    let mut client = SyncMcpClient::new(mock_server());
    assert!(!client.is_open());

    let info = client.open().expect("Failed to open").clone();
    assert_eq!(info.name, "mock-mcp-server");
    assert_eq!(info.version, "1.0.0");
    assert!(client.is_open());

    // Second open is a no-op
    let again = client.open().expect("Second open failed");
    assert_eq!(again.name, info.name);

    client.close().expect("Failed to close");
}

#[test]
fn test_close_is_idempotent() {
    let mut client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
    client.close().expect("First close failed");
    assert!(!client.is_open());
    client.close().expect("Second close failed");
    assert!(!client.is_open());
    assert!(client.server_info().is_none());
}

#[cfg(target_os = "linux")]
#[test]
fn test_close_leaves_no_server_process() {
    let mut client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
    let pid = client.process_id().expect("open client has a server pid");
    let proc_dir = std::path::PathBuf::from(format!("/proc/{}", pid));
    assert!(proc_dir.exists());

    client.close().expect("Failed to close");
    assert!(client.process_id().is_none());
    assert!(!proc_dir.exists(), "server process {} still running", pid);
}

#[test]
fn test_list_tools_in_server_order() {
    let client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
    let tools = client.list_tools().expect("Failed to list tools");

    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "lookup_price",
            "list_tables",
            "search_generics",
            "no_text",
            "fail",
            "crash"
        ]
    );

    let lookup = &tools[0];
    assert_eq!(
        lookup.description.as_deref(),
        Some("Look up the retail price of a drug")
    );
    assert_eq!(
        lookup.input_schema.as_ref().unwrap()["required"],
        json!(["drug"])
    );
    assert!(tools[1].input_schema.is_none());
}

#[test]
fn test_invoker_returns_first_text() {
    let client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
    let lookup = client.invoker("lookup_price").expect("Failed to create invoker");

    let text = lookup
        .invoke(&args(json!({"drug": "Paracetamol"})))
        .expect("Invoke failed");
    assert_eq!(text, "Paracetamol 500mg: 25.00 INR per strip of 10");

    let generics = client.invoker("search_generics").unwrap();
    let text = generics
        .invoke(&args(json!({"brand": "Crocin", "limit": 2})))
        .unwrap();
    assert_eq!(text, "2 generics for Crocin");
}

#[test]
fn test_call_tool_returns_full_result() {
    let client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
    let result = client
        .call_tool("list_tables", None)
        .expect("Failed to call tool");
    assert!(!result.is_error());
    assert_eq!(result.first_text(), Some("drugs, prices, manufacturers"));
}

#[test]
fn test_invoke_without_text_content_is_tool_error() {
    let client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
    let err = client
        .invoker("no_text")
        .unwrap()
        .invoke(&Map::new())
        .unwrap_err();
    match err {
        McpError::ToolExecution { tool, message } => {
            assert_eq!(tool, "no_text");
            assert!(message.contains("no text"));
        }
        other => panic!("expected ToolExecution, got {:?}", other),
    }
}

#[test]
fn test_invoke_error_result_is_tool_error() {
    let client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
    let err = client.invoker("fail").unwrap().invoke(&Map::new()).unwrap_err();
    match err {
        McpError::ToolExecution { tool, message } => {
            assert_eq!(tool, "fail");
            assert_eq!(message, "catalogue unavailable");
        }
        other => panic!("expected ToolExecution, got {:?}", other),
    }

    // The session survives a failed tool
    assert!(client.list_tools().is_ok());
}

#[test]
fn test_json_rpc_error_on_call_is_tool_error() {
    let client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");

    let err = client.call_tool("reject", None).unwrap_err();
    assert!(matches!(err, McpError::ServerError { code: -32602, .. }));

    let err = client.invoker("reject").unwrap().invoke(&Map::new()).unwrap_err();
    match err {
        McpError::ToolExecution { tool, message } => {
            assert_eq!(tool, "reject");
            assert!(message.contains("catalogue rejected the call"));
        }
        other => panic!("expected ToolExecution, got {:?}", other),
    }

    assert_eq!(client.list_tools().unwrap().len(), 6);
}

#[test]
fn test_invoker_after_close_is_not_connected() {
    let mut client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
    let lookup = client.invoker("lookup_price").unwrap();
    client.close().unwrap();

    let err = lookup
        .invoke(&args(json!({"drug": "Paracetamol"})))
        .unwrap_err();
    assert!(matches!(err, McpError::NotConnected));
    assert!(matches!(client.list_tools(), Err(McpError::NotConnected)));
    assert!(matches!(
        client.invoker("lookup_price"),
        Err(McpError::NotConnected)
    ));
}

#[test]
fn test_reopen_after_close() {
    let mut client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
    client.close().unwrap();
    client.open().expect("Reopen failed");
    assert!(client.is_open());
    assert_eq!(client.list_tools().unwrap().len(), 6);
}

#[test]
fn test_invoker_usable_from_another_thread() {
    let client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
    let lookup = client.invoker("lookup_price").unwrap();

    let handle = std::thread::spawn(move || lookup.invoke(&args(json!({"drug": "Ibuprofen"}))));
    let text = handle.join().unwrap().unwrap();
    assert_eq!(text, "No price found for Ibuprofen");
}

#[test]
fn test_interleaved_notifications_are_skipped() {
    let params = mock_server().with_arg("--chatty");
    let client = SyncMcpClient::connect(params).expect("Failed to connect");
    assert_eq!(client.list_tools().unwrap().len(), 6);
    let text = client
        .invoker("lookup_price")
        .unwrap()
        .invoke(&args(json!({"drug": "paracetamol"})))
        .unwrap();
    assert!(text.starts_with("Paracetamol"));
}

#[test]
fn test_content_length_framing() {
    let params = mock_server()
        .with_arg("--content-length")
        .with_framing(Framing::ContentLength);
    let client = SyncMcpClient::connect(params).expect("Failed to connect");
    assert_eq!(
        client.server_info().map(|i| i.name.as_str()),
        Some("mock-mcp-server")
    );
    assert_eq!(client.list_tools().unwrap().len(), 6);
}

#[test]
fn test_rejected_initialize_is_handshake_error() {
    let params = mock_server().with_arg("--reject-initialize");
    let err = SyncMcpClient::connect(params).unwrap_err();
    assert!(matches!(err, McpError::Handshake(_)));
    assert!(err.is_connection_error());
}

#[test]
fn test_missing_binary_is_spawn_error() {
    let params = ServerParameters::new("missing", "/nonexistent/mcp-server");
    let err = SyncMcpClient::connect(params).unwrap_err();
    assert!(matches!(err, McpError::SpawnFailed(_)));
    assert!(err.is_connection_error());
}

#[test]
fn test_server_crash_then_close() {
    let mut client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
    let crash = client.invoker("crash").unwrap();

    let err = crash.invoke(&Map::new()).unwrap_err();
    assert!(
        matches!(err, McpError::ConnectionClosed | McpError::Io(_)),
        "unexpected error: {:?}",
        err
    );

    // Teardown after a failure still releases everything
    let _ = client.close();
    assert!(!client.is_open());
}

#[test]
fn test_reopen_after_server_crash() {
    let mut client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
    let first_pid = client.process_id();
    let _ = client.invoker("crash").unwrap().invoke(&Map::new());

    // The dead session still looks open until it is closed
    assert!(client.is_open());
    assert!(client.list_tools().is_err());

    let _ = client.close();
    client.open().expect("Reopen failed");
    assert_ne!(client.process_id(), first_pid);
    assert_eq!(client.list_tools().unwrap().len(), 6);
}

#[test]
fn test_with_client_closes_after_use() {
    let count = with_client(mock_server(), |client| {
        client.list_tools().map(|tools| tools.len())
    })
    .expect("with_client failed");
    assert_eq!(count, 6);
}

#[test]
fn test_with_client_returns_callback_error() {
    let err = with_client(mock_server(), |client| {
        client.invoker("fail")?.invoke(&Map::new())
    })
    .unwrap_err();
    assert!(matches!(err, McpError::ToolExecution { .. }));
}

#[test]
fn test_drop_closes_client() {
    let lookup = {
        let client = SyncMcpClient::connect(mock_server()).expect("Failed to connect");
        client.invoker("lookup_price").unwrap()
    };
    assert!(matches!(
        lookup.invoke(&Map::new()),
        Err(McpError::NotConnected)
    ));
}
