//! MCP server handler: the tool catalogue exposed through rmcp.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::json;
use tracing::info;

use crate::probe::Host;
use crate::tools::{self, ToolName};

const INSTRUCTIONS: &str = "Read-only diagnostics for the machine this server runs on. \
Start with get_system_summary; use get_full_system_report only when every section is needed.";

#[derive(Clone)]
pub struct HostscopeServer {
    host: Arc<Host>,
}

impl HostscopeServer {
    pub fn new(host: Arc<Host>) -> Self {
        Self { host }
    }

    /// Run one tool by name or alias.
    pub async fn call(&self, name: &str) -> Result<CallToolResult, McpError> {
        info!(tool = name, "tool call");
        let text = tools::dispatch(name, &self.host)
            .await
            .map_err(|e| McpError::invalid_params(format!("Unknown tool: {}", e.0), None))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

/// None of the tools take arguments.
fn empty_schema() -> Arc<JsonObject> {
    let schema = json!({ "type": "object", "properties": {} });
    Arc::new(schema.as_object().cloned().unwrap_or_default())
}

pub fn tool_catalogue() -> Vec<Tool> {
    let schema = empty_schema();
    ToolName::ALL
        .into_iter()
        .map(|t| Tool::new(t.name(), t.description(), schema.clone()))
        .collect()
}

impl ServerHandler for HostscopeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(tool_catalogue()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(&request.name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::{ErrorCode, ProtocolVersion};
    use rmcp::ServiceExt;
    use serde_json::Value;
    use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};

    use crate::platform::Os;
    use crate::probe::fake::FakeProbe;

    fn server() -> HostscopeServer {
        HostscopeServer::new(Arc::new(FakeProbe::new().into_host(Os::Linux)))
    }

    fn text_of(result: &CallToolResult) -> String {
        result.content[0]
            .as_text()
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    #[test]
    fn catalogue_lists_every_tool_without_arguments() {
        let tools = tool_catalogue();
        assert_eq!(tools.len(), 10);
        assert_eq!(tools[0].name, "get_system_summary");
        assert_eq!(tools[9].name, "get_full_system_report");
        for tool in &tools {
            assert_eq!(tool.input_schema.get("type"), Some(&json!("object")));
            assert_eq!(tool.input_schema.get("properties"), Some(&json!({})));
        }
    }

    #[test]
    fn server_info_advertises_tools() {
        let info = server().get_info();
        assert_eq!(info.server_info.name, "hostscope");
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.protocol_version, ProtocolVersion::LATEST);
    }

    #[tokio::test]
    async fn call_returns_report_text() {
        let result = server().call("storage-analysis").await.unwrap();
        assert_ne!(result.is_error, Some(true));
        assert!(text_of(&result).starts_with("# Storage Analysis"));
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let err = server().call("get_weather").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "Unknown tool: get_weather");
    }

    fn send(frame: Value) -> String {
        let mut line = frame.to_string();
        line.push('\n');
        line
    }

    async fn next_reply<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Value {
        let line = lines.next_line().await.unwrap().unwrap();
        serde_json::from_str(&line).unwrap()
    }

    /// Drive the server over a byte stream with hand-written frames.
    #[tokio::test]
    async fn line_protocol_session() {
        let (server_io, client_io) = tokio::io::duplex(1 << 20);
        tokio::spawn(async move {
            if let Ok(running) = server().serve(server_io).await {
                let _ = running.waiting().await;
            }
        });

        let (read, mut write) = tokio::io::split(client_io);
        let mut replies = BufReader::new(read).lines();
        let init = send(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2099-01-01",
                "capabilities": {},
                "clientInfo": { "name": "session-test", "version": "0.0.0" }
            }
        }));
        write.write_all(init.as_bytes()).await.unwrap();
        let reply = next_reply(&mut replies).await;
        assert_eq!(reply["id"], 1);
        assert_eq!(
            reply["result"]["protocolVersion"],
            serde_json::to_value(ProtocolVersion::LATEST).unwrap()
        );
        assert_eq!(reply["result"]["serverInfo"]["name"], "hostscope");

        // The notification gets no reply; the next line answers id 2.
        let initialized = send(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }));
        let list = send(json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }));
        write.write_all(initialized.as_bytes()).await.unwrap();
        write.write_all(list.as_bytes()).await.unwrap();
        let reply = next_reply(&mut replies).await;
        assert_eq!(reply["id"], 2);
        assert_eq!(reply["result"]["tools"].as_array().unwrap().len(), 10);

        let unknown = send(json!({ "jsonrpc": "2.0", "id": 3, "method": "prompts/list" }));
        write.write_all(unknown.as_bytes()).await.unwrap();
        let reply = next_reply(&mut replies).await;
        assert_eq!(reply["id"], 3);
        assert_eq!(reply["error"]["code"], -32601);
    }
}
