use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use serde::Serialize;
use serde_json::Value;

use super::mcp::HostscopeServer;
use crate::probe::Host;
use crate::tools::{self, ToolName};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub host: Arc<Host>,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub platform: String,
}

#[derive(Debug, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub alias: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub fn router(host: Arc<Host>) -> Router {
    let session_host = host.clone();
    let mcp = StreamableHttpService::new(
        move || Ok(HostscopeServer::new(session_host.clone())),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", mcp)
        .route("/api/v1/tools", get(list_tools))
        .route("/api/v1/tools/{name}", get(run_tool))
        .with_state(AppState { host })
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        platform: state.host.os().to_string(),
    })
}

async fn list_tools() -> Json<Vec<ToolInfo>> {
    Json(
        ToolName::ALL
            .into_iter()
            .map(|t| ToolInfo {
                name: t.name(),
                alias: t.alias(),
                title: t.title(),
                description: t.description(),
            })
            .collect(),
    )
}

async fn run_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<String, (StatusCode, Json<Value>)> {
    let tool: ToolName = name.parse().map_err(|e: tools::UnknownTool| {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
    })?;
    Ok(tools::run(tool, &state.host).await)
}
