use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tracing::info;

use super::mcp::HostscopeServer;
use crate::probe::Host;

/// Serve MCP over stdin/stdout until the client disconnects.
pub async fn serve(host: Arc<Host>) -> Result<()> {
    info!("serving MCP over stdio");
    let service = HostscopeServer::new(host)
        .serve(stdio())
        .await
        .context("starting stdio session")?;
    let reason = service.waiting().await.context("stdio session")?;
    info!(?reason, "stdio session closed, shutting down");
    Ok(())
}
