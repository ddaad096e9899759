//! `hostscope serve`: MCP over stdio, or HTTP when a port is configured.

use std::path::Path;

use anyhow::Result;

use hostscope::config::{self, Overrides};
use hostscope::server;

pub fn run(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    log_level: Option<String>,
) -> Result<()> {
    // CLI flags override file and environment values
    let config = config::load(
        config_path,
        Overrides {
            host,
            port,
            log_level,
        },
    )?;
    server::init_tracing(&config);

    // Build tokio runtime explicitly (no #[tokio::main] on fn main)
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::run(config))
}
