//! `hostscope report <tool>`: generate one report and print it.

use std::path::Path;

use anyhow::{anyhow, Result};

use hostscope::config::{self, Overrides};
use hostscope::server;
use hostscope::tools::{self, ToolName};

pub fn run(config_path: Option<&Path>, name: &str, log_level: Option<String>) -> Result<()> {
    let tool: ToolName = name.parse().map_err(|e| {
        anyhow!(
            "{} (run `hostscope tools` to list names and aliases)",
            e
        )
    })?;

    let config = config::load(
        config_path,
        Overrides {
            log_level,
            ..Default::default()
        },
    )?;
    server::init_tracing(&config);

    let rt = tokio::runtime::Runtime::new()?;
    let text = rt.block_on(async {
        let host = server::build_host(&config);
        tools::run(tool, &host).await
    });
    println!("{}", text);
    Ok(())
}
