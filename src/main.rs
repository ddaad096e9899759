mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hostscope",
    version,
    about = "Read-only host diagnostics served as MCP tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to ~/.config/hostscope/config.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdio, or over HTTP when a port is configured (default)
    Serve {
        /// HTTP bind address
        #[arg(long)]
        host: Option<String>,

        /// HTTP port; selects the HTTP transport
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print one report to stdout and exit
    Report {
        /// Tool name or alias (e.g. get_system_summary, summary)
        tool: String,
    },

    /// List available tools
    Tools,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let log_level = cli.log_level;

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => commands::serve::run(config, host, port, log_level),
        Commands::Report { tool } => commands::report::run(config, &tool, log_level),
        Commands::Tools => commands::tools::run(),
    }
}
