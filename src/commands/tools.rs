//! `hostscope tools`: list the tool catalogue.

use anyhow::Result;
use colored::Colorize;

use hostscope::tools::ToolName;

pub fn run() -> Result<()> {
    println!("{}", "hostscope tools".bold());
    for tool in ToolName::ALL {
        println!(
            "  {} {} {}",
            format!("{:<26}", tool.name()).green(),
            format!("{:<20}", format!("({})", tool.alias())).dimmed(),
            tool.title()
        );
        println!("  {}", tool.description());
    }
    Ok(())
}
