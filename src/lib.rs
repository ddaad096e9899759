//! Read-only host diagnostics exposed as MCP tools.
//!
//! [`tools`] maps tool names to report assemblers, which call the per-domain
//! [`collectors`]. Collectors reach the operating system only through
//! [`probe::Host`], so every section can be exercised against a scripted
//! probe.

pub mod collectors;
pub mod config;
pub mod error;
pub mod parse;
pub mod platform;
pub mod probe;
pub mod report;
pub mod server;
pub mod tools;
pub mod transport;
