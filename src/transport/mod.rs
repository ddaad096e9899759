//! MCP over stdio or streamable HTTP.

pub mod http;
pub mod mcp;
pub mod stdio;
