//! HTTP surface — `POST /mcp` plus catalog and health endpoints.

mod encoder;
mod handlers;
mod server;

pub use encoder::{encode, UNKNOWN_TOOL_ERROR};
pub use handlers::{router, AppState};
pub use server::GatewayServer;
