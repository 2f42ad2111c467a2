//! mcp-gateway HTTP server - main entry point.
//!
//! Serves the builtin tools (readFile, writeFile, runTests) on `POST /mcp`.

use clap::Parser;
use mcp_gateway::http::GatewayServer;
use mcp_gateway::tools::Capabilities;
use mcp_gateway::{Config, Gateway};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "mcp-gateway", version, about = "Tool-dispatch gateway over HTTP")]
struct Args {
    /// JSON config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file and environment.
    #[arg(short, long)]
    listen: Option<String>,

    /// Print the JSON Schema of the config file and exit.
    #[arg(long)]
    print_config_schema: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.print_config_schema {
        let schema = schemars::schema_for!(Config);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    // Load configuration
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }

    // Initialize observability
    mcp_gateway::observability::init_tracing(&config.observability);

    let gateway = Arc::new(Gateway::from_config(&config.tools, &Capabilities::local())?);
    for tool in gateway.list_tools() {
        tracing::info!("  ✓ {} (timeout={}ms)", tool.name, tool.timeout_ms);
    }

    let server = GatewayServer::new(gateway, config.server.clone());
    let cancel = server.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received, shutting down");
            cancel.cancel();
        }
    });

    server.serve().await?;
    Ok(())
}
