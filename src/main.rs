//! Grafana Observer MCP server
//!
//! Speaks MCP over stdin/stdout. Logs go to stderr.

use std::process;
use std::sync::Arc;

use rmcp::ServiceExt;
use tracing::{error, info};

use grafana_observer::adapters::{GrafanaHttpClient, GrafanaMcpServer};
use grafana_observer::application::ToolDispatcher;
use grafana_observer::config::{AppConfig, LoggingConfig};

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            LoggingConfig::default().init();
            error!(error = %e, "Failed to load configuration");
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        LoggingConfig::default().init();
        error!(error = %e, "Invalid configuration");
        process::exit(1);
    }
    config.logging.init();

    let grafana = match config.grafana_config() {
        Ok(grafana) => grafana,
        Err(e) => {
            error!(error = %e, "Invalid Grafana connection settings");
            process::exit(1);
        }
    };

    info!(
        base_url = %grafana.base_url,
        auth = %grafana.auth_method(),
        org_id = %grafana.org_id,
        "Connecting to Grafana"
    );

    let client = match GrafanaHttpClient::new(grafana) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create Grafana client");
            process::exit(1);
        }
    };

    let dispatcher = Arc::new(ToolDispatcher::new(Arc::new(client)));
    let server = GrafanaMcpServer::new(dispatcher);

    info!("grafana-observer starting (stdio transport)");
    let service = match server.serve(rmcp::transport::stdio()).await {
        Ok(service) => service,
        Err(e) => {
            error!(error = %e, "MCP handshake failed");
            process::exit(1);
        }
    };

    match service.waiting().await {
        Ok(reason) => info!(reason = ?reason, "MCP session ended, shutting down"),
        Err(e) => {
            error!(error = %e, "MCP service task failed");
            process::exit(1);
        }
    }
}
