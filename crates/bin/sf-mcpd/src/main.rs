//! Daemon entry point for the Space Frontiers MCP server.
//!
//! Loads configuration from the environment, builds the upstream client and
//! credential resolver, and serves the MCP protocol over streamable HTTP,
//! stdio, or both.

mod config;

use sf_client::auth::CredentialResolver;
use sf_client::client::{ClientConfig, RetryPolicy, SearchApiClient};
use sf_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use sf_mcp::{ServiceConfig, SpaceFrontiersMcp};
use tracing_subscriber::EnvFilter;

use crate::config::SfConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Logs go to stderr; stdout may carry the stdio MCP transport.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = SfConfig::from_args()?;

    let client_config = ClientConfig::new(config.api_endpoint.clone())
        .with_timeout(config.upstream_timeout)
        .with_retry(RetryPolicy {
            max_attempts: config.upstream_attempts,
            backoff: config.retry_backoff,
        });
    let api = SearchApiClient::new(client_config)?;
    let resolver = CredentialResolver::new(config.api_key.clone());
    let service_config = ServiceConfig {
        max_limit: config.max_search_limit,
        default_limit: config.default_search_limit,
        trusted_transport: config.trusted_transport,
    };
    let service = SpaceFrontiersMcp::new(api, resolver, service_config);

    let http_config = McpHttpServerConfig::new(config.mcp_http_addr);
    match (config.mcp_serve, config.enable_stdio) {
        (true, true) => {
            tracing::info!(addr = %config.mcp_http_addr, "serving MCP over streamable HTTP and stdio");
            let http_service = service.clone();
            let http = tokio::spawn(serve_streamable_http(http_service, http_config));
            serve_stdio(service).await?;
            http.abort();
        }
        (true, false) => {
            tracing::info!(addr = %config.mcp_http_addr, "serving MCP over streamable HTTP");
            serve_streamable_http(service, http_config).await?;
        }
        (false, true) => {
            tracing::info!("serving MCP over stdio");
            serve_stdio(service).await?;
        }
        (false, false) => {
            return Err("nothing to serve: both --mcp-serve and --stdio are disabled".into());
        }
    }
    Ok(())
}
