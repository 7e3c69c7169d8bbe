use clap::{Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use sf_client::client::DEFAULT_ENDPOINT;

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4030";
const DEFAULT_MAX_SEARCH_LIMIT: usize = 100;
const DEFAULT_SEARCH_LIMIT: usize = 10;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_UPSTREAM_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;

#[derive(Parser, Debug)]
#[command(name = "sf-mcpd", version, about = "Space Frontiers MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "SPACE_FRONTIERS_API_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    api_endpoint: String,

    #[arg(long, env = "SPACE_FRONTIERS_API_KEY")]
    api_key: Option<String>,

    #[arg(
        long,
        env = "SF_MAX_SEARCH_LIMIT",
        default_value_t = DEFAULT_MAX_SEARCH_LIMIT
    )]
    max_search_limit: usize,

    #[arg(
        long,
        env = "SF_DEFAULT_SEARCH_LIMIT",
        default_value_t = DEFAULT_SEARCH_LIMIT
    )]
    default_search_limit: usize,

    #[arg(
        long,
        env = "SF_UPSTREAM_TIMEOUT_SECS",
        default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS
    )]
    upstream_timeout_secs: u64,

    /// Total upstream attempts per call, including the first.
    #[arg(
        long,
        env = "SF_UPSTREAM_ATTEMPTS",
        default_value_t = DEFAULT_UPSTREAM_ATTEMPTS
    )]
    upstream_attempts: u32,

    #[arg(
        long,
        env = "SF_RETRY_BACKOFF_MS",
        default_value_t = DEFAULT_RETRY_BACKOFF_MS
    )]
    retry_backoff_ms: u64,

    #[arg(
        long,
        env = "SF_TRUSTED_TRANSPORT",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    trusted_transport: bool,

    #[arg(
        long = "stdio",
        env = "SF_ENABLE_STDIO",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "SF_MCP_SERVE",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "SF_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone, Debug)]
pub struct SfConfig {
    pub api_endpoint: String,
    pub api_key: Option<String>,
    pub max_search_limit: usize,
    pub default_search_limit: usize,
    pub upstream_timeout: Duration,
    pub upstream_attempts: u32,
    pub retry_backoff: Duration,
    pub trusted_transport: bool,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http_addr: SocketAddr,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl SfConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for SfConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let api_endpoint = args.api_endpoint.trim().trim_end_matches('/').to_string();
        if api_endpoint.is_empty() {
            return Err(ConfigError::MissingSetting("SPACE_FRONTIERS_API_ENDPOINT"));
        }

        // A blank key from the environment behaves as no key at all.
        let api_key = args.api_key.filter(|value| !value.trim().is_empty());

        if args.max_search_limit == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "SF_MAX_SEARCH_LIMIT",
                value: args.max_search_limit.to_string(),
            });
        }
        if args.default_search_limit == 0 || args.default_search_limit > args.max_search_limit {
            return Err(ConfigError::InvalidSetting {
                name: "SF_DEFAULT_SEARCH_LIMIT",
                value: args.default_search_limit.to_string(),
            });
        }
        if args.upstream_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "SF_UPSTREAM_TIMEOUT_SECS",
                value: args.upstream_timeout_secs.to_string(),
            });
        }
        if args.upstream_attempts == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "SF_UPSTREAM_ATTEMPTS",
                value: args.upstream_attempts.to_string(),
            });
        }

        Ok(Self {
            api_endpoint,
            api_key,
            max_search_limit: args.max_search_limit,
            default_search_limit: args.default_search_limit,
            upstream_timeout: Duration::from_secs(args.upstream_timeout_secs),
            upstream_attempts: args.upstream_attempts,
            retry_backoff: Duration::from_millis(args.retry_backoff_ms),
            trusted_transport: args.trusted_transport,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http_addr: args.mcp_http_addr,
        })
    }
}
