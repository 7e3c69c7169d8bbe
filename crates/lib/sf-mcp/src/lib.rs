//! MCP server implementation for the Space Frontiers search adapter.
//!
//! This crate wires the upstream client into rmcp tool handlers: each tool
//! call resolves its credential from the per-request context, validates its
//! arguments, dispatches to the upstream operation, and shapes the result
//! into the tool's documented return form.

mod context;
mod format;
mod helpers;
mod prompts;
pub mod server;
pub mod tools;

use std::sync::Arc;

use rmcp::{ErrorData, ServerHandler, handler::server::tool::ToolRouter, tool_handler};
use rmcp::model::{
    GetPromptRequestParams,
    GetPromptResult,
    ListPromptsResult,
    PaginatedRequestParams,
    ServerCapabilities,
    ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use sf_client::auth::{Credential, CredentialResolver};
use sf_client::client::SearchApi;

pub use helpers::ToolError;

const SERVER_INSTRUCTIONS: &str = r"Space Frontiers MCP server: search and document tools over the Space Frontiers API.

Tools:
- `search`: semantic search; `sources_filters` maps source names (library, telegram, reddit, wikipedia, youtube) to opaque filter objects and defaults to {library: {}}.
- `simple_search`: query search over a single source with limit/offset paging.
- `resolve_id`: turn a free-form identifier (DOI, ISBN, PubMed ID, URL) into document URIs. An empty match list with success=false is a valid negative result.
- `get_document`: query-filtered snippets of one document; `query` is required.
- `get_document_metadata`: title, authors, abstract, and references only.

Prompts:
- `analyse_telegram_channel_content`: template for deriving a Telegram channel's traits from a set of its messages (pass search results as the `search_results` argument).

Authentication is negotiated per request from `Authorization: Bearer`, `X-Api-Key`, or the server's configured fallback key.";

/// Process-wide limits and trust settings, read-only after startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound accepted for `limit` arguments.
    pub max_limit: usize,
    /// `limit` used when the caller omits one.
    pub default_limit: usize,
    /// Whether the transport is deployment-internal; gates `X-User-Id`.
    pub trusted_transport: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_limit: 100,
            default_limit: 10,
            trusted_transport: false,
        }
    }
}

/// MCP server wrapper around the upstream search API and tool routers.
pub struct SpaceFrontiersMcp<A: SearchApi> {
    tool_router: ToolRouter<Self>,
    api: Arc<A>,
    resolver: CredentialResolver,
    config: ServiceConfig,
}

impl<A: SearchApi> Clone for SpaceFrontiersMcp<A> {
    fn clone(&self) -> Self {
        Self {
            tool_router: self.tool_router.clone(),
            api: self.api.clone(),
            resolver: self.resolver.clone(),
            config: self.config.clone(),
        }
    }
}

impl<A: SearchApi> SpaceFrontiersMcp<A> {
    /// Creates a new server owning the upstream API client.
    #[must_use]
    pub fn new(api: A, resolver: CredentialResolver, config: ServiceConfig) -> Self {
        Self::with_api(Arc::new(api), resolver, config)
    }

    /// Creates a new server using a shared API handle.
    #[must_use]
    pub fn with_api(api: Arc<A>, resolver: CredentialResolver, config: ServiceConfig) -> Self {
        let tool_router = Self::tool_router_search() + Self::tool_router_documents();
        Self {
            tool_router,
            api,
            resolver,
            config,
        }
    }

    /// Shared handle to the upstream API.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Resolves the credential for one tool call from the request context.
    pub(crate) fn credential_for(&self, extensions: rmcp::model::Extensions) -> Credential {
        let context = context::invocation_context(extensions, self.config.trusted_transport);
        self.resolver.resolve(&context)
    }

    /// Applies the default and the configured upper bound to a `limit`
    /// argument. A limit equal to the maximum is accepted.
    pub(crate) fn bounded_limit(&self, limit: Option<usize>) -> Result<usize, ToolError> {
        let limit = limit.unwrap_or(self.config.default_limit);
        if limit == 0 {
            return Err(ToolError::Validation("limit must be at least 1".to_string()));
        }
        if limit > self.config.max_limit {
            return Err(ToolError::Validation(format!(
                "limit {limit} exceeds the configured maximum of {}",
                self.config.max_limit
            )));
        }
        Ok(limit)
    }
}

#[tool_handler]
impl<A: SearchApi> ServerHandler for SpaceFrontiersMcp<A> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            ..Default::default()
        }
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        Ok(ListPromptsResult {
            meta: None,
            next_cursor: None,
            prompts: prompts::all(),
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        prompts::get(&request.name, request.arguments.as_ref())
    }
}
