use std::collections::BTreeMap;

use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, Extensions},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sf_client::client::SearchApi;
use sf_client::types::{SearchRequest, SimpleSearchRequest, SourceName};

use crate::helpers::{self, ToolError};
use crate::{SpaceFrontiersMcp, format};

/// Parameters for query-based search over a single source.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SimpleSearchParams {
    /// Free-text search query.
    pub query: String,
    /// Source to search in: library, telegram, reddit, wikipedia, or youtube.
    pub source: String,
    /// Maximum number of results to return.
    pub limit: Option<usize>,
    /// Number of leading results to skip.
    pub offset: Option<usize>,
}

/// Parameters for semantic search across one or more sources.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    /// Free-text search query.
    pub query: String,
    /// Map from source name to an opaque filter object passed through to
    /// upstream. Defaults to `{"library": {}}` when omitted or empty.
    pub sources_filters: Option<BTreeMap<String, Value>>,
    /// Maximum number of results to return per source.
    pub limit: Option<usize>,
}

#[tool_router(router = tool_router_search, vis = "pub")]
impl<A: SearchApi> SpaceFrontiersMcp<A> {
    /// # Errors
    /// Invalid arguments map to `INVALID_PARAMS`; upstream failures to
    /// `INVALID_REQUEST` (rejected credential) or `INTERNAL_ERROR`.
    #[tool(
        description = "Query-based search over a single source (library, telegram, reddit, wikipedia, youtube). Returns formatted text results."
    )]
    pub async fn simple_search(
        &self,
        extensions: Extensions,
        Parameters(params): Parameters<SimpleSearchParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let source = helpers::parse_source(&params.source).map_err(helpers::map_err)?;
        let query = helpers::non_blank("query", &params.query).map_err(helpers::map_err)?;
        let limit = self.bounded_limit(params.limit).map_err(helpers::map_err)?;
        let credential = self.credential_for(extensions);
        let request = SimpleSearchRequest {
            source,
            query: query.to_string(),
            limit,
            offset: params.offset.unwrap_or(0),
        };
        let response = self
            .api()
            .simple_search(request, &credential)
            .await
            .map_err(|err| helpers::map_err(ToolError::Api(err)))?;
        let text = format::search_text(&[(source, response)], &[]);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// # Errors
    /// Invalid arguments map to `INVALID_PARAMS`. Upstream failures fail the
    /// call only when every requested source failed.
    #[tool(
        description = "Semantic search across one or more sources. sources_filters maps source names to opaque filter objects and defaults to {\"library\": {}}. Failed sources are annotated in the result rather than failing the whole call."
    )]
    pub async fn search(
        &self,
        extensions: Extensions,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = helpers::non_blank("query", &params.query).map_err(helpers::map_err)?;
        let limit = self.bounded_limit(params.limit).map_err(helpers::map_err)?;
        let pairs = normalize_sources_filters(params.sources_filters).map_err(helpers::map_err)?;
        let credential = self.credential_for(extensions);

        // One semantic-search call per source-filter pair, issued
        // concurrently and joined; upstream rank order is kept per source.
        let credential_ref = &credential;
        let calls = pairs.iter().map(|(source, filters)| {
            let request = SearchRequest {
                query: query.to_string(),
                sources_filters: BTreeMap::from([(*source, filters.clone())]),
                limit,
            };
            async move { self.api().search(request, credential_ref).await }
        });
        let outcomes = futures::future::join_all(calls).await;

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for ((source, _), outcome) in pairs.iter().zip(outcomes) {
            match outcome {
                Ok(response) => succeeded.push((*source, response)),
                Err(err) => failed.push((*source, err)),
            }
        }
        // Partial results are returned with failures annotated; only when
        // every requested source failed does the invocation fail.
        if succeeded.is_empty()
            && let Some((_, err)) = failed.pop()
        {
            return Err(helpers::map_err(ToolError::Api(err)));
        }
        let text = format::search_text(&succeeded, &failed);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

/// Validates source keys and applies the `{library: {}}` default.
fn normalize_sources_filters(
    raw: Option<BTreeMap<String, Value>>,
) -> Result<Vec<(SourceName, Value)>, ToolError> {
    let raw = raw.unwrap_or_default();
    if raw.is_empty() {
        return Ok(vec![(
            SourceName::Library,
            Value::Object(serde_json::Map::new()),
        )]);
    }
    raw.into_iter()
        .map(|(name, filters)| {
            helpers::parse_source(&name).map(|source| (source, filters))
        })
        .collect()
}
