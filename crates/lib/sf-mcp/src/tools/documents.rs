use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, Extensions},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use sf_client::client::SearchApi;
use sf_client::types::{DocumentRequest, MetadataRequest, ResolveRequest};

use crate::helpers::{self, ToolError};
use crate::{SpaceFrontiersMcp, format};

/// Parameters for resolving a free-form identifier.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ResolveIdParams {
    /// Free-form identifier: DOI, ISBN, PMID, URL, ...
    pub identifier: String,
}

/// Parameters for fetching query-filtered document content.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetDocumentParams {
    /// Document URI produced by `resolve_id`, e.g. `doi://10.1038/...`.
    pub document_uri: String,
    /// Source the document lives in.
    pub source: String,
    /// Query the returned snippets must be relevant to. Required; this tool
    /// never returns a full document.
    pub query: String,
}

/// Parameters for fetching a document's metadata record.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetDocumentMetadataParams {
    /// Document URI produced by `resolve_id`.
    pub document_uri: String,
    /// Source the document lives in.
    pub source: String,
}

#[tool_router(router = tool_router_documents, vis = "pub")]
impl<A: SearchApi> SpaceFrontiersMcp<A> {
    /// # Errors
    /// A blank identifier maps to `INVALID_PARAMS`; upstream failures to
    /// `INVALID_REQUEST` (rejected credential) or `INTERNAL_ERROR`.
    #[tool(
        description = "Resolve a free-form identifier (DOI, ISBN, PubMed ID, URL) into document URIs. Returns {success, matches}; success=false with no matches means the identifier is unknown upstream."
    )]
    pub async fn resolve_id(
        &self,
        extensions: Extensions,
        Parameters(params): Parameters<ResolveIdParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let identifier =
            helpers::non_blank("identifier", &params.identifier).map_err(helpers::map_err)?;
        let credential = self.credential_for(extensions);
        let request = ResolveRequest {
            identifier: identifier.to_string(),
        };
        let response = self
            .api()
            .resolve_id(request, &credential)
            .await
            .map_err(|err| helpers::map_err(ToolError::Api(err)))?;
        Ok(CallToolResult::success(vec![Content::json(
            format::resolve_result(response),
        )?]))
    }

    /// # Errors
    /// Invalid arguments (including a blank `query`) map to `INVALID_PARAMS`
    /// before any upstream call; upstream failures to `INVALID_REQUEST` or
    /// `INTERNAL_ERROR`.
    #[tool(
        description = "Fetch the snippets of a document that are relevant to a query. query is required; the full document is never returned."
    )]
    pub async fn get_document(
        &self,
        extensions: Extensions,
        Parameters(params): Parameters<GetDocumentParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let source = helpers::parse_source(&params.source).map_err(helpers::map_err)?;
        let document_uri =
            helpers::non_blank("document_uri", &params.document_uri).map_err(helpers::map_err)?;
        let query = helpers::non_blank("query", &params.query).map_err(helpers::map_err)?;
        let credential = self.credential_for(extensions);
        let request = DocumentRequest {
            document_uri: document_uri.to_string(),
            source,
            query: query.to_string(),
        };
        let snippets = self
            .api()
            .get_document(request, &credential)
            .await
            .map_err(|err| helpers::map_err(ToolError::Api(err)))?;
        Ok(CallToolResult::success(vec![Content::json(snippets)?]))
    }

    /// # Errors
    /// Invalid arguments map to `INVALID_PARAMS`; upstream failures to
    /// `INVALID_REQUEST` (rejected credential) or `INTERNAL_ERROR`.
    #[tool(
        description = "Fetch a document's metadata record: title, authors, abstract, and references. Query-less single round trip; never searches content."
    )]
    pub async fn get_document_metadata(
        &self,
        extensions: Extensions,
        Parameters(params): Parameters<GetDocumentMetadataParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let source = helpers::parse_source(&params.source).map_err(helpers::map_err)?;
        let document_uri =
            helpers::non_blank("document_uri", &params.document_uri).map_err(helpers::map_err)?;
        let credential = self.credential_for(extensions);
        let request = MetadataRequest {
            document_uri: document_uri.to_string(),
            source,
        };
        let metadata = self
            .api()
            .get_document_metadata(request, &credential)
            .await
            .map_err(|err| helpers::map_err(ToolError::Api(err)))?;
        Ok(CallToolResult::success(vec![Content::json(metadata)?]))
    }
}
