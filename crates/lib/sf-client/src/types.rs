//! Wire types for the Space Frontiers search API.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Known upstream data sources.
///
/// Used both as a search-target selector and as a required parameter for
/// per-document operations. The set is closed; free-form source strings are
/// rejected at the tool boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceName {
    Library,
    Telegram,
    Reddit,
    Wikipedia,
    Youtube,
}

impl SourceName {
    pub const ALL: [Self; 5] = [
        Self::Library,
        Self::Telegram,
        Self::Reddit,
        Self::Wikipedia,
        Self::Youtube,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Telegram => "telegram",
            Self::Reddit => "reddit",
            Self::Wikipedia => "wikipedia",
            Self::Youtube => "youtube",
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a source name is not one of the known sources.
#[derive(Debug, Clone)]
pub struct UnknownSource {
    name: String,
}

impl fmt::Display for UnknownSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown source: {} (expected one of library, telegram, reddit, wikipedia, youtube)",
            self.name
        )
    }
}

impl std::error::Error for UnknownSource {}

impl FromStr for SourceName {
    type Err = UnknownSource;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "library" => Ok(Self::Library),
            "telegram" => Ok(Self::Telegram),
            "reddit" => Ok(Self::Reddit),
            "wikipedia" => Ok(Self::Wikipedia),
            "youtube" => Ok(Self::Youtube),
            other => Err(UnknownSource {
                name: other.to_string(),
            }),
        }
    }
}

/// Semantic search request.
///
/// Filter values are opaque key-value constraints passed through to
/// upstream untouched; only the source keys are validated locally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub sources_filters: BTreeMap<SourceName, Value>,
    pub limit: usize,
}

/// Simple (non-semantic) search request against one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleSearchRequest {
    pub source: SourceName,
    pub query: String,
    pub limit: usize,
    pub offset: usize,
}

/// Free-form identifier resolution request (DOI, ISBN, PMID, URL, ...).
/// Classification of the identifier is delegated entirely to upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolveRequest {
    pub identifier: String,
}

/// Query-filtered document content request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRequest {
    pub document_uri: String,
    pub source: SourceName,
    pub query: String,
}

/// Document metadata request, distinct from the content-search path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRequest {
    pub document_uri: String,
    pub source: SourceName,
}

/// Raw search payload as returned by upstream, rank order preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub search_documents: Vec<SearchDocument>,
}

/// One matched document with its opaque field bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub document: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceName>,
}

/// Raw identifier-resolution payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveResponse {
    #[serde(default)]
    pub matches: Vec<ResolvedMatch>,
}

/// One resolution candidate. `resolved_uri` is echoed from upstream as-is;
/// the adapter never constructs document URIs locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMatch {
    pub resolved_uri: String,
    pub source: SourceName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Query-relevant excerpts of a document's content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnippets {
    #[serde(default)]
    pub snippets: Vec<Snippet>,
}

/// One excerpt upstream judged relevant to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Fixed metadata record for a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn source_names_parse_case_insensitively() {
        assert_eq!("library".parse::<SourceName>().unwrap(), SourceName::Library);
        assert_eq!("Reddit".parse::<SourceName>().unwrap(), SourceName::Reddit);
        assert_eq!(" YOUTUBE ".parse::<SourceName>().unwrap(), SourceName::Youtube);
    }

    #[test]
    fn unknown_source_is_rejected() {
        let err = "myspace".parse::<SourceName>().unwrap_err();
        assert!(err.to_string().contains("unknown source: myspace"));
    }

    #[test]
    fn source_names_serialize_lowercase() {
        for source in SourceName::ALL {
            let encoded = serde_json::to_value(source).unwrap();
            assert_eq!(encoded, json!(source.as_str()));
        }
    }

    #[test]
    fn search_request_keeps_filters_opaque() {
        let mut sources_filters = BTreeMap::new();
        sources_filters.insert(
            SourceName::Telegram,
            json!({"telegram_channel_usernames": ["@space"]}),
        );
        let request = SearchRequest {
            query: "orbits".to_string(),
            sources_filters,
            limit: 10,
        };
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(
            encoded["sources_filters"]["telegram"]["telegram_channel_usernames"][0],
            json!("@space")
        );
    }

    #[test]
    fn metadata_defaults_missing_fields() {
        let metadata: DocumentMetadata =
            serde_json::from_value(json!({"title": "On Orbits"})).unwrap();
        assert_eq!(metadata.title.as_deref(), Some("On Orbits"));
        assert!(metadata.authors.is_empty());
        assert!(metadata.abstract_text.is_none());
        assert!(metadata.references.is_empty());
    }
}
