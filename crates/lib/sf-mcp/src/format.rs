//! Shapes raw upstream payloads into the tools' documented return forms.
//!
//! Search tools return a deterministic textual encoding, one block per
//! match, so results stay mechanically parseable. Document tools return
//! typed JSON. No fields are invented locally and upstream-reported
//! failures are never dropped silently.

use std::fmt::Write as _;

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;
use sf_client::client::ApiError;
use sf_client::types::{ResolveResponse, ResolvedMatch, SearchResponse, SourceName};

/// Document fields rendered into a search result block, in output order.
const BLOCK_FIELDS: [&str; 5] = ["title", "uri", "issued_at", "abstract", "snippet"];

/// Tool-facing shape of an identifier resolution.
///
/// `success: false` with no matches is a valid negative result, not an
/// error.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveResult {
    pub success: bool,
    pub matches: Vec<ResolvedMatch>,
}

pub(crate) fn resolve_result(response: ResolveResponse) -> ResolveResult {
    ResolveResult {
        success: !response.matches.is_empty(),
        matches: response.matches,
    }
}

/// Renders per-source search responses as text blocks.
///
/// Sources appear in the order they were requested; within a source the
/// upstream rank order is preserved untouched. Failed sources are listed in
/// a trailing annotation block.
pub(crate) fn search_text(
    results: &[(SourceName, SearchResponse)],
    failed: &[(SourceName, ApiError)],
) -> String {
    let mut out = String::new();
    for (source, response) in results {
        for (index, matched) in response.search_documents.iter().enumerate() {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "=== {source} #{} ===", index + 1);
            for field in BLOCK_FIELDS {
                if let Some(value) = matched.document.get(field) {
                    push_field(&mut out, field, value);
                }
            }
        }
    }
    if !failed.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("failed sources:\n");
        for (source, err) in failed {
            let _ = writeln!(out, "{source}: {err}");
        }
    }
    if out.is_empty() {
        out.push_str("no results\n");
    }
    out
}

fn push_field(out: &mut String, field: &str, value: &Value) {
    if field == "issued_at"
        && let Some(encoded) = epoch_seconds(value).and_then(|secs| DateTime::from_timestamp(secs, 0))
    {
        let _ = writeln!(out, "{field}: {}", encoded.to_rfc3339());
        return;
    }
    match value {
        Value::String(text) => {
            let _ = writeln!(out, "{field}: {text}");
        }
        other => {
            let _ = writeln!(out, "{field}: {other}");
        }
    }
}

/// Upstream emits epochs as either integer or fractional seconds;
/// fractional ones are truncated to whole seconds.
#[allow(clippy::cast_possible_truncation)]
fn epoch_seconds(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sf_client::types::SearchDocument;

    fn response(documents: Vec<Value>) -> SearchResponse {
        SearchResponse {
            search_documents: documents
                .into_iter()
                .map(|document| SearchDocument {
                    document,
                    score: None,
                    source: None,
                })
                .collect(),
        }
    }

    #[test]
    fn one_block_per_match_in_rank_order() {
        let results = vec![(
            SourceName::Library,
            response(vec![
                json!({"title": "First", "uri": "doi://10.1/a"}),
                json!({"title": "Second", "uri": "doi://10.1/b"}),
            ]),
        )];
        let text = search_text(&results, &[]);
        assert_eq!(
            text,
            "=== library #1 ===\ntitle: First\nuri: doi://10.1/a\n\n=== library #2 ===\ntitle: Second\nuri: doi://10.1/b\n"
        );
    }

    #[test]
    fn issued_at_epoch_seconds_become_iso() {
        let results = vec![(
            SourceName::Library,
            response(vec![json!({"title": "Dated", "issued_at": 1_700_000_000})]),
        )];
        let text = search_text(&results, &[]);
        assert!(text.contains("issued_at: 2023-11-14T22:13:20+00:00"), "{text}");
    }

    #[test]
    fn fractional_epoch_seconds_are_truncated() {
        let results = vec![(
            SourceName::Library,
            response(vec![json!({"title": "Dated", "issued_at": 1_700_000_000.75})]),
        )];
        let text = search_text(&results, &[]);
        assert!(text.contains("issued_at: 2023-11-14T22:13:20+00:00"), "{text}");
    }

    #[test]
    fn failed_sources_are_annotated_after_results() {
        let results = vec![(
            SourceName::Library,
            response(vec![json!({"title": "Kept"})]),
        )];
        let failed = vec![(
            SourceName::Reddit,
            ApiError::Status {
                status: 502,
                message: "bad gateway".to_string(),
            },
        )];
        let text = search_text(&results, &failed);
        assert!(text.starts_with("=== library #1 ==="));
        assert!(text.contains("failed sources:\nreddit: upstream returned status 502"));
    }

    #[test]
    fn no_matches_and_no_failures_is_explicit() {
        let text = search_text(&[(SourceName::Library, response(vec![]))], &[]);
        assert_eq!(text, "no results\n");
    }

    #[test]
    fn empty_resolution_is_a_negative_result_not_an_error() {
        let shaped = resolve_result(ResolveResponse::default());
        assert!(!shaped.success);
        assert!(shaped.matches.is_empty());
    }

    #[test]
    fn resolution_with_matches_flags_success() {
        let shaped = resolve_result(ResolveResponse {
            matches: vec![ResolvedMatch {
                resolved_uri: "doi://10.1038/nature12345".to_string(),
                source: SourceName::Library,
                confidence: Some(0.99),
                metadata: None,
            }],
        });
        assert!(shaped.success);
        assert_eq!(shaped.matches[0].resolved_uri, "doi://10.1038/nature12345");
    }
}
