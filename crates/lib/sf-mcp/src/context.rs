//! Builds the per-call invocation context from the rmcp request extensions.

use rmcp::model::Extensions;
use sf_client::auth::InvocationContext;

/// Snapshot of the transport headers for one tool call.
///
/// The streamable HTTP transport stores the request parts in the call's
/// extensions; stdio transports carry no headers, so resolution falls
/// through to the process-level fallback credential.
pub(crate) fn invocation_context(
    mut extensions: Extensions,
    trusted_transport: bool,
) -> InvocationContext {
    extensions.remove::<axum::http::request::Parts>().map_or_else(
        || InvocationContext::new(trusted_transport),
        |parts| {
            let headers = parts.headers.iter().filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|text| (name.as_str(), text.to_string()))
            });
            InvocationContext::from_headers(headers, trusted_transport)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_extensions_yield_headerless_context() {
        let context = invocation_context(Extensions::default(), true);
        assert!(context.header("authorization").is_none());
        assert!(context.is_trusted_transport());
    }

    #[test]
    fn http_parts_headers_are_copied_into_the_context() {
        let request = axum::http::Request::builder()
            .uri("/mcp")
            .header("Authorization", "Bearer token-1")
            .header("X-User-Id", "42")
            .body(())
            .unwrap();
        let (parts, ()) = request.into_parts();
        let mut extensions = Extensions::default();
        extensions.insert(parts);

        let context = invocation_context(extensions, false);
        assert_eq!(context.header("authorization"), Some("Bearer token-1"));
        assert_eq!(context.header("x-user-id"), Some("42"));
        assert!(!context.is_trusted_transport());
    }
}
