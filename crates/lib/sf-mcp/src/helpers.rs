use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use rmcp::ErrorData;
use rmcp::model::ErrorCode;
use sf_client::client::ApiError;
use sf_client::types::SourceName;

/// Tool-level failures surfaced to the MCP runtime.
#[derive(Debug)]
pub enum ToolError {
    /// Bad or missing tool arguments; the caller's fault, never retried.
    Validation(String),
    /// Unknown source name; a validation subtype with its own identity.
    InvalidSource(String),
    /// The upstream call failed after the client's retry policy ran out.
    Api(ApiError),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(message) | Self::InvalidSource(message) => f.write_str(message),
            Self::Api(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ToolError {}

impl From<ApiError> for ToolError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

pub(crate) fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

pub(crate) fn map_err(err: ToolError) -> ErrorData {
    let message = err.to_string();
    match err {
        ToolError::Validation(_) | ToolError::InvalidSource(_) => {
            mcp_err(ErrorCode::INVALID_PARAMS, message)
        }
        ToolError::Api(ApiError::Authentication { .. }) => {
            mcp_err(ErrorCode::INVALID_REQUEST, message)
        }
        ToolError::Api(_) => mcp_err(ErrorCode::INTERNAL_ERROR, message),
    }
}

pub(crate) fn parse_source(name: &str) -> Result<SourceName, ToolError> {
    name.parse()
        .map_err(|err: sf_client::types::UnknownSource| ToolError::InvalidSource(err.to_string()))
}

pub(crate) fn non_blank<'a>(name: &str, value: &'a str) -> Result<&'a str, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::Validation(format!("{name} must not be empty")));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_invalid_params() {
        let err = map_err(ToolError::Validation("limit must be at least 1".to_string()));
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn auth_rejection_maps_to_invalid_request() {
        let err = map_err(ToolError::Api(ApiError::Authentication {
            status: 403,
            message: "expired".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::INVALID_REQUEST);
        assert!(err.message.contains("expired"));
    }

    #[test]
    fn upstream_failure_maps_to_internal_error() {
        let err = map_err(ToolError::Api(ApiError::Timeout));
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn non_blank_trims_and_rejects_whitespace() {
        assert_eq!(non_blank("query", "  orbits ").unwrap(), "orbits");
        assert!(non_blank("query", "   ").is_err());
    }
}
