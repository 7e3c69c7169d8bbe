//! Per-invocation credential resolution.
//!
//! Every tool call carries an [`InvocationContext`] built fresh from the
//! transport; the [`CredentialResolver`] maps it to exactly one
//! [`Credential`] by a strict precedence order. Resolution is a pure
//! function of its inputs: the environment fallback is captured once at
//! startup, never read mid-request.

use std::collections::HashMap;

/// Immutable per-call bundle of transport headers plus the trust level of
/// the listener that accepted the call.
///
/// Header names are stored lowercased; lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    headers: HashMap<String, String>,
    trusted_transport: bool,
}

impl InvocationContext {
    /// Context with no headers, e.g. for a stdio transport.
    #[must_use]
    pub fn new(trusted_transport: bool) -> Self {
        Self {
            headers: HashMap::new(),
            trusted_transport,
        }
    }

    #[must_use]
    pub fn from_headers<I, K, V>(headers: I, trusted_transport: bool) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.as_ref().to_ascii_lowercase(), value.into()))
            .collect();
        Self {
            headers,
            trusted_transport,
        }
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Whether the call arrived over a deployment-internal listener.
    ///
    /// Set by configuration, never inferred from header presence.
    #[must_use]
    pub const fn is_trusted_transport(&self) -> bool {
        self.trusted_transport
    }
}

/// Exactly one credential is selected per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    ApiKey(String),
    UserId(String),
    None,
}

impl Credential {
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Maps an [`InvocationContext`] to a [`Credential`].
///
/// Precedence, highest first: `Authorization: Bearer` header, `X-Api-Key`
/// header, `X-User-Id` header (trusted transports only), the startup
/// fallback API key, then [`Credential::None`]. Only the first match is
/// used; sources are never merged.
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver {
    fallback_api_key: Option<String>,
}

impl CredentialResolver {
    #[must_use]
    pub fn new(fallback_api_key: Option<String>) -> Self {
        Self {
            fallback_api_key: fallback_api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    #[must_use]
    pub fn resolve(&self, context: &InvocationContext) -> Credential {
        // Only the Bearer scheme is recognized; other Authorization schemes
        // fall through to the next precedence level.
        if let Some(token) = context
            .header("authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
        {
            return Credential::Bearer(token.to_string());
        }
        if let Some(key) = context
            .header("x-api-key")
            .map(str::trim)
            .filter(|key| !key.is_empty())
        {
            return Credential::ApiKey(key.to_string());
        }
        if context.is_trusted_transport()
            && let Some(id) = context
                .header("x-user-id")
                .map(str::trim)
                .filter(|id| !id.is_empty())
        {
            return Credential::UserId(id.to_string());
        }
        if let Some(key) = &self.fallback_api_key {
            return Credential::ApiKey(key.clone());
        }
        Credential::None
    }
}
