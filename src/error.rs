//! Error types for the Lakeshore provider.
//!
//! Two layers of errors exist:
//!
//! - [`Error`] is the client taxonomy: what the API client reports to the
//!   resource handlers. Handlers mostly care about one predicate,
//!   [`Error::is_not_found`], which tells the plan/apply engine to drop a
//!   resource from managed state.
//! - [`ProviderError`] is the provider surface: what the host sees. Client
//!   errors convert into it via `From`, everything else (unknown resource
//!   types, bad configuration) originates here.

use thiserror::Error as ThisError;

/// Errors reported by the Lakeshore API client.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The remote returned HTTP 404, or a local alternate-key or indirect
    /// lookup found no match.
    #[error("not found: {path}")]
    NotFound {
        /// The request path or lookup key that produced no match.
        path: String,
    },

    /// A non-retryable HTTP failure, including exhausted 401/403/429
    /// retries. Carries the status and the raw response body.
    #[error("remote error: HTTP {status}: {body}")]
    Remote {
        /// The HTTP status code.
        status: u16,
        /// The response body as text.
        body: String,
    },

    /// A network or TLS failure underneath the HTTP exchange.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded as JSON. Classified with
    /// transport failures: the caller cannot distinguish a garbled wire
    /// from a dead one.
    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The token endpoint rejected the client-credentials grant.
    #[error("token acquisition failed: HTTP {status}: {body}")]
    TokenAcquisition {
        /// The HTTP status code from `/oauth/v2/token`.
        status: u16,
        /// The response body as text.
        body: String,
    },
}

impl Error {
    /// Whether this error means the requested object does not exist.
    ///
    /// Upper layers use this to remove a resource from managed state
    /// instead of failing the run.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } | Self::TokenAcquisition { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn remote(status: u16, body: impl Into<String>) -> Self {
        Self::Remote {
            status,
            body: body.into(),
        }
    }
}

/// Errors surfaced to the plugin host.
#[derive(Debug, ThisError)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// The Lakeshore API reported a failure.
    #[error("API error: {0}")]
    Api(Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// Whether this error means the underlying object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<Error> for ProviderError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { path } => Self::NotFound(path),
            other => Self::Api(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("/public/api/v1/user/u1");
        assert_eq!(format!("{}", err), "not found: /public/api/v1/user/u1");

        let err = Error::remote(500, "boom");
        assert_eq!(format!("{}", err), "remote error: HTTP 500: boom");

        let err = Error::TokenAcquisition {
            status: 401,
            body: "bad client".into(),
        };
        assert_eq!(
            format!("{}", err),
            "token acquisition failed: HTTP 401: bad client"
        );
    }

    #[test]
    fn test_not_found_predicate() {
        assert!(Error::not_found("role/rX").is_not_found());
        assert!(!Error::remote(500, "boom").is_not_found());
        assert!(!Error::TokenAcquisition {
            status: 403,
            body: String::new()
        }
        .is_not_found());
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(Error::remote(429, "slow down").status(), Some(429));
        assert_eq!(
            Error::TokenAcquisition {
                status: 400,
                body: String::new()
            }
            .status(),
            Some(400)
        );
        assert_eq!(Error::not_found("x").status(), None);
    }

    #[test]
    fn test_not_found_maps_to_provider_not_found() {
        let err: ProviderError = Error::not_found("user/u1").into();
        assert!(err.is_not_found());
        assert_eq!(format!("{}", err), "Resource not found: user/u1");

        let err: ProviderError = Error::remote(500, "boom").into();
        assert!(!err.is_not_found());
        assert!(matches!(err, ProviderError::Api(Error::Remote { .. })));
    }
}
