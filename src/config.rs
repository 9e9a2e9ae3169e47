//! Provider configuration.
//!
//! The host hands the provider a JSON configuration block with the API
//! endpoint and the OAuth2 client credentials. Fields left empty in the
//! configuration fall back to environment variables, so credentials can be
//! kept out of checked-in configuration:
//!
//! - `LAKESHORE_API_URL`
//! - `LAKESHORE_CLIENT_ID`
//! - `LAKESHORE_CLIENT_SECRET`
//!
//! Validation reports problems as [`Diagnostic`]s rather than hard errors,
//! so the host can show every configuration issue at once.

use serde::Deserialize;
use serde_json::Value;

use crate::client::Client;
use crate::error::ProviderError;
use crate::provider::Diagnostic;

/// Configuration accepted by the `configure` call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the Lakeshore deployment, e.g. `https://acme.lakeshore.dev`.
    pub api_url: String,
    /// OAuth2 client identifier.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
}

impl ProviderConfig {
    /// Decode a configuration block. Unknown fields are tolerated.
    pub fn from_value(config: &Value) -> Result<Self, ProviderError> {
        let parsed: Self = serde_json::from_value(config.clone())?;
        Ok(parsed.with_env_fallback())
    }

    /// Fill empty fields from the `LAKESHORE_*` environment variables.
    pub fn with_env_fallback(mut self) -> Self {
        if self.api_url.is_empty() {
            if let Ok(value) = std::env::var("LAKESHORE_API_URL") {
                self.api_url = value;
            }
        }
        if self.client_id.is_empty() {
            if let Ok(value) = std::env::var("LAKESHORE_CLIENT_ID") {
                self.client_id = value;
            }
        }
        if self.client_secret.is_empty() {
            if let Ok(value) = std::env::var("LAKESHORE_CLIENT_SECRET") {
                self.client_secret = value;
            }
        }
        self
    }

    /// Check the configuration, returning one diagnostic per problem.
    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if self.api_url.is_empty() {
            diagnostics.push(
                Diagnostic::error("Missing API URL")
                    .with_detail("Set `api_url` or the LAKESHORE_API_URL environment variable.")
                    .with_attribute("api_url"),
            );
        } else if url::Url::parse(&self.api_url).is_err() {
            diagnostics.push(
                Diagnostic::error(format!("Invalid API URL: {}", self.api_url))
                    .with_attribute("api_url"),
            );
        }
        if self.client_id.is_empty() {
            diagnostics.push(
                Diagnostic::error("Missing client id")
                    .with_detail("Set `client_id` or the LAKESHORE_CLIENT_ID environment variable.")
                    .with_attribute("client_id"),
            );
        }
        if self.client_secret.is_empty() {
            diagnostics.push(
                Diagnostic::error("Missing client secret")
                    .with_detail(
                        "Set `client_secret` or the LAKESHORE_CLIENT_SECRET environment variable.",
                    )
                    .with_attribute("client_secret"),
            );
        }
        diagnostics
    }

    /// Build the shared API client from this configuration.
    pub fn build_client(&self) -> Result<Client, ProviderError> {
        Client::new(&self.api_url, &self.client_id, &self.client_secret)
            .map_err(|err| ProviderError::Configuration(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_tolerates_unknown_fields() {
        let config = ProviderConfig::from_value(&json!({
            "api_url": "https://acme.lakeshore.dev",
            "client_id": "id",
            "client_secret": "secret",
            "future_field": true,
        }))
        .expect("decode");
        assert_eq!(config.api_url, "https://acme.lakeshore.dev");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_missing_fields_produce_one_diagnostic_each() {
        let config = ProviderConfig::default();
        let diagnostics = config.validate();
        assert_eq!(diagnostics.len(), 3);
        let attributes: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(attributes, vec!["api_url", "client_id", "client_secret"]);
    }

    #[test]
    fn test_unparsable_url_is_flagged() {
        let config = ProviderConfig {
            api_url: "not a url".into(),
            client_id: "id".into(),
            client_secret: "secret".into(),
        };
        let diagnostics = config.validate();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid API URL"));
    }

    #[test]
    fn test_env_fallback_fills_empty_fields_only() {
        std::env::set_var("LAKESHORE_CLIENT_SECRET", "from-env");
        let config = ProviderConfig {
            api_url: "https://acme.lakeshore.dev".into(),
            client_id: "explicit".into(),
            client_secret: String::new(),
        }
        .with_env_fallback();
        assert_eq!(config.client_id, "explicit");
        assert_eq!(config.client_secret, "from-env");
        std::env::remove_var("LAKESHORE_CLIENT_SECRET");
    }
}
