//! The host-facing provider surface.
//!
//! The plan/apply engine drives the provider through a small lifecycle:
//! validate the configuration, `configure` (which builds the shared API
//! client), then create/read/update/delete calls for resources and
//! `read_data_source` calls for the read-only surfaces. State travels as
//! untyped JSON; the per-resource mapping lives in [`crate::resources`].
//!
//! [`ProviderService`] is the contract the host dispatch consumes;
//! [`LakeshoreProvider`] is the one implementation in this crate. The host
//! shares the provider across worker tasks, so every operation takes
//! `&self` and the configured client sits behind a lock.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use crate::client::Client;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::resources;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// An error that prevents the operation from completing.
    Error,
    /// A warning that doesn't prevent the operation but should be addressed.
    Warning,
}

/// A diagnostic message from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: DiagnosticSeverity,
    /// A short summary of the issue.
    pub summary: String,
    /// A detailed description of the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The attribute path where the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Add detail to this diagnostic.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the attribute path for this diagnostic.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// Provider metadata: the resource and data-source types this plugin serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// List of resource type names.
    pub resources: Vec<String>,
    /// List of data source type names.
    pub data_sources: Vec<String>,
}

/// The contract between the host dispatch and a provider implementation.
///
/// State and configuration travel as untyped JSON values; errors come back
/// typed so the host can distinguish "gone" ([`ProviderError::is_not_found`])
/// from "failed".
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    /// The resource and data-source types this provider serves.
    fn metadata(&self) -> ProviderMetadata;

    /// Validate the provider configuration without applying it.
    fn validate_provider_config(&self, config: &Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Configure the provider with endpoint and credentials.
    async fn configure(&self, config: &Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Create a new resource from its planned state.
    async fn create(
        &self,
        resource_type: &str,
        planned_state: &Value,
    ) -> Result<Value, ProviderError>;

    /// Read the live state of a resource.
    async fn read(
        &self,
        resource_type: &str,
        current_state: &Value,
    ) -> Result<Value, ProviderError>;

    /// Update a resource in place.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: &Value,
        planned_state: &Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(
        &self,
        resource_type: &str,
        current_state: &Value,
    ) -> Result<(), ProviderError>;

    /// Read a data source.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: &Value,
    ) -> Result<Value, ProviderError>;
}

/// The Lakeshore provider.
#[derive(Debug, Default)]
pub struct LakeshoreProvider {
    client: RwLock<Option<Arc<Client>>>,
}

impl LakeshoreProvider {
    /// Create an unconfigured provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider around an already-built client. Useful in tests.
    pub fn with_client(client: Client) -> Self {
        Self {
            client: RwLock::new(Some(Arc::new(client))),
        }
    }

    async fn client(&self) -> Result<Arc<Client>, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration("provider has not been configured".into())
        })
    }
}

#[async_trait::async_trait]
impl ProviderService for LakeshoreProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            resources: resources::RESOURCE_TYPES.iter().map(|s| s.to_string()).collect(),
            data_sources: resources::DATA_SOURCE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    fn validate_provider_config(&self, config: &Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let config = ProviderConfig::from_value(config)?;
        Ok(config.validate())
    }

    /// Configure the provider, building the shared API client.
    ///
    /// Returns the configuration diagnostics; the client is only built when
    /// none of them are errors.
    async fn configure(&self, config: &Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let config = ProviderConfig::from_value(config)?;
        let diagnostics = config.validate();
        if diagnostics.iter().any(Diagnostic::is_error) {
            return Ok(diagnostics);
        }

        let client = config.build_client()?;
        info!(api_url = %client.base_url(), "configured lakeshore provider");
        *self.client.write().await = Some(Arc::new(client));
        Ok(diagnostics)
    }

    async fn create(
        &self,
        resource_type: &str,
        planned_state: &Value,
    ) -> Result<Value, ProviderError> {
        let client = self.client().await?;
        resources::create(&client, resource_type, planned_state).await
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: &Value,
    ) -> Result<Value, ProviderError> {
        let client = self.client().await?;
        resources::read(&client, resource_type, current_state).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: &Value,
        planned_state: &Value,
    ) -> Result<Value, ProviderError> {
        let client = self.client().await?;
        resources::update(&client, resource_type, prior_state, planned_state).await
    }

    async fn delete(
        &self,
        resource_type: &str,
        current_state: &Value,
    ) -> Result<(), ProviderError> {
        let client = self.client().await?;
        resources::delete(&client, resource_type, current_state).await
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: &Value,
    ) -> Result<Value, ProviderError> {
        let client = self.client().await?;
        resources::read_data_source(&client, data_source_type, config).await
    }
}
