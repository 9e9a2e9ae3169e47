//! Testing utilities for the provider surface.
//!
//! [`ProviderTester`] wraps a [`LakeshoreProvider`] and turns
//! diagnostics-returning lifecycle calls into plain `Result`s, so tests can
//! `?` their way through configure-then-operate sequences.
//!
//! ```ignore
//! use lakeshore_provider::testing::ProviderTester;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn creates_a_tag() {
//!     let tester = ProviderTester::new(LakeshoreProvider::new());
//!     tester.configure(json!({
//!         "api_url": server.uri(),
//!         "client_id": "id",
//!         "client_secret": "secret",
//!     })).await.unwrap();
//!
//!     let state = tester.create("lakeshore_tag", json!({"name": "pii"})).await.unwrap();
//!     assert_eq!(state["name"], "pii");
//! }
//! ```

use serde_json::Value;
use thiserror::Error as ThisError;

use crate::client::Client;
use crate::error::ProviderError;
use crate::provider::{Diagnostic, LakeshoreProvider, ProviderService};

/// A failure observed through the tester.
#[derive(Debug, ThisError)]
pub enum TestError {
    /// The provider returned an error.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A lifecycle call returned error diagnostics.
    #[error("diagnostics contained errors: {0:?}")]
    Diagnostics(Vec<Diagnostic>),
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    if diagnostics.iter().any(Diagnostic::is_error) {
        return Err(TestError::Diagnostics(diagnostics));
    }
    Ok(())
}

/// A test harness around a provider implementation.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl ProviderTester<LakeshoreProvider> {
    /// Build a tester around an already-configured client, skipping the
    /// configure lifecycle.
    pub fn from_client(client: Client) -> Self {
        Self {
            provider: LakeshoreProvider::with_client(client),
        }
    }
}

impl<P: ProviderService> ProviderTester<P> {
    /// Wrap an existing provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Validate a provider configuration, failing on error diagnostics.
    pub fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        check_diagnostics(self.provider.validate_provider_config(&config)?)
    }

    /// Configure the provider, failing on error diagnostics.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        check_diagnostics(self.provider.configure(&config).await?)
    }

    /// Create a resource.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, &planned_state).await
    }

    /// Read a resource.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, &current_state).await
    }

    /// Update a resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, &prior_state, &planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, &current_state).await
    }

    /// Read a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, &config)
            .await
    }
}
