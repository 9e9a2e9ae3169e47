//! Lakeshore Provider
//!
//! This crate implements an infrastructure-as-code provider plugin for the
//! Lakeshore data platform. A plan/apply host loads the provider, hands it
//! desired-state configurations, and the provider drives Lakeshore's
//! administrative REST API until live state converges.
//!
//! # Overview
//!
//! The crate is built around one load-bearing piece, the API client, plus
//! the mechanical mapping that exposes it as declarative resources:
//!
//! - **[`Client`]**: an authenticated, retrying, paginating HTTP client for
//!   `<base>/public/api/v1`. Bearer tokens come from the OAuth2
//!   client-credentials grant and are cached until shortly before expiry;
//!   rejected tokens and rate limits are retried within a bounded budget;
//!   collection endpoints are drained through the `nextPageToken` cursor.
//! - **Resource facade** ([`api`]): one narrow method per remote endpoint,
//!   passing untyped JSON through. Alternate-key identifiers
//!   (`email=...`, `name=...`) are resolved locally by list-and-scan.
//! - **[`LakeshoreProvider`]**: the host-facing surface — configure with
//!   credentials, then create/read/update/delete resources and read data
//!   sources, with typed errors the host can act on
//!   ([`ProviderError::is_not_found`] drops a vanished resource from
//!   state).
//!
//! # Quick Start
//!
//! ```ignore
//! use lakeshore_provider::{init_logging, LakeshoreProvider};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let provider = LakeshoreProvider::new();
//!     provider.configure(&json!({
//!         "api_url": "https://acme.lakeshore.dev",
//!         "client_id": std::env::var("LAKESHORE_CLIENT_ID")?,
//!         "client_secret": std::env::var("LAKESHORE_CLIENT_SECRET")?,
//!     })).await?;
//!
//!     let cluster = provider.create("lakeshore_cluster", &json!({
//!         "name": "reporting",
//!         "minWorkers": 1,
//!         "maxWorkers": 4,
//!     })).await?;
//!     println!("created {}", cluster["clusterId"]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod provider;
mod resources;
pub mod testing;

// Re-export main types at crate root
pub use client::{Client, ClientBuilder};
pub use config::ProviderConfig;
pub use error::{Error, ProviderError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{
    Diagnostic, DiagnosticSeverity, LakeshoreProvider, ProviderMetadata, ProviderService,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
