//! The resource facade: one narrow operation per Lakeshore endpoint.
//!
//! Every method composes a path under `/public/api/v1`, delegates to the
//! retrying client in [`crate::client`], and passes decoded JSON values
//! through untouched. Resource-specific shaping happens in the layer above
//! ([`crate::resources`]); this layer adds no wrapping and no caching.
//!
//! Two behaviors here are contracts, not conveniences:
//!
//! - **Alternate-key identifiers.** Some get operations accept a virtual
//!   identifier of the form `<field>=<value>` (for example
//!   `email=alice@example.com`). Those are never sent on the wire: the
//!   facade lists the collection and scans for the first exact,
//!   case-sensitive match on the named field.
//! - **Indirect password lookup.** The server-side GET for service-account
//!   passwords is broken, so [`Client::get_service_account_password`]
//!   fetches the parent service account and searches its embedded
//!   `passwords` collection instead.

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::Client;
use crate::error::Error;

const API_PREFIX: &str = "/public/api/v1";

/// Catalog connector types accepted by the catalog endpoints.
pub const CATALOG_TYPES: &[&str] = &[
    "bigquery",
    "cassandra",
    "gcs",
    "mongodb",
    "mysql",
    "opensearch",
    "postgresql",
    "redshift",
    "s3",
    "snowflake",
    "sqlserver",
];

/// Split an alternate-key identifier into `(field, value)`.
///
/// Identifiers without `=` are ordinary ids and return `None`.
fn alternate_key(id: &str) -> Option<(&str, &str)> {
    id.split_once('=')
}

impl Client {
    /// List a collection and return the first item whose `field` equals
    /// `value` exactly. Misses are not-found errors.
    async fn find_in_collection(
        &self,
        collection_path: &str,
        field: &str,
        value: &str,
    ) -> Result<Value, Error> {
        debug!(collection_path, field, "resolving alternate-key identifier locally");
        let items = self.get_paginated(collection_path).await?;
        items
            .into_iter()
            .find(|item| item.get(field).and_then(Value::as_str) == Some(value))
            .ok_or_else(|| Error::not_found(format!("{collection_path}/{field}={value}")))
    }

    // =========================================================================
    // Clusters
    // =========================================================================

    /// Create a cluster.
    pub async fn create_cluster(&self, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/cluster"), body).await
    }

    /// Get a cluster by id.
    pub async fn get_cluster(&self, cluster_id: &str) -> Result<Value, Error> {
        self.get(&format!("{API_PREFIX}/cluster/{cluster_id}")).await
    }

    /// Update a cluster.
    pub async fn update_cluster(&self, cluster_id: &str, body: &Value) -> Result<Value, Error> {
        self.patch(&format!("{API_PREFIX}/cluster/{cluster_id}"), body)
            .await
    }

    /// Delete a cluster.
    pub async fn delete_cluster(&self, cluster_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/cluster/{cluster_id}")).await
    }

    /// List all clusters.
    pub async fn list_clusters(&self) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/cluster")).await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Create a user.
    pub async fn create_user(&self, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/user"), body).await
    }

    /// Get a user by id, or by the `email=<value>` alternate key.
    pub async fn get_user(&self, user_id: &str) -> Result<Value, Error> {
        if let Some((field, value)) = alternate_key(user_id) {
            return self
                .find_in_collection(&format!("{API_PREFIX}/user"), field, value)
                .await;
        }
        self.get(&format!("{API_PREFIX}/user/{user_id}")).await
    }

    /// Update a user.
    pub async fn update_user(&self, user_id: &str, body: &Value) -> Result<Value, Error> {
        self.patch(&format!("{API_PREFIX}/user/{user_id}"), body).await
    }

    /// Delete a user.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/user/{user_id}")).await
    }

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/user")).await
    }

    // =========================================================================
    // Roles
    // =========================================================================

    /// Create a role.
    pub async fn create_role(&self, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/role"), body).await
    }

    /// Get a role by id, or by the `name=<value>` alternate key.
    pub async fn get_role(&self, role_id: &str) -> Result<Value, Error> {
        if let Some((field, value)) = alternate_key(role_id) {
            return self
                .find_in_collection(&format!("{API_PREFIX}/role"), field, value)
                .await;
        }
        self.get(&format!("{API_PREFIX}/role/{role_id}")).await
    }

    /// Update a role.
    pub async fn update_role(&self, role_id: &str, body: &Value) -> Result<Value, Error> {
        self.patch(&format!("{API_PREFIX}/role/{role_id}"), body).await
    }

    /// Delete a role.
    pub async fn delete_role(&self, role_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/role/{role_id}")).await
    }

    /// List all roles.
    pub async fn list_roles(&self) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/role")).await
    }

    // =========================================================================
    // Role grants
    // =========================================================================

    /// Grant a role to a subject.
    pub async fn create_role_grant(&self, role_id: &str, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/role/{role_id}/roleGrant"), body)
            .await
    }

    /// Get a single role grant.
    pub async fn get_role_grant(&self, role_id: &str, grant_id: &str) -> Result<Value, Error> {
        self.get(&format!("{API_PREFIX}/role/{role_id}/roleGrant/{grant_id}"))
            .await
    }

    /// Revoke a role grant.
    pub async fn delete_role_grant(&self, role_id: &str, grant_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/role/{role_id}/roleGrant/{grant_id}"))
            .await
    }

    /// List all grants of a role.
    pub async fn list_role_grants(&self, role_id: &str) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/role/{role_id}/roleGrant"))
            .await
    }

    // =========================================================================
    // Role privilege grants
    // =========================================================================

    /// Grant a privilege to a role.
    pub async fn create_role_privilege_grant(
        &self,
        role_id: &str,
        body: &Value,
    ) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/role/{role_id}/privilege"), body)
            .await
    }

    /// Revoke a privilege from a role. The privilege is identified by the
    /// request body, not by a path segment.
    pub async fn delete_role_privilege_grant(
        &self,
        role_id: &str,
        body: &Value,
    ) -> Result<(), Error> {
        self.delete_with_body(&format!("{API_PREFIX}/role/{role_id}/privilege"), body)
            .await
    }

    /// List all privileges granted to a role.
    pub async fn list_role_privilege_grants(&self, role_id: &str) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/role/{role_id}/privilege"))
            .await
    }

    // =========================================================================
    // Service accounts
    // =========================================================================

    /// Create a service account.
    pub async fn create_service_account(&self, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/serviceAccount"), body).await
    }

    /// Get a service account by id, or by the `name=<value>` alternate key.
    pub async fn get_service_account(&self, service_account_id: &str) -> Result<Value, Error> {
        if let Some((field, value)) = alternate_key(service_account_id) {
            return self
                .find_in_collection(&format!("{API_PREFIX}/serviceAccount"), field, value)
                .await;
        }
        self.get(&format!("{API_PREFIX}/serviceAccount/{service_account_id}"))
            .await
    }

    /// Update a service account.
    pub async fn update_service_account(
        &self,
        service_account_id: &str,
        body: &Value,
    ) -> Result<Value, Error> {
        self.patch(
            &format!("{API_PREFIX}/serviceAccount/{service_account_id}"),
            body,
        )
        .await
    }

    /// Delete a service account.
    pub async fn delete_service_account(&self, service_account_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/serviceAccount/{service_account_id}"))
            .await
    }

    /// List all service accounts.
    pub async fn list_service_accounts(&self) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/serviceAccount")).await
    }

    // =========================================================================
    // Service-account passwords
    // =========================================================================

    /// Create a password for a service account.
    pub async fn create_service_account_password(
        &self,
        service_account_id: &str,
        body: &Value,
    ) -> Result<Value, Error> {
        self.post(
            &format!("{API_PREFIX}/serviceAccount/{service_account_id}/password"),
            body,
        )
        .await
    }

    /// Get a service-account password by searching the parent account.
    ///
    /// The server-side GET for this endpoint is broken, so the lookup goes
    /// through the parent service account's embedded `passwords` collection.
    /// Items are matched on `serviceAccountPasswordId`, falling back to
    /// `id` when the primary field is absent.
    pub async fn get_service_account_password(
        &self,
        service_account_id: &str,
        password_id: &str,
    ) -> Result<Value, Error> {
        warn!(
            service_account_id,
            "service-account password GET is resolved client-side via the parent account; \
             remove this workaround once the server endpoint is fixed"
        );
        let account = self.get_service_account(service_account_id).await?;
        let found = account
            .get("passwords")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .find(|password| {
                password
                    .get("serviceAccountPasswordId")
                    .or_else(|| password.get("id"))
                    .and_then(Value::as_str)
                    == Some(password_id)
            })
            .cloned();
        found.ok_or_else(|| {
            Error::not_found(format!(
                "serviceAccount/{service_account_id}/password/{password_id}"
            ))
        })
    }

    /// Delete a service-account password.
    pub async fn delete_service_account_password(
        &self,
        service_account_id: &str,
        password_id: &str,
    ) -> Result<(), Error> {
        self.delete(&format!(
            "{API_PREFIX}/serviceAccount/{service_account_id}/password/{password_id}"
        ))
        .await
    }

    // =========================================================================
    // Catalogs
    // =========================================================================

    /// Create a catalog of the given connector type.
    pub async fn create_catalog(&self, catalog_type: &str, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/catalog/{catalog_type}"), body)
            .await
    }

    /// Get a catalog by id.
    pub async fn get_catalog(&self, catalog_id: &str) -> Result<Value, Error> {
        self.get(&format!("{API_PREFIX}/catalog/{catalog_id}")).await
    }

    /// Update a catalog.
    pub async fn update_catalog(&self, catalog_id: &str, body: &Value) -> Result<Value, Error> {
        self.patch(&format!("{API_PREFIX}/catalog/{catalog_id}"), body)
            .await
    }

    /// Delete a catalog.
    pub async fn delete_catalog(&self, catalog_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/catalog/{catalog_id}")).await
    }

    /// List all catalogs.
    pub async fn list_catalogs(&self) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/catalog")).await
    }

    /// Get connector metadata for a catalog.
    pub async fn get_catalog_metadata(&self, catalog_id: &str) -> Result<Value, Error> {
        self.get(&format!("{API_PREFIX}/catalog/{catalog_id}/metadata"))
            .await
    }

    /// Validate a catalog configuration without creating it.
    pub async fn validate_catalog(&self, catalog_type: &str, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/catalog/{catalog_type}/validate"), body)
            .await
    }

    // =========================================================================
    // Data products
    // =========================================================================

    /// Create a data product.
    pub async fn create_data_product(&self, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/dataProduct"), body).await
    }

    /// Get a data product by id, or by the `name=<value>` alternate key.
    pub async fn get_data_product(&self, data_product_id: &str) -> Result<Value, Error> {
        if let Some((field, value)) = alternate_key(data_product_id) {
            return self
                .find_in_collection(&format!("{API_PREFIX}/dataProduct"), field, value)
                .await;
        }
        self.get(&format!("{API_PREFIX}/dataProduct/{data_product_id}"))
            .await
    }

    /// Update a data product.
    pub async fn update_data_product(
        &self,
        data_product_id: &str,
        body: &Value,
    ) -> Result<Value, Error> {
        self.patch(&format!("{API_PREFIX}/dataProduct/{data_product_id}"), body)
            .await
    }

    /// Delete a data product.
    pub async fn delete_data_product(&self, data_product_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/dataProduct/{data_product_id}"))
            .await
    }

    /// List all data products.
    pub async fn list_data_products(&self) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/dataProduct")).await
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Create a tag.
    pub async fn create_tag(&self, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/tag"), body).await
    }

    /// Get a tag by id, or by the `name=<value>` alternate key.
    pub async fn get_tag(&self, tag_id: &str) -> Result<Value, Error> {
        if let Some((field, value)) = alternate_key(tag_id) {
            return self
                .find_in_collection(&format!("{API_PREFIX}/tag"), field, value)
                .await;
        }
        self.get(&format!("{API_PREFIX}/tag/{tag_id}")).await
    }

    /// Update a tag.
    pub async fn update_tag(&self, tag_id: &str, body: &Value) -> Result<Value, Error> {
        self.patch(&format!("{API_PREFIX}/tag/{tag_id}"), body).await
    }

    /// Delete a tag.
    pub async fn delete_tag(&self, tag_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/tag/{tag_id}")).await
    }

    /// List all tags.
    pub async fn list_tags(&self) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/tag")).await
    }

    // =========================================================================
    // Column masks
    // =========================================================================

    /// Create a column mask.
    pub async fn create_column_mask(&self, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/columnMask"), body).await
    }

    /// Get a column mask by id.
    pub async fn get_column_mask(&self, column_mask_id: &str) -> Result<Value, Error> {
        self.get(&format!("{API_PREFIX}/columnMask/{column_mask_id}"))
            .await
    }

    /// Update a column mask.
    pub async fn update_column_mask(
        &self,
        column_mask_id: &str,
        body: &Value,
    ) -> Result<Value, Error> {
        self.patch(&format!("{API_PREFIX}/columnMask/{column_mask_id}"), body)
            .await
    }

    /// Delete a column mask.
    pub async fn delete_column_mask(&self, column_mask_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/columnMask/{column_mask_id}"))
            .await
    }

    /// List all column masks.
    pub async fn list_column_masks(&self) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/columnMask")).await
    }

    // =========================================================================
    // Row filters
    // =========================================================================

    /// Create a row filter.
    pub async fn create_row_filter(&self, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/rowFilter"), body).await
    }

    /// Get a row filter by id.
    pub async fn get_row_filter(&self, row_filter_id: &str) -> Result<Value, Error> {
        self.get(&format!("{API_PREFIX}/rowFilter/{row_filter_id}"))
            .await
    }

    /// Update a row filter.
    pub async fn update_row_filter(
        &self,
        row_filter_id: &str,
        body: &Value,
    ) -> Result<Value, Error> {
        self.patch(&format!("{API_PREFIX}/rowFilter/{row_filter_id}"), body)
            .await
    }

    /// Delete a row filter.
    pub async fn delete_row_filter(&self, row_filter_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/rowFilter/{row_filter_id}"))
            .await
    }

    /// List all row filters.
    pub async fn list_row_filters(&self) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/rowFilter")).await
    }

    // =========================================================================
    // Policies
    // =========================================================================

    /// Create a policy.
    pub async fn create_policy(&self, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/policy"), body).await
    }

    /// Get a policy by id.
    pub async fn get_policy(&self, policy_id: &str) -> Result<Value, Error> {
        self.get(&format!("{API_PREFIX}/policy/{policy_id}")).await
    }

    /// Update a policy.
    pub async fn update_policy(&self, policy_id: &str, body: &Value) -> Result<Value, Error> {
        self.patch(&format!("{API_PREFIX}/policy/{policy_id}"), body)
            .await
    }

    /// Delete a policy.
    pub async fn delete_policy(&self, policy_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/policy/{policy_id}")).await
    }

    /// List all policies.
    pub async fn list_policies(&self) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/policy")).await
    }

    // =========================================================================
    // Cross-account IAM roles
    // =========================================================================

    /// Register a cross-account IAM role.
    pub async fn create_cross_account_iam_role(&self, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/crossAccountIamRole"), body)
            .await
    }

    /// List all cross-account IAM roles.
    pub async fn list_cross_account_iam_roles(&self) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/crossAccountIamRole"))
            .await
    }

    /// Deregister a cross-account IAM role by ARN.
    ///
    /// The ARN becomes the last path segment and must be query-escaped, as
    /// it contains `:` and `/`.
    pub async fn delete_cross_account_iam_role(&self, arn: &str) -> Result<(), Error> {
        self.delete(&format!(
            "{API_PREFIX}/crossAccountIamRole/{}",
            urlencoding::encode(arn)
        ))
        .await
    }

    // =========================================================================
    // SQL jobs
    // =========================================================================

    /// Submit a SQL job.
    pub async fn create_sql_job(&self, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/sqlJob"), body).await
    }

    /// Get a SQL job by id.
    pub async fn get_sql_job(&self, sql_job_id: &str) -> Result<Value, Error> {
        self.get(&format!("{API_PREFIX}/sqlJob/{sql_job_id}")).await
    }

    /// Cancel and remove a SQL job.
    pub async fn delete_sql_job(&self, sql_job_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/sqlJob/{sql_job_id}")).await
    }

    /// Get the current status of a SQL job.
    pub async fn get_sql_job_status(&self, sql_job_id: &str) -> Result<Value, Error> {
        self.get(&format!("{API_PREFIX}/sqlJob/{sql_job_id}/status"))
            .await
    }

    /// List the execution history of a SQL job.
    pub async fn list_sql_job_history(&self, sql_job_id: &str) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/sqlJob/{sql_job_id}/history"))
            .await
    }

    // =========================================================================
    // Privatelinks
    // =========================================================================

    /// Create a privatelink endpoint.
    pub async fn create_privatelink(&self, body: &Value) -> Result<Value, Error> {
        self.post(&format!("{API_PREFIX}/privatelink"), body).await
    }

    /// Get a privatelink endpoint by id.
    pub async fn get_privatelink(&self, privatelink_id: &str) -> Result<Value, Error> {
        self.get(&format!("{API_PREFIX}/privatelink/{privatelink_id}"))
            .await
    }

    /// Delete a privatelink endpoint.
    pub async fn delete_privatelink(&self, privatelink_id: &str) -> Result<(), Error> {
        self.delete(&format!("{API_PREFIX}/privatelink/{privatelink_id}"))
            .await
    }

    /// List all privatelink endpoints.
    pub async fn list_privatelinks(&self) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/privatelink")).await
    }

    // =========================================================================
    // Catalog introspection (read-only)
    // =========================================================================

    /// Get the data-quality summary for a table.
    pub async fn get_data_quality_summary(
        &self,
        catalog_id: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<Value, Error> {
        self.get(&format!(
            "{API_PREFIX}/catalog/{catalog_id}/schema/{schema_name}/table/{table_name}/dataQualitySummary"
        ))
        .await
    }

    /// List the schemas of a catalog.
    pub async fn list_schemas(&self, catalog_id: &str) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!("{API_PREFIX}/catalog/{catalog_id}/schema"))
            .await
    }

    /// List the tables of a schema.
    pub async fn list_tables(
        &self,
        catalog_id: &str,
        schema_name: &str,
    ) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!(
            "{API_PREFIX}/catalog/{catalog_id}/schema/{schema_name}/table"
        ))
        .await
    }

    /// List the columns of a table.
    pub async fn list_columns(
        &self,
        catalog_id: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<Vec<Value>, Error> {
        self.get_paginated(&format!(
            "{API_PREFIX}/catalog/{catalog_id}/schema/{schema_name}/table/{table_name}/column"
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternate_key_detection() {
        assert_eq!(
            alternate_key("email=alice@example.com"),
            Some(("email", "alice@example.com"))
        );
        assert_eq!(alternate_key("name=reader"), Some(("name", "reader")));
        assert_eq!(alternate_key("u-123456"), None);
    }

    #[test]
    fn test_alternate_key_splits_on_first_equals() {
        // Values may themselves contain `=`.
        assert_eq!(alternate_key("name=a=b"), Some(("name", "a=b")));
    }

    #[test]
    fn test_catalog_types_include_known_connectors() {
        for connector in ["bigquery", "s3", "snowflake", "sqlserver"] {
            assert!(CATALOG_TYPES.contains(&connector));
        }
        assert!(!CATALOG_TYPES.contains(&"oracle"));
    }
}
