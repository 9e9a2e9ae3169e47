//! Per-resource mapping between host state and facade operations.
//!
//! This is the mechanical layer: each resource type extracts its
//! identifiers from the JSON state and calls the matching facade method.
//! Identifier fields follow the API's own naming (`clusterId`, `roleId`,
//! ...), so state round-trips through the remote without renaming.
//!
//! Resources without a server-side GET (privilege grants, cross-account IAM
//! roles) are read by scanning their collection; resources without a
//! server-side update reject in-place updates so the host plans a
//! replacement instead.

use serde_json::{json, Value};

use crate::api::CATALOG_TYPES;
use crate::client::Client;
use crate::error::{Error, ProviderError};

/// Resource types served by this provider.
pub(crate) const RESOURCE_TYPES: &[&str] = &[
    "lakeshore_catalog",
    "lakeshore_cluster",
    "lakeshore_column_mask",
    "lakeshore_cross_account_iam_role",
    "lakeshore_data_product",
    "lakeshore_policy",
    "lakeshore_privatelink",
    "lakeshore_role",
    "lakeshore_role_grant",
    "lakeshore_role_privilege_grant",
    "lakeshore_row_filter",
    "lakeshore_service_account",
    "lakeshore_service_account_password",
    "lakeshore_sql_job",
    "lakeshore_tag",
    "lakeshore_user",
];

/// Data-source types served by this provider.
pub(crate) const DATA_SOURCE_TYPES: &[&str] = &[
    "lakeshore_catalog_metadata",
    "lakeshore_catalog_validation",
    "lakeshore_catalogs",
    "lakeshore_clusters",
    "lakeshore_columns",
    "lakeshore_data_quality_summary",
    "lakeshore_role",
    "lakeshore_roles",
    "lakeshore_schemas",
    "lakeshore_sql_job_history",
    "lakeshore_sql_job_status",
    "lakeshore_tables",
    "lakeshore_user",
    "lakeshore_users",
];

/// Extract a required string field from a state value.
fn require_str<'a>(state: &'a Value, field: &str) -> Result<&'a str, ProviderError> {
    state
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderError::Validation(format!("missing required field `{field}`")))
}

fn ensure_catalog_type(catalog_type: &str) -> Result<(), ProviderError> {
    if CATALOG_TYPES.contains(&catalog_type) {
        return Ok(());
    }
    Err(ProviderError::Validation(format!(
        "unsupported catalog type `{catalog_type}`; expected one of: {}",
        CATALOG_TYPES.join(", ")
    )))
}

fn unknown_resource(resource_type: &str) -> ProviderError {
    ProviderError::UnknownResource(resource_type.to_string())
}

fn no_update(resource_type: &str) -> ProviderError {
    ProviderError::Validation(format!(
        "`{resource_type}` does not support in-place updates; the resource must be replaced"
    ))
}

pub(crate) async fn create(
    client: &Client,
    resource_type: &str,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let created = match resource_type {
        "lakeshore_cluster" => client.create_cluster(planned).await?,
        "lakeshore_user" => client.create_user(planned).await?,
        "lakeshore_role" => client.create_role(planned).await?,
        "lakeshore_role_grant" => {
            let role_id = require_str(planned, "roleId")?;
            client.create_role_grant(role_id, planned).await?
        }
        "lakeshore_role_privilege_grant" => {
            let role_id = require_str(planned, "roleId")?;
            client.create_role_privilege_grant(role_id, planned).await?
        }
        "lakeshore_service_account" => client.create_service_account(planned).await?,
        "lakeshore_service_account_password" => {
            let service_account_id = require_str(planned, "serviceAccountId")?;
            client
                .create_service_account_password(service_account_id, planned)
                .await?
        }
        "lakeshore_catalog" => {
            let catalog_type = require_str(planned, "catalogType")?;
            ensure_catalog_type(catalog_type)?;
            client.create_catalog(catalog_type, planned).await?
        }
        "lakeshore_data_product" => client.create_data_product(planned).await?,
        "lakeshore_tag" => client.create_tag(planned).await?,
        "lakeshore_column_mask" => client.create_column_mask(planned).await?,
        "lakeshore_row_filter" => client.create_row_filter(planned).await?,
        "lakeshore_policy" => client.create_policy(planned).await?,
        "lakeshore_cross_account_iam_role" => {
            client.create_cross_account_iam_role(planned).await?
        }
        "lakeshore_sql_job" => client.create_sql_job(planned).await?,
        "lakeshore_privatelink" => client.create_privatelink(planned).await?,
        other => return Err(unknown_resource(other)),
    };
    Ok(created)
}

pub(crate) async fn read(
    client: &Client,
    resource_type: &str,
    state: &Value,
) -> Result<Value, ProviderError> {
    let live = match resource_type {
        "lakeshore_cluster" => client.get_cluster(require_str(state, "clusterId")?).await?,
        "lakeshore_user" => client.get_user(require_str(state, "userId")?).await?,
        "lakeshore_role" => client.get_role(require_str(state, "roleId")?).await?,
        "lakeshore_role_grant" => {
            let role_id = require_str(state, "roleId")?;
            let grant_id = require_str(state, "roleGrantId")?;
            client.get_role_grant(role_id, grant_id).await?
        }
        "lakeshore_role_privilege_grant" => read_privilege_grant(client, state).await?,
        "lakeshore_service_account" => {
            client
                .get_service_account(require_str(state, "serviceAccountId")?)
                .await?
        }
        "lakeshore_service_account_password" => {
            let service_account_id = require_str(state, "serviceAccountId")?;
            let password_id = require_str(state, "serviceAccountPasswordId")?;
            client
                .get_service_account_password(service_account_id, password_id)
                .await?
        }
        "lakeshore_catalog" => client.get_catalog(require_str(state, "catalogId")?).await?,
        "lakeshore_data_product" => {
            client
                .get_data_product(require_str(state, "dataProductId")?)
                .await?
        }
        "lakeshore_tag" => client.get_tag(require_str(state, "tagId")?).await?,
        "lakeshore_column_mask" => {
            client
                .get_column_mask(require_str(state, "columnMaskId")?)
                .await?
        }
        "lakeshore_row_filter" => {
            client
                .get_row_filter(require_str(state, "rowFilterId")?)
                .await?
        }
        "lakeshore_policy" => client.get_policy(require_str(state, "policyId")?).await?,
        "lakeshore_cross_account_iam_role" => read_cross_account_iam_role(client, state).await?,
        "lakeshore_sql_job" => client.get_sql_job(require_str(state, "sqlJobId")?).await?,
        "lakeshore_privatelink" => {
            client
                .get_privatelink(require_str(state, "privatelinkId")?)
                .await?
        }
        other => return Err(unknown_resource(other)),
    };
    Ok(live)
}

pub(crate) async fn update(
    client: &Client,
    resource_type: &str,
    prior: &Value,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let updated = match resource_type {
        "lakeshore_cluster" => {
            client
                .update_cluster(require_str(prior, "clusterId")?, planned)
                .await?
        }
        "lakeshore_user" => {
            client
                .update_user(require_str(prior, "userId")?, planned)
                .await?
        }
        "lakeshore_role" => {
            client
                .update_role(require_str(prior, "roleId")?, planned)
                .await?
        }
        "lakeshore_service_account" => {
            client
                .update_service_account(require_str(prior, "serviceAccountId")?, planned)
                .await?
        }
        "lakeshore_catalog" => {
            client
                .update_catalog(require_str(prior, "catalogId")?, planned)
                .await?
        }
        "lakeshore_data_product" => {
            client
                .update_data_product(require_str(prior, "dataProductId")?, planned)
                .await?
        }
        "lakeshore_tag" => {
            client
                .update_tag(require_str(prior, "tagId")?, planned)
                .await?
        }
        "lakeshore_column_mask" => {
            client
                .update_column_mask(require_str(prior, "columnMaskId")?, planned)
                .await?
        }
        "lakeshore_row_filter" => {
            client
                .update_row_filter(require_str(prior, "rowFilterId")?, planned)
                .await?
        }
        "lakeshore_policy" => {
            client
                .update_policy(require_str(prior, "policyId")?, planned)
                .await?
        }
        "lakeshore_role_grant"
        | "lakeshore_role_privilege_grant"
        | "lakeshore_service_account_password"
        | "lakeshore_cross_account_iam_role"
        | "lakeshore_sql_job"
        | "lakeshore_privatelink" => return Err(no_update(resource_type)),
        other => return Err(unknown_resource(other)),
    };
    Ok(updated)
}

pub(crate) async fn delete(
    client: &Client,
    resource_type: &str,
    state: &Value,
) -> Result<(), ProviderError> {
    match resource_type {
        "lakeshore_cluster" => client.delete_cluster(require_str(state, "clusterId")?).await?,
        "lakeshore_user" => client.delete_user(require_str(state, "userId")?).await?,
        "lakeshore_role" => client.delete_role(require_str(state, "roleId")?).await?,
        "lakeshore_role_grant" => {
            let role_id = require_str(state, "roleId")?;
            let grant_id = require_str(state, "roleGrantId")?;
            client.delete_role_grant(role_id, grant_id).await?
        }
        "lakeshore_role_privilege_grant" => {
            let role_id = require_str(state, "roleId")?;
            client.delete_role_privilege_grant(role_id, state).await?
        }
        "lakeshore_service_account" => {
            client
                .delete_service_account(require_str(state, "serviceAccountId")?)
                .await?
        }
        "lakeshore_service_account_password" => {
            let service_account_id = require_str(state, "serviceAccountId")?;
            let password_id = require_str(state, "serviceAccountPasswordId")?;
            client
                .delete_service_account_password(service_account_id, password_id)
                .await?
        }
        "lakeshore_catalog" => client.delete_catalog(require_str(state, "catalogId")?).await?,
        "lakeshore_data_product" => {
            client
                .delete_data_product(require_str(state, "dataProductId")?)
                .await?
        }
        "lakeshore_tag" => client.delete_tag(require_str(state, "tagId")?).await?,
        "lakeshore_column_mask" => {
            client
                .delete_column_mask(require_str(state, "columnMaskId")?)
                .await?
        }
        "lakeshore_row_filter" => {
            client
                .delete_row_filter(require_str(state, "rowFilterId")?)
                .await?
        }
        "lakeshore_policy" => client.delete_policy(require_str(state, "policyId")?).await?,
        "lakeshore_cross_account_iam_role" => {
            client
                .delete_cross_account_iam_role(require_str(state, "roleArn")?)
                .await?
        }
        "lakeshore_sql_job" => client.delete_sql_job(require_str(state, "sqlJobId")?).await?,
        "lakeshore_privatelink" => {
            client
                .delete_privatelink(require_str(state, "privatelinkId")?)
                .await?
        }
        other => return Err(unknown_resource(other)),
    }
    Ok(())
}

pub(crate) async fn read_data_source(
    client: &Client,
    data_source_type: &str,
    config: &Value,
) -> Result<Value, ProviderError> {
    let value = match data_source_type {
        "lakeshore_user" => client.get_user(require_str(config, "userId")?).await?,
        "lakeshore_role" => client.get_role(require_str(config, "roleId")?).await?,
        "lakeshore_catalog_metadata" => {
            client
                .get_catalog_metadata(require_str(config, "catalogId")?)
                .await?
        }
        "lakeshore_catalog_validation" => {
            let catalog_type = require_str(config, "catalogType")?;
            ensure_catalog_type(catalog_type)?;
            client.validate_catalog(catalog_type, config).await?
        }
        "lakeshore_data_quality_summary" => {
            client
                .get_data_quality_summary(
                    require_str(config, "catalogId")?,
                    require_str(config, "schemaName")?,
                    require_str(config, "tableName")?,
                )
                .await?
        }
        "lakeshore_sql_job_status" => {
            client
                .get_sql_job_status(require_str(config, "sqlJobId")?)
                .await?
        }
        "lakeshore_sql_job_history" => {
            let history = client
                .list_sql_job_history(require_str(config, "sqlJobId")?)
                .await?;
            json!({ "history": history })
        }
        "lakeshore_clusters" => json!({ "clusters": client.list_clusters().await? }),
        "lakeshore_users" => json!({ "users": client.list_users().await? }),
        "lakeshore_roles" => json!({ "roles": client.list_roles().await? }),
        "lakeshore_catalogs" => json!({ "catalogs": client.list_catalogs().await? }),
        "lakeshore_schemas" => {
            let schemas = client.list_schemas(require_str(config, "catalogId")?).await?;
            json!({ "schemas": schemas })
        }
        "lakeshore_tables" => {
            let tables = client
                .list_tables(
                    require_str(config, "catalogId")?,
                    require_str(config, "schemaName")?,
                )
                .await?;
            json!({ "tables": tables })
        }
        "lakeshore_columns" => {
            let columns = client
                .list_columns(
                    require_str(config, "catalogId")?,
                    require_str(config, "schemaName")?,
                    require_str(config, "tableName")?,
                )
                .await?;
            json!({ "columns": columns })
        }
        other => return Err(unknown_resource(other)),
    };
    Ok(value)
}

/// Privilege grants have no item endpoint; match the granted privilege and
/// entity against the role's privilege list.
async fn read_privilege_grant(client: &Client, state: &Value) -> Result<Value, ProviderError> {
    let role_id = require_str(state, "roleId")?;
    let privilege = require_str(state, "privilege")?;
    let entity_id = state.get("entityId").and_then(Value::as_str);

    let grants = client.list_role_privilege_grants(role_id).await?;
    grants
        .into_iter()
        .find(|grant| {
            grant.get("privilege").and_then(Value::as_str) == Some(privilege)
                && grant.get("entityId").and_then(Value::as_str) == entity_id
        })
        .ok_or_else(|| Error::not_found(format!("role/{role_id}/privilege/{privilege}")).into())
}

/// Cross-account IAM roles have no item endpoint; match the ARN against the
/// registered list.
async fn read_cross_account_iam_role(
    client: &Client,
    state: &Value,
) -> Result<Value, ProviderError> {
    let arn = require_str(state, "roleArn")?;
    let roles = client.list_cross_account_iam_roles().await?;
    roles
        .into_iter()
        .find(|role| role.get("roleArn").and_then(Value::as_str) == Some(arn))
        .ok_or_else(|| Error::not_found(format!("crossAccountIamRole/{arn}")).into())
}
