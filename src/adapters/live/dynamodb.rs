//! Profile records in a DynamoDB table keyed by `team_tag` and
//! `model_type_version`.

use std::collections::HashMap;

use aws_config::SdkConfig;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::debug;

use super::sdk_failure;
use crate::error::GatewayError;
use crate::ports::{PortFuture, ProfileKey, ProfileRecord, ProfileStore, PutOutcome};

const SERVICE: &str = "dynamodb";

/// Rejects a put when a record with the same composite key exists.
const PUT_CONDITION: &str =
    "attribute_not_exists(team_tag) AND attribute_not_exists(model_type_version)";

/// Stores profile records in a single table.
#[derive(Debug, Clone)]
pub struct DynamoProfileStore {
    client: aws_sdk_dynamodb::Client,
    table: String,
}

impl DynamoProfileStore {
    /// Create a client for `table` from shared SDK configuration.
    pub fn new(sdk: &SdkConfig, table: impl Into<String>) -> Self {
        Self { client: aws_sdk_dynamodb::Client::new(sdk), table: table.into() }
    }
}

impl ProfileStore for DynamoProfileStore {
    fn put_if_absent(&self, record: &ProfileRecord) -> PortFuture<'_, PutOutcome> {
        let record = record.clone();
        Box::pin(async move {
            let key = record.key();
            let result = self
                .client
                .put_item()
                .table_name(&self.table)
                .item("team_tag", AttributeValue::S(key.team_tag))
                .item("model_type_version", AttributeValue::S(key.model_type_version))
                .item("model_type", AttributeValue::S(record.model_type))
                .item("version", AttributeValue::S(record.version))
                .item("profile_id", AttributeValue::S(record.profile_id))
                .item("model_arn", AttributeValue::S(record.model_arn))
                .condition_expression(PUT_CONDITION)
                .send()
                .await;

            match result {
                Ok(_) => Ok(PutOutcome::Inserted),
                Err(err)
                    if err
                        .as_service_error()
                        .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
                {
                    debug!(table = %self.table, "conditional put rejected existing record");
                    Ok(PutOutcome::AlreadyExists)
                }
                Err(err) => Err(sdk_failure(SERVICE, "PutItem", err)),
            }
        })
    }

    fn get(&self, key: &ProfileKey) -> PortFuture<'_, Option<ProfileRecord>> {
        let key = key.clone();
        Box::pin(async move {
            let output = self
                .client
                .get_item()
                .table_name(&self.table)
                .key("team_tag", AttributeValue::S(key.team_tag))
                .key("model_type_version", AttributeValue::S(key.model_type_version))
                .consistent_read(true)
                .send()
                .await
                .map_err(|e| sdk_failure(SERVICE, "GetItem", e))?;

            output.item().map(record_from_item).transpose()
        })
    }

    fn delete(&self, key: &ProfileKey) -> PortFuture<'_, ()> {
        let key = key.clone();
        Box::pin(async move {
            self.client
                .delete_item()
                .table_name(&self.table)
                .key("team_tag", AttributeValue::S(key.team_tag))
                .key("model_type_version", AttributeValue::S(key.model_type_version))
                .send()
                .await
                .map_err(|e| sdk_failure(SERVICE, "DeleteItem", e))?;
            Ok(())
        })
    }
}

fn record_from_item(item: &HashMap<String, AttributeValue>) -> Result<ProfileRecord, GatewayError> {
    Ok(ProfileRecord {
        team_tag: required(item, "team_tag")?,
        model_type: required(item, "model_type")?,
        version: required(item, "version")?,
        profile_id: required(item, "profile_id")?,
        model_arn: optional(item, "model_arn").unwrap_or_default(),
    })
}

fn required(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String, GatewayError> {
    optional(item, name).ok_or_else(|| {
        GatewayError::MalformedReply(format!("profile record is missing string attribute {name}"))
    })
}

fn optional(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}
