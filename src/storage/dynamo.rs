// src/storage/dynamo.rs

//! DynamoDB-backed disruption store.
//!
//! Disruptions live in a single table keyed by organisation, with one
//! `{id}#INFO` item per disruption and one `{id}#CONSEQUENCE#{index}` item
//! per consequence. Draft edits share the table under `#EDIT` and
//! `#PENDING` sort-key suffixes and are never published.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_json::{Map, Number, Value};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::{Disruption, Organisation};
use crate::storage::DisruptionStore;

const PUBLISHED: &str = "PUBLISHED";

pub struct DynamoStore {
    client: Client,
    disruptions_table: String,
    organisations_table: String,
}

impl DynamoStore {
    pub fn new(
        client: Client,
        disruptions_table: impl Into<String>,
        organisations_table: impl Into<String>,
    ) -> Self {
        Self {
            client,
            disruptions_table: disruptions_table.into(),
            organisations_table: organisations_table.into(),
        }
    }

    /// Scan the disruptions table for published items, following
    /// pagination until the table is exhausted.
    async fn scan_published_items(&self) -> Result<Vec<HashMap<String, AttributeValue>>> {
        info!(table = %self.disruptions_table, "scanning for published disruptions");

        let mut items = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.disruptions_table)
                .filter_expression("publishStatus = :status")
                .expression_attribute_values(":status", AttributeValue::S(PUBLISHED.to_string()))
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await
                .map_err(AppError::dynamo)?;

            items.extend(output.items.unwrap_or_default());

            exclusive_start_key = output.last_evaluated_key;
            if exclusive_start_key.is_none() {
                break;
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl DisruptionStore for DynamoStore {
    async fn fetch_published_disruptions(&self) -> Result<Vec<Disruption>> {
        let items: Vec<Value> = self
            .scan_published_items()
            .await?
            .into_iter()
            .map(item_to_json)
            .collect();

        let mut disruption_ids = Vec::new();
        for item in &items {
            if let Some(id) = item.get("disruptionId").and_then(Value::as_str) {
                if !disruption_ids.iter().any(|seen| seen == id) {
                    disruption_ids.push(id.to_string());
                }
            }
        }

        let mut disruptions = Vec::with_capacity(disruption_ids.len());
        for id in disruption_ids {
            match assemble_disruption(&items, &id) {
                Some(Ok(disruption)) => disruptions.push(disruption),
                Some(Err(error)) => {
                    warn!(disruption_id = %id, %error, "skipping malformed disruption");
                }
                None => {}
            }
        }

        info!(count = disruptions.len(), "fetched published disruptions");
        Ok(disruptions)
    }

    async fn get_organisation(&self, id: &str) -> Result<Option<Organisation>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.organisations_table)
            .key("PK", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(AppError::dynamo)?;

        let Some(item) = output.item else {
            return Ok(None);
        };

        let pk = item.get("PK").and_then(|v| v.as_s().ok());
        let name = item.get("name").and_then(|v| v.as_s().ok());
        match (pk, name) {
            (Some(pk), Some(name)) => Ok(Some(Organisation {
                id: pk.clone(),
                name: name.clone(),
            })),
            _ => Ok(None),
        }
    }
}

/// Reassemble one disruption from its `INFO` item and consequence items.
/// Returns `None` when the `INFO` item is missing.
fn assemble_disruption(
    items: &[Value],
    disruption_id: &str,
) -> Option<std::result::Result<Disruption, serde_json::Error>> {
    let info_sort_key = format!("{disruption_id}#INFO");
    let consequence_prefix = format!("{disruption_id}#CONSEQUENCE");

    let info = items
        .iter()
        .find(|item| sort_key(item) == Some(info_sort_key.as_str()))?;

    let consequences: Vec<Value> = items
        .iter()
        .filter(|item| {
            sort_key(item).is_some_and(|sk| {
                sk.starts_with(&consequence_prefix)
                    && !sk.contains("#EDIT")
                    && !sk.contains("#PENDING")
            })
        })
        .filter(|item| item.get("isDeleted").and_then(Value::as_bool) != Some(true))
        .cloned()
        .collect();

    let mut record = info.clone();
    if let Value::Object(map) = &mut record {
        // Items predating the orgId attribute carry it as the partition key.
        if !map.contains_key("orgId") {
            if let Some(pk) = map.get("PK").cloned() {
                map.insert("orgId".to_string(), pk);
            }
        }
        map.insert("consequences".to_string(), Value::Array(consequences));
    }

    Some(serde_json::from_value(record))
}

fn sort_key(item: &Value) -> Option<&str> {
    item.get("SK").and_then(Value::as_str)
}

/// Convert a DynamoDB item into plain JSON.
fn item_to_json(item: HashMap<String, AttributeValue>) -> Value {
    let mut map = Map::with_capacity(item.len());
    for (key, value) in item {
        map.insert(key, attribute_to_json(value));
    }
    Value::Object(map)
}

fn attribute_to_json(value: AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::N(n) => n
            .parse::<i64>()
            .ok()
            .map(|i| Value::Number(i.into()))
            .or_else(|| n.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number))
            .unwrap_or(Value::Null),
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(list) => Value::Array(list.into_iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => item_to_json(map),
        _ => Value::Null,
    }
}
