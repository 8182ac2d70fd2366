//! DynamoDB JSON 1.0 request bodies and response decoding.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokengate_core::{StoreError, StoreResult, TokenRecord};

pub(crate) const TARGET_GET_ITEM: &str = "DynamoDB_20120810.GetItem";
pub(crate) const TARGET_PUT_ITEM: &str = "DynamoDB_20120810.PutItem";
pub(crate) const TARGET_DELETE_ITEM: &str = "DynamoDB_20120810.DeleteItem";

pub(crate) const ACTIVE_ATTRIBUTE: &str = "active";

fn key(key_attribute: &str, token: &str) -> Value {
    let mut key = Map::new();
    key.insert(key_attribute.to_string(), json!({ "S": token }));
    Value::Object(key)
}

pub(crate) fn get_item(table: &str, key_attribute: &str, token: &str, consistent: bool) -> Value {
    json!({
        "TableName": table,
        "Key": key(key_attribute, token),
        "ConsistentRead": consistent,
    })
}

pub(crate) fn delete_item(table: &str, key_attribute: &str, token: &str) -> Value {
    json!({
        "TableName": table,
        "Key": key(key_attribute, token),
    })
}

pub(crate) fn put_item(
    table: &str,
    key_attribute: &str,
    token: &str,
    record: &TokenRecord,
) -> Value {
    let mut item = Map::new();
    for (name, value) in &record.attributes {
        if name != key_attribute && name != ACTIVE_ATTRIBUTE {
            item.insert(name.clone(), json!({ "S": value }));
        }
    }
    if let Some(active) = record.active {
        item.insert(ACTIVE_ATTRIBUTE.to_string(), json!({ "BOOL": active }));
    }
    item.insert(key_attribute.to_string(), json!({ "S": token }));

    json!({
        "TableName": table,
        "Item": Value::Object(item),
    })
}

#[derive(Debug, Deserialize)]
struct GetItemOutput {
    #[serde(rename = "Item", default)]
    item: Option<Map<String, Value>>,
}

/// Decode a GetItem response body.
///
/// An `active` attribute that is not a `BOOL` is treated as absent. Only
/// string attributes are carried into [`TokenRecord::attributes`].
pub(crate) fn decode_get_item(
    body: &[u8],
    key_attribute: &str,
) -> StoreResult<Option<TokenRecord>> {
    let output: GetItemOutput =
        serde_json::from_slice(body).map_err(|e| StoreError::InvalidResponse {
            message: format!("failed to parse GetItem response: {}", e),
        })?;

    let Some(item) = output.item else {
        return Ok(None);
    };

    let active = item
        .get(ACTIVE_ATTRIBUTE)
        .and_then(|v| v.get("BOOL"))
        .and_then(Value::as_bool);

    let attributes: BTreeMap<String, String> = item
        .iter()
        .filter(|(name, _)| name.as_str() != key_attribute && name.as_str() != ACTIVE_ATTRIBUTE)
        .filter_map(|(name, value)| {
            value
                .get("S")
                .and_then(Value::as_str)
                .map(|s| (name.clone(), s.to_string()))
        })
        .collect();

    Ok(Some(TokenRecord { active, attributes }))
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type", default)]
    error_type: Option<String>,
    #[serde(default, alias = "Message")]
    message: Option<String>,
}

/// Map an error response to a [`StoreError::Service`].
pub(crate) fn decode_error(status: u16, body: &[u8]) -> StoreError {
    let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();
    let (code, message) = match parsed {
        Some(b) => (
            b.error_type
                .as_deref()
                .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            b.message.unwrap_or_default(),
        ),
        None => ("Unknown".to_string(), String::new()),
    };

    StoreError::Service {
        status,
        code,
        message,
    }
}
