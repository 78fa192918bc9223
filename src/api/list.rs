//! Response shape normalization.
//!
//! The backend answers list endpoints either with a bare JSON array or with
//! an object wrapping the array (paged results use `records`, others `data`
//! or `value`). Everything is decoded here into one `Page<T>`, and the
//! `{code, message, data}` envelope is unwrapped in one place.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;

/// Keys that may wrap a list, in lookup order.
pub const LIST_KEYS: &[&str] = &["records", "data", "value", "list", "items"];

/// Backend code meaning success.
const CODE_OK: i64 = 200;
const CODE_UNAUTHORIZED: i64 = 401;

/// A decoded list with its total count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Unwrap the `{code, message, data}` envelope if present.
///
/// A non-success `code` becomes an error carrying `message`. Bodies without
/// a numeric `code` pass through untouched.
pub fn unwrap_envelope(value: Value) -> Result<Value, ApiError> {
    let Some(code) = value.get("code").and_then(Value::as_i64) else {
        return Ok(value);
    };

    // code 0 is treated like "unset"
    if code != CODE_OK && code != 0 {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Error")
            .to_string();
        if code == CODE_UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        return Err(ApiError::Backend { code, message });
    }

    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            Ok(map.remove("data").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

/// Decode a list response of any accepted shape.
pub fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Page<T>, ApiError> {
    let (items, total) = match value {
        Value::Null => (Vec::new(), None),
        Value::Array(items) => (items, None),
        Value::Object(mut map) => {
            let total = map.get("total").and_then(Value::as_u64);
            let wrapped = LIST_KEYS
                .iter()
                .find(|key| map.get(**key).is_some_and(Value::is_array))
                .and_then(|key| map.remove(*key));
            match wrapped {
                Some(Value::Array(items)) => (items, total),
                _ => {
                    log::warn!("list response without a recognized list field");
                    (Vec::new(), total)
                }
            }
        }
        other => {
            return Err(ApiError::Decode(format!(
                "expected a list, got {}",
                type_name(&other)
            )));
        }
    };

    let records: Vec<T> = items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<_, _>>()
        .map_err(|e| ApiError::Decode(e.to_string()))?;
    let total = total.unwrap_or(records.len() as u64);

    Ok(Page { records, total })
}

/// Decode a single resource.
pub fn decode_one<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::model::Tag;
    use serde_json::json;

    fn tags(value: Value) -> Page<Tag> {
        decode_list(value).unwrap()
    }

    #[test]
    fn test_bare_array() {
        let page = tags(json!([{"id": 1, "name": "rust"}, {"id": 2, "name": "web"}]));
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.total, 2);
        assert_eq!(page.records[1].name, "web");
    }

    #[test]
    fn test_wrapped_shapes() {
        for key in LIST_KEYS {
            let mut wrapper = serde_json::Map::new();
            wrapper.insert(key.to_string(), json!([{"id": 7, "name": "x"}]));
            let page = tags(Value::Object(wrapper));
            assert_eq!(page.records.len(), 1, "key {}", key);
            assert_eq!(page.records[0].id, 7);
        }
    }

    #[test]
    fn test_records_with_total() {
        let page = tags(json!({"records": [{"id": 1, "name": "a"}], "total": 40}));
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.total, 40);
    }

    #[test]
    fn test_records_preferred_over_data() {
        let page = tags(json!({
            "records": [{"id": 1, "name": "a"}],
            "data": [{"id": 2, "name": "b"}, {"id": 3, "name": "c"}]
        }));
        assert_eq!(page.records[0].id, 1);
    }

    #[test]
    fn test_null_and_unknown_objects_are_empty() {
        assert!(tags(Value::Null).is_empty());
        assert!(tags(json!({"something": 1})).is_empty());
    }

    #[test]
    fn test_scalar_is_a_decode_error() {
        let err = decode_list::<Tag>(json!("nope")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_envelope_success_unwraps_data() {
        let value = unwrap_envelope(json!({"code": 200, "message": "ok", "data": [1, 2]})).unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn test_envelope_error_carries_message() {
        let err = unwrap_envelope(json!({"code": 500, "message": "boom"})).unwrap_err();
        match err {
            ApiError::Backend { code, message } => {
                assert_eq!(code, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_envelope_unauthorized() {
        let err = unwrap_envelope(json!({"code": 401, "message": "expired"})).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_plain_bodies_pass_through() {
        let body = json!({"id": 1, "name": "no envelope"});
        assert_eq!(unwrap_envelope(body.clone()).unwrap(), body);
    }
}
