//! Query-string encoding for list and show options.
//!
//! Options structs derive `Serialize`; their serde field names are the wire
//! parameter names. [`encode`] flattens them into a form-urlencoded query in
//! sorted key order, dropping unset values and validating `include` and
//! `sort` against the resource table.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{RedmineError, Result};
use crate::resource::ResourceSpec;

/// Encode `options` into a query string for the resource described by `spec`.
///
/// Rules:
/// - `null`, empty strings, numeric zero and `false` are treated as not set;
/// - `true` is sent as `1`;
/// - arrays are comma-joined;
/// - nested objects are rejected;
/// - `include` and `sort` are validated against `spec`.
///
/// Encoding the same value twice yields the same string.
///
/// # Errors
///
/// Returns [`RedmineError::InvalidInput`] when an include token or sort
/// field is not recognized, or when the options do not serialize to a flat
/// JSON object.
///
/// # Example
///
/// ```
/// use redmine_api::{query, resource, IssueListQuery, PaginationParams};
///
/// let options = IssueListQuery {
///     project_id: Some(5),
///     include: Some("journals,attachments".to_string()),
///     pagination: PaginationParams::limit(25),
///     ..Default::default()
/// };
/// let encoded = query::encode(&resource::ISSUE, &options).unwrap();
/// assert_eq!(encoded, "include=journals%2Cattachments&limit=25&project_id=5");
/// ```
pub fn encode<Q: Serialize + ?Sized>(spec: &ResourceSpec, options: &Q) -> Result<String> {
    let params = collect(spec, options)?;

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in &params {
        serializer.append_pair(key, value);
    }
    Ok(serializer.finish())
}

/// Validate and flatten `options` into ordered `(name, value)` pairs.
pub fn collect<Q: Serialize + ?Sized>(
    spec: &ResourceSpec,
    options: &Q,
) -> Result<BTreeMap<String, String>> {
    let fields = match serde_json::to_value(options)? {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Object(fields) => fields,
        other => {
            return Err(RedmineError::invalid(format!(
                "query options for {} must be an object, got {other}",
                spec.plural
            )))
        }
    };

    let mut params = BTreeMap::new();
    for (key, value) in fields {
        let Some(rendered) = render(&key, value)? else {
            continue;
        };
        let rendered = match key.as_str() {
            "include" => spec.check_includes(&rendered)?,
            "sort" => spec.check_sort(&rendered)?,
            _ => rendered,
        };
        if !rendered.is_empty() {
            params.insert(key, rendered);
        }
    }
    Ok(params)
}

fn render(key: &str, value: Value) -> Result<Option<String>> {
    let rendered = match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("1".to_string()),
        Value::Number(n) => {
            let zero = n.as_u64() == Some(0) || n.as_i64() == Some(0) || n.as_f64() == Some(0.0);
            (!zero).then(|| n.to_string())
        }
        Value::String(s) => (!s.is_empty()).then_some(s),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                if let Some(part) = render(key, item)? {
                    parts.push(part);
                }
            }
            (!parts.is_empty()).then(|| parts.join(","))
        }
        Value::Object(_) => {
            return Err(RedmineError::invalid(format!(
                "query parameter '{key}' cannot be a nested object"
            )))
        }
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::resource::{ISSUE, PROJECT, TIME_ENTRY};
    use serde_json::json;

    #[test]
    fn test_zero_values_are_not_applied() {
        let encoded = encode(
            &ISSUE,
            &json!({"project_id": 0, "subject": "", "limit": 0, "offset": null, "include": ""}),
        )
        .unwrap();
        assert!(encoded.is_empty());
    }

    #[test]
    fn test_keys_are_sorted() {
        let encoded = encode(
            &TIME_ENTRY,
            &json!({"to": "2024-01-31", "from": "2024-01-01", "user_id": "me", "limit": 10}),
        )
        .unwrap();
        assert_eq!(encoded, "from=2024-01-01&limit=10&to=2024-01-31&user_id=me");
    }

    #[test]
    fn test_date_operators_pass_through_opaque() {
        let encoded = encode(&ISSUE, &json!({"updated_on": ">=2024-03-01"})).unwrap();
        assert_eq!(encoded, "updated_on=%3E%3D2024-03-01");
    }

    #[test]
    fn test_booleans_and_arrays() {
        let encoded = encode(&ISSUE, &json!({"is_private": true, "issue_id": [3, 4, 0]})).unwrap();
        assert_eq!(encoded, "is_private=1&issue_id=3%2C4");
    }

    #[test]
    fn test_nested_object_rejected() {
        let err = encode(&ISSUE, &json!({"project": {"id": 1}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_invalid_include_rejected() {
        let err = encode(&PROJECT, &json!({"include": "trackers,watchers"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_unit_options_encode_empty() {
        assert_eq!(encode(&ISSUE, &()).unwrap(), "");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let options = json!({"status_id": "open", "sort": "priority:desc", "include": "watchers"});
        let first = encode(&ISSUE, &options).unwrap();
        let second = encode(&ISSUE, &options).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "include=watchers&sort=priority%3Adesc&status_id=open");
    }

    #[test]
    fn test_encoded_form_decodes_back() {
        let encoded = encode(
            &ISSUE,
            &json!({"project_id": 5, "status_id": "*", "cf_4": "high", "limit": 25}),
        )
        .unwrap();
        let decoded: BTreeMap<String, String> = serde_qs::from_str(&encoded).unwrap();
        assert_eq!(decoded["project_id"], "5");
        assert_eq!(decoded["status_id"], "*");
        assert_eq!(decoded["cf_4"], "high");
        assert_eq!(decoded.len(), 4);
    }
}
