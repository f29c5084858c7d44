//! Records shared by several resources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RedmineError, Result};

/// Lightweight cross-reference to another entity (`{"id": 3, "name": "Bug"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// Custom field value as sent on create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: u64,
    pub value: CustomValue,
}

impl CustomField {
    /// Single-valued custom field.
    pub fn single(id: u64, value: impl Into<String>) -> Self {
        Self {
            id,
            value: CustomValue::Single(value.into()),
        }
    }

    /// Multi-valued custom field.
    pub fn multiple<I, S>(id: u64, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            value: CustomValue::Multiple(values.into_iter().map(Into::into).collect()),
        }
    }
}

/// A custom field value: one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomValue {
    Single(String),
    Multiple(Vec<String>),
}

/// Custom field as reported on read entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldValue {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub multiple: bool,
    /// `None` when the field has no value set.
    #[serde(default)]
    pub value: Option<CustomValue>,
}

/// Reference to a file uploaded through `uploads.json`, attached on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRef {
    pub token: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Project membership of a user or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    #[serde(default)]
    pub id: Option<u64>,
    pub project: NamedRef,
    #[serde(default)]
    pub roles: Vec<NamedRef>,
}

/// Options accepted by single-entity fetches that support include expansions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShowQuery {
    /// Comma-separated include tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
}

impl ShowQuery {
    /// Request the given include expansions.
    pub fn include(tokens: impl Into<String>) -> Self {
        Self {
            include: Some(tokens.into()),
        }
    }
}

/// A project addressed by numeric id or by its string identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectRef {
    Id(u64),
    Identifier(String),
}

impl ProjectRef {
    /// The value as a URL path segment.
    pub fn path_segment(&self) -> String {
        match self {
            ProjectRef::Id(id) => id.to_string(),
            ProjectRef::Identifier(identifier) => urlencoding::encode(identifier).into_owned(),
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectRef::Id(id) => write!(f, "{id}"),
            ProjectRef::Identifier(identifier) => f.write_str(identifier),
        }
    }
}

impl FromStr for ProjectRef {
    type Err = RedmineError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RedmineError::invalid("project reference must not be empty"));
        }
        Ok(match s.parse::<u64>() {
            Ok(id) => ProjectRef::Id(id),
            Err(_) => ProjectRef::Identifier(s.to_string()),
        })
    }
}

impl From<u64> for ProjectRef {
    fn from(id: u64) -> Self {
        ProjectRef::Id(id)
    }
}

impl From<&str> for ProjectRef {
    fn from(identifier: &str) -> Self {
        ProjectRef::Identifier(identifier.to_string())
    }
}

impl From<String> for ProjectRef {
    fn from(identifier: String) -> Self {
        ProjectRef::Identifier(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_custom_field_write_shapes() {
        assert_eq!(
            serde_json::to_value(CustomField::single(4, "yes")).unwrap(),
            json!({"id": 4, "value": "yes"})
        );
        assert_eq!(
            serde_json::to_value(CustomField::multiple(5, ["a", "b"])).unwrap(),
            json!({"id": 5, "value": ["a", "b"]})
        );
    }

    #[test]
    fn test_custom_field_value_deserialize() {
        let single: CustomFieldValue =
            serde_json::from_value(json!({"id": 1, "name": "Build", "value": "42"})).unwrap();
        assert_eq!(single.value, Some(CustomValue::Single("42".into())));
        assert!(!single.multiple);

        let multi: CustomFieldValue = serde_json::from_value(
            json!({"id": 2, "name": "OS", "multiple": true, "value": ["linux", "mac"]}),
        )
        .unwrap();
        assert!(multi.multiple);
        assert_eq!(
            multi.value,
            Some(CustomValue::Multiple(vec!["linux".into(), "mac".into()]))
        );

        let unset: CustomFieldValue =
            serde_json::from_value(json!({"id": 3, "name": "Empty", "value": null})).unwrap();
        assert!(unset.value.is_none());
    }

    #[test]
    fn test_project_ref_parse() {
        assert_eq!("12".parse::<ProjectRef>().unwrap(), ProjectRef::Id(12));
        assert_eq!(
            "my-project".parse::<ProjectRef>().unwrap(),
            ProjectRef::Identifier("my-project".into())
        );
        assert!("  ".parse::<ProjectRef>().is_err());
    }

    #[test]
    fn test_project_ref_path_segment_is_encoded() {
        assert_eq!(ProjectRef::from("a b").path_segment(), "a%20b");
        assert_eq!(ProjectRef::from(7).path_segment(), "7");
    }

    #[test]
    fn test_show_query_serialize() {
        assert_eq!(serde_json::to_value(ShowQuery::default()).unwrap(), json!({}));
        assert_eq!(
            serde_json::to_value(ShowQuery::include("journals")).unwrap(),
            json!({"include": "journals"})
        );
    }
}
