//! Per-resource configuration table.
//!
//! Every resource family is described once by a [`ResourceSpec`]: the JSON
//! envelope keys, the include vocabulary, the sortable fields and the fields
//! a write payload may carry. The query builder and the payload routines in
//! this module are generic over that table, so adding a resource means adding
//! a row rather than new encoding code.

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{RedmineError, Result};

/// Static description of one resource family.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Envelope key for a single entity (`"issue"`).
    pub singular: &'static str,
    /// Envelope key for a collection (`"issues"`).
    pub plural: &'static str,
    /// Accepted `include` tokens.
    pub includes: &'static [&'static str],
    /// Accepted `sort` fields.
    pub sort_fields: &'static [&'static str],
    /// Keys allowed inside a create/update payload.
    pub writable: &'static [&'static str],
}

pub const PROJECT: ResourceSpec = ResourceSpec {
    singular: "project",
    plural: "projects",
    includes: &[
        "trackers",
        "issue_categories",
        "enabled_modules",
        "time_entry_activities",
        "issue_custom_fields",
    ],
    sort_fields: &["id", "name", "identifier", "created_on", "updated_on"],
    writable: &[
        "name",
        "identifier",
        "description",
        "homepage",
        "is_public",
        "parent_id",
        "inherit_members",
        "default_assigned_to_id",
        "default_version_id",
        "tracker_ids",
        "enabled_module_names",
        "issue_custom_field_ids",
        "custom_fields",
    ],
};

pub const ISSUE: ResourceSpec = ResourceSpec {
    singular: "issue",
    plural: "issues",
    includes: &[
        "children",
        "attachments",
        "relations",
        "changesets",
        "journals",
        "watchers",
        "allowed_statuses",
    ],
    sort_fields: &[
        "id",
        "project",
        "tracker",
        "status",
        "priority",
        "subject",
        "author",
        "assigned_to",
        "category",
        "fixed_version",
        "start_date",
        "due_date",
        "estimated_hours",
        "done_ratio",
        "created_on",
        "updated_on",
        "closed_on",
        "parent",
    ],
    writable: &[
        "project_id",
        "tracker_id",
        "status_id",
        "priority_id",
        "subject",
        "description",
        "category_id",
        "fixed_version_id",
        "assigned_to_id",
        "parent_issue_id",
        "custom_fields",
        "watcher_user_ids",
        "is_private",
        "estimated_hours",
        "start_date",
        "due_date",
        "done_ratio",
        "notes",
        "private_notes",
        "uploads",
    ],
};

pub const USER: ResourceSpec = ResourceSpec {
    singular: "user",
    plural: "users",
    includes: &["memberships", "groups"],
    sort_fields: &["id", "login", "firstname", "lastname", "mail", "created_on", "last_login_on"],
    writable: &[
        "login",
        "password",
        "firstname",
        "lastname",
        "mail",
        "auth_source_id",
        "mail_notification",
        "must_change_passwd",
        "generate_password",
        "admin",
        "status",
        "custom_fields",
    ],
};

pub const GROUP: ResourceSpec = ResourceSpec {
    singular: "group",
    plural: "groups",
    includes: &["users", "memberships"],
    sort_fields: &[],
    writable: &["name", "user_ids", "custom_fields"],
};

pub const TIME_ENTRY: ResourceSpec = ResourceSpec {
    singular: "time_entry",
    plural: "time_entries",
    includes: &[],
    sort_fields: &[
        "spent_on",
        "created_on",
        "hours",
        "user",
        "activity",
        "project",
        "issue",
    ],
    writable: &[
        "hours",
        "activity_id",
        "issue_id",
        "project_id",
        "spent_on",
        "comments",
        "user_id",
        "custom_fields",
    ],
};

pub const WIKI_PAGE: ResourceSpec = ResourceSpec {
    singular: "wiki_page",
    plural: "wiki_pages",
    includes: &["attachments"],
    sort_fields: &[],
    writable: &["text", "comments", "version", "parent_title", "uploads"],
};

pub const ATTACHMENT: ResourceSpec = ResourceSpec {
    singular: "attachment",
    plural: "attachments",
    includes: &[],
    sort_fields: &[],
    writable: &["filename", "description"],
};

pub const UPLOAD: ResourceSpec = ResourceSpec {
    singular: "upload",
    plural: "uploads",
    includes: &[],
    sort_fields: &[],
    writable: &[],
};

pub const JOURNAL: ResourceSpec = ResourceSpec {
    singular: "journal",
    plural: "journals",
    includes: &[],
    sort_fields: &[],
    writable: &[],
};

pub const TRACKER: ResourceSpec = ResourceSpec {
    singular: "tracker",
    plural: "trackers",
    includes: &[],
    sort_fields: &[],
    writable: &[],
};

pub const NEWS: ResourceSpec = ResourceSpec {
    singular: "news",
    plural: "news",
    includes: &["attachments", "comments"],
    sort_fields: &[],
    writable: &[],
};

pub const ISSUE_RELATION: ResourceSpec = ResourceSpec {
    singular: "relation",
    plural: "relations",
    includes: &[],
    sort_fields: &[],
    writable: &["issue_to_id", "relation_type", "delay"],
};

pub const MY_ACCOUNT: ResourceSpec = ResourceSpec {
    singular: "user",
    plural: "users",
    includes: &[],
    sort_fields: &[],
    writable: &["firstname", "lastname", "mail", "custom_fields"],
};

/// Every resource family known to the client.
pub const RESOURCES: &[&ResourceSpec] = &[
    &PROJECT,
    &ISSUE,
    &USER,
    &GROUP,
    &TIME_ENTRY,
    &WIKI_PAGE,
    &ATTACHMENT,
    &UPLOAD,
    &JOURNAL,
    &TRACKER,
    &NEWS,
    &ISSUE_RELATION,
    &MY_ACCOUNT,
];

/// Links an entity type to its row in the resource table.
pub trait Resource {
    /// The table row describing this resource.
    const SPEC: &'static ResourceSpec;
}

impl ResourceSpec {
    /// Find a resource by its collection key (`"time_entries"`).
    pub fn lookup(plural: &str) -> Option<&'static ResourceSpec> {
        RESOURCES.iter().copied().find(|spec| spec.plural == plural)
    }

    /// Validate a comma-separated include list and return it normalized.
    ///
    /// Tokens are trimmed and empty tokens dropped. Any token outside the
    /// vocabulary fails the whole list.
    pub fn check_includes(&self, raw: &str) -> Result<String> {
        let mut tokens = Vec::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if !self.includes.contains(&token) {
                return Err(RedmineError::invalid(format!(
                    "unknown include '{token}' for {}; expected one of: {}",
                    self.plural,
                    describe(self.includes)
                )));
            }
            tokens.push(token);
        }
        Ok(tokens.join(","))
    }

    /// Validate a sort expression such as `priority:desc,id`.
    pub fn check_sort(&self, raw: &str) -> Result<String> {
        let mut terms = Vec::new();
        for term in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (field, direction) = match term.split_once(':') {
                Some((field, direction)) => (field, Some(direction)),
                None => (term, None),
            };
            if !self.sort_fields.contains(&field) {
                return Err(RedmineError::invalid(format!(
                    "cannot sort {} by '{field}'; expected one of: {}",
                    self.plural,
                    describe(self.sort_fields)
                )));
            }
            if let Some(direction) = direction {
                if direction != "asc" && direction != "desc" {
                    return Err(RedmineError::invalid(format!(
                        "sort direction must be 'asc' or 'desc', got '{direction}'"
                    )));
                }
            }
            terms.push(term);
        }
        Ok(terms.join(","))
    }

    /// Wrap a write payload as `{"<singular>": payload}`.
    ///
    /// The payload must serialize to a JSON object whose keys are all
    /// writable for this resource. The returned envelope borrows the payload
    /// so field order on the wire follows the payload type.
    pub fn wrap<'a, B: Serialize + ?Sized>(&self, payload: &'a B) -> Result<Envelope<'a, B>> {
        let value = serde_json::to_value(payload)?;
        let Value::Object(fields) = &value else {
            return Err(RedmineError::invalid(format!(
                "{} payload must be a JSON object",
                self.singular
            )));
        };
        if let Some(key) = fields.keys().find(|k| !self.writable.contains(&k.as_str())) {
            return Err(RedmineError::invalid(format!(
                "field '{key}' is not writable for {}",
                self.singular
            )));
        }
        Ok(Envelope {
            key: self.singular,
            body: payload,
        })
    }

    /// Extract the single entity from a `{"<singular>": {...}}` response.
    pub fn unwrap_one<T: DeserializeOwned>(&self, mut body: Map<String, Value>) -> Result<T> {
        let inner = body.remove(self.singular).ok_or_else(|| {
            RedmineError::Json(serde::de::Error::custom(format!(
                "response has no '{}' member",
                self.singular
            )))
        })?;
        Ok(serde_json::from_value(inner)?)
    }

    /// Extract the entity list from a `{"<plural>": [...]}` response.
    pub fn unwrap_many<T: DeserializeOwned>(&self, body: &mut Map<String, Value>) -> Result<Vec<T>> {
        match body.remove(self.plural) {
            Some(items) => Ok(serde_json::from_value(items)?),
            None => Ok(Vec::new()),
        }
    }
}

fn describe(tokens: &[&str]) -> String {
    if tokens.is_empty() {
        "(none)".to_string()
    } else {
        tokens.join(", ")
    }
}

/// A write payload nested under its resource key.
#[derive(Debug)]
pub struct Envelope<'a, B: ?Sized> {
    key: &'static str,
    body: &'a B,
}

impl<B: Serialize + ?Sized> Serialize for Envelope<'_, B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, self.body)?;
        map.end()
    }
}
