//! Issue endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{not_found, single, strip_json, unprocessable, PageParams};
use crate::mock_server::fixtures::Fixtures;
use crate::mock_server::state::{MockState, SharedState};
use crate::{Issue, Journal, JournalDetail, NamedRef};

const CLOSED_STATUS: u64 = 5;

#[derive(Debug, Deserialize)]
pub struct IssueEnvelope {
    pub issue: IssueWrite,
}

/// Writable issue attributes. `assigned_to_id: null` unassigns.
#[derive(Debug, Default, Deserialize)]
pub struct IssueWrite {
    pub project_id: Option<u64>,
    pub tracker_id: Option<u64>,
    pub status_id: Option<u64>,
    pub subject: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub assigned_to_id: Option<Option<u64>>,
    pub done_ratio: Option<u8>,
    pub is_private: Option<bool>,
    pub notes: Option<String>,
}

/// Filters understood by the issue listing.
#[derive(Debug, Default, Deserialize)]
pub struct IssueListParams {
    pub project_id: Option<String>,
    /// `open` (default), `closed`, `*` or a status id.
    pub status_id: Option<String>,
    pub assigned_to_id: Option<u64>,
    pub tracker_id: Option<u64>,
}

/// GET /issues.json
pub async fn list_issues(
    State(state): State<SharedState>,
    Query(params): Query<IssueListParams>,
    Query(page): Query<PageParams>,
) -> Response {
    let state = state.read().await;

    let project_id = match params.project_id {
        Some(ref key) => match state.find_project(key) {
            Some(project) => Some(project.id),
            None => return not_found(),
        },
        None => None,
    };

    let status = params.status_id.as_deref().unwrap_or("open");
    let issues: Vec<Issue> = state
        .list_issues(project_id)
        .into_iter()
        .filter(|issue| match status {
            "*" => true,
            "open" => issue.status.id != CLOSED_STATUS,
            "closed" => issue.status.id == CLOSED_STATUS,
            id => id.parse::<u64>().ok() == Some(issue.status.id),
        })
        .filter(|issue| {
            params
                .assigned_to_id
                .map_or(true, |a| issue.assigned_to.as_ref().map(|r| r.id) == Some(a))
        })
        .filter(|issue| params.tracker_id.map_or(true, |t| issue.tracker.id == t))
        .map(|issue| {
            let mut summary = issue.clone();
            summary.journals.clear();
            summary
        })
        .collect();

    Json(page.envelope("issues", issues)).into_response()
}

/// GET /issues/{id}.json
///
/// Journals are only returned with `include=journals`.
pub async fn get_issue(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(show): Query<IncludeParams>,
) -> Response {
    let Some(id) = strip_json(&id).and_then(|id| id.parse::<u64>().ok()) else {
        return not_found();
    };
    let state = state.read().await;
    let Some(issue) = state.issues.get(&id) else {
        return not_found();
    };

    let mut issue = issue.clone();
    if !show.includes("journals") {
        issue.journals.clear();
    }
    single(StatusCode::OK, "issue", &issue)
}

/// Comma-separated `include` parameter.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeParams {
    pub include: Option<String>,
}

impl IncludeParams {
    pub fn includes(&self, name: &str) -> bool {
        self.include
            .as_deref()
            .map_or(false, |list| list.split(',').any(|i| i.trim() == name))
    }
}

/// POST /issues.json
pub async fn create_issue(
    State(state): State<SharedState>,
    Json(body): Json<IssueEnvelope>,
) -> Response {
    let write = body.issue;
    let mut state = state.write().await;

    let project = write
        .project_id
        .and_then(|id| state.projects.get(&id))
        .cloned();
    let subject = write.subject.clone().unwrap_or_default();

    let mut errors = Vec::new();
    if project.is_none() {
        errors.push("Project cannot be blank".to_string());
    }
    if subject.trim().is_empty() {
        errors.push("Subject cannot be blank".to_string());
    }
    let tracker = match write.tracker_id {
        Some(id) => match lookup(&Fixtures::trackers(), id) {
            Some(tracker) => Some(tracker),
            None => {
                errors.push("Tracker is not included in the list".to_string());
                None
            }
        },
        None => None,
    };
    let Some(project) = project.filter(|_| errors.is_empty()) else {
        return unprocessable(errors);
    };

    let id = state.allocate_id();
    let mut issue = Fixtures::issue(id, &project, &subject);
    issue.author = state.current_user();
    issue.description = write.description.or(Some(String::new()));
    if let Some(tracker) = tracker {
        issue.tracker = tracker;
    }
    if let Some(status) = write.status_id.and_then(|id| lookup(&Fixtures::statuses(), id)) {
        issue.status = status;
    }
    issue.assigned_to = write
        .assigned_to_id
        .flatten()
        .map(|id| Fixtures::named(id, &format!("User {id}")));
    issue.done_ratio = write.done_ratio.unwrap_or(0);
    issue.is_private = write.is_private.unwrap_or(false);
    issue.created_on = Some(Utc::now());
    issue.updated_on = issue.created_on;

    state.issues.insert(id, issue.clone());
    single(StatusCode::CREATED, "issue", &issue)
}

/// PUT /issues/{id}.json
///
/// Attribute changes and notes are recorded as a journal entry.
pub async fn update_issue(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<IssueEnvelope>,
) -> Response {
    let Some(id) = strip_json(&id).and_then(|id| id.parse::<u64>().ok()) else {
        return not_found();
    };
    let write = body.issue;
    let mut state = state.write().await;
    if !state.issues.contains_key(&id) {
        return not_found();
    }
    if write.subject.as_deref().map_or(false, |s| s.trim().is_empty()) {
        return unprocessable(vec!["Subject cannot be blank".to_string()]);
    }
    let status = match write.status_id {
        Some(status_id) => match lookup(&Fixtures::statuses(), status_id) {
            Some(status) => Some(status),
            None => return unprocessable(vec!["Status is not included in the list".to_string()]),
        },
        None => None,
    };

    let journal_id = state.allocate_id();
    let user = state.current_user();
    let Some(issue) = state.issues.get_mut(&id) else {
        return not_found();
    };

    let mut details = Vec::new();
    if let Some(subject) = write.subject {
        details.push(attr_change("subject", &issue.subject, &subject));
        issue.subject = subject;
    }
    if let Some(status) = status {
        details.push(attr_change(
            "status_id",
            &issue.status.id.to_string(),
            &status.id.to_string(),
        ));
        issue.closed_on = (status.id == CLOSED_STATUS).then(Utc::now);
        issue.status = status;
    }
    if let Some(description) = write.description {
        issue.description = Some(description);
    }
    if let Some(assignee) = write.assigned_to_id {
        issue.assigned_to = assignee.map(|id| Fixtures::named(id, &format!("User {id}")));
    }
    if let Some(done_ratio) = write.done_ratio {
        issue.done_ratio = done_ratio;
    }
    if let Some(is_private) = write.is_private {
        issue.is_private = is_private;
    }

    let notes = write.notes.unwrap_or_default();
    if !notes.is_empty() || !details.is_empty() {
        issue.journals.push(Journal {
            id: journal_id,
            user: Some(user),
            notes: Some(notes),
            created_on: Some(Utc::now()),
            private_notes: false,
            details,
        });
    }
    issue.updated_on = Some(Utc::now());

    StatusCode::NO_CONTENT.into_response()
}

/// DELETE /issues/{id}.json
pub async fn delete_issue(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let Some(id) = strip_json(&id).and_then(|id| id.parse::<u64>().ok()) else {
        return not_found();
    };
    let mut state = state.write().await;
    if state.issues.remove(&id).is_none() {
        return not_found();
    }
    remove_issue_time(&mut state, id);
    StatusCode::NO_CONTENT.into_response()
}

fn remove_issue_time(state: &mut MockState, issue_id: u64) {
    state
        .time_entries
        .retain(|_, entry| entry.issue.as_ref().map(|i| i.id) != Some(issue_id));
}

pub(super) fn lookup(table: &[NamedRef], id: u64) -> Option<NamedRef> {
    table.iter().find(|r| r.id == id).cloned()
}

fn attr_change(name: &str, old: &str, new: &str) -> JournalDetail {
    JournalDetail {
        property: "attr".to_string(),
        name: name.to_string(),
        old_value: Some(old.to_string()),
        new_value: Some(new.to_string()),
    }
}
