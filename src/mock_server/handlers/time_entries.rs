//! Time entry endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use super::issues::lookup;
use super::{not_found, single, strip_json, unprocessable, PageParams};
use crate::mock_server::fixtures::Fixtures;
use crate::mock_server::state::SharedState;
use crate::{IssueParent, TimeEntry};

#[derive(Debug, Deserialize)]
pub struct TimeEntryEnvelope {
    pub time_entry: TimeEntryWrite,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimeEntryWrite {
    pub issue_id: Option<u64>,
    pub project_id: Option<u64>,
    pub spent_on: Option<NaiveDate>,
    pub hours: Option<f64>,
    pub activity_id: Option<u64>,
    pub comments: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimeEntryListParams {
    pub project_id: Option<String>,
    pub issue_id: Option<u64>,
    pub user_id: Option<u64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// GET /time_entries.json
pub async fn list_time_entries(
    State(state): State<SharedState>,
    Query(params): Query<TimeEntryListParams>,
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

    let entries: Vec<&TimeEntry> = state
        .time_entries
        .values()
        .filter(|e| project_id.map_or(true, |p| e.project.id == p))
        .filter(|e| {
            params
                .issue_id
                .map_or(true, |i| e.issue.as_ref().map(|r| r.id) == Some(i))
        })
        .filter(|e| params.user_id.map_or(true, |u| e.user.id == u))
        .filter(|e| params.from.map_or(true, |from| e.spent_on >= from))
        .filter(|e| params.to.map_or(true, |to| e.spent_on <= to))
        .collect();

    Json(page.envelope("time_entries", entries)).into_response()
}

/// GET /time_entries/{id}.json
pub async fn get_time_entry(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let Some(id) = strip_json(&id).and_then(|id| id.parse::<u64>().ok()) else {
        return not_found();
    };
    let state = state.read().await;
    match state.time_entries.get(&id) {
        Some(entry) => single(StatusCode::OK, "time_entry", entry),
        None => not_found(),
    }
}

/// POST /time_entries.json
///
/// The project is taken from the issue when one is given.
pub async fn create_time_entry(
    State(state): State<SharedState>,
    Json(body): Json<TimeEntryEnvelope>,
) -> Response {
    let write = body.time_entry;
    let mut state = state.write().await;

    let mut errors = Vec::new();
    let issue = match write.issue_id {
        Some(issue_id) => match state.issues.get(&issue_id) {
            Some(issue) => Some(issue.clone()),
            None => {
                errors.push("Issue is invalid".to_string());
                None
            }
        },
        None => None,
    };
    let project = match issue {
        Some(ref issue) => Some(issue.project.clone()),
        None => write
            .project_id
            .and_then(|id| state.projects.get(&id))
            .map(|p| Fixtures::named(p.id, &p.name)),
    };
    if project.is_none() && errors.is_empty() {
        errors.push("Project cannot be blank".to_string());
    }
    let hours = write.hours.unwrap_or(0.0);
    if hours <= 0.0 {
        errors.push("Hours is invalid".to_string());
    }
    let activity = write
        .activity_id
        .map_or(Some(Fixtures::named(9, "Development")), |id| {
            lookup(&Fixtures::activities(), id)
        });
    if activity.is_none() {
        errors.push("Activity is not included in the list".to_string());
    }

    let (Some(project), Some(activity)) = (project, activity) else {
        return unprocessable(errors);
    };
    if !errors.is_empty() {
        return unprocessable(errors);
    }

    let id = state.allocate_id();
    let now = Utc::now();
    let entry = TimeEntry {
        id,
        project,
        issue: issue.map(|i| IssueParent { id: i.id }),
        user: state.current_user(),
        activity,
        hours,
        comments: write.comments.unwrap_or_default(),
        spent_on: write.spent_on.unwrap_or_else(|| now.date_naive()),
        custom_fields: vec![],
        created_on: Some(now),
        updated_on: Some(now),
    };

    state.time_entries.insert(id, entry.clone());
    single(StatusCode::CREATED, "time_entry", &entry)
}

/// PUT /time_entries/{id}.json
pub async fn update_time_entry(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<TimeEntryEnvelope>,
) -> Response {
    let Some(id) = strip_json(&id).and_then(|id| id.parse::<u64>().ok()) else {
        return not_found();
    };
    let write = body.time_entry;
    if write.hours.map_or(false, |h| h <= 0.0) {
        return unprocessable(vec!["Hours is invalid".to_string()]);
    }

    let mut state = state.write().await;
    let Some(entry) = state.time_entries.get_mut(&id) else {
        return not_found();
    };
    if let Some(hours) = write.hours {
        entry.hours = hours;
    }
    if let Some(comments) = write.comments {
        entry.comments = comments;
    }
    if let Some(spent_on) = write.spent_on {
        entry.spent_on = spent_on;
    }
    if let Some(activity) = write
        .activity_id
        .and_then(|id| lookup(&Fixtures::activities(), id))
    {
        entry.activity = activity;
    }
    entry.updated_on = Some(Utc::now());

    StatusCode::NO_CONTENT.into_response()
}

/// DELETE /time_entries/{id}.json
pub async fn delete_time_entry(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = strip_json(&id).and_then(|id| id.parse::<u64>().ok()) else {
        return not_found();
    };
    let mut state = state.write().await;
    match state.time_entries.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(),
    }
}
