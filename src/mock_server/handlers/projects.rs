//! Project endpoint handlers.

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
use crate::mock_server::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ProjectEnvelope {
    pub project: ProjectWrite,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectWrite {
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub is_public: Option<bool>,
    pub parent_id: Option<u64>,
}

/// Query parameters for listing projects.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListParams {
    pub status: Option<u8>,
}

/// GET /projects.json
pub async fn list_projects(
    State(state): State<SharedState>,
    Query(params): Query<ProjectListParams>,
    Query(page): Query<PageParams>,
) -> Response {
    let state = state.read().await;
    let projects: Vec<_> = state
        .projects
        .values()
        .filter(|p| match params.status {
            Some(status) => p.status.map(u8::from) == Some(status),
            None => !p.is_archived(),
        })
        .cloned()
        .collect();

    Json(page.envelope("projects", projects)).into_response()
}

/// GET /projects/{id}.json
pub async fn get_project(
    State(state): State<SharedState>,
    Path(project): Path<String>,
) -> Response {
    let Some(key) = strip_json(&project) else {
        return not_found();
    };
    let state = state.read().await;
    match state.find_project(key) {
        Some(project) => single(StatusCode::OK, "project", project),
        None => not_found(),
    }
}

/// POST /projects.json
pub async fn create_project(
    State(state): State<SharedState>,
    Json(body): Json<ProjectEnvelope>,
) -> Response {
    let write = body.project;
    let mut state = state.write().await;

    let name = write.name.unwrap_or_default();
    let identifier = write.identifier.unwrap_or_default();
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push("Name cannot be blank".to_string());
    }
    if identifier.trim().is_empty() {
        errors.push("Identifier cannot be blank".to_string());
    } else if state.find_project(&identifier).is_some() {
        errors.push("Identifier has already been taken".to_string());
    }
    if !errors.is_empty() {
        return unprocessable(errors);
    }

    let parent = write
        .parent_id
        .and_then(|id| state.projects.get(&id))
        .map(|p| Fixtures::named(p.id, &p.name));

    let id = state.allocate_id();
    let mut project = Fixtures::project(id, &identifier, &name);
    project.description = write.description.or(Some(String::new()));
    project.homepage = write.homepage;
    project.is_public = write.is_public.unwrap_or(true);
    project.parent = parent;
    project.created_on = Some(Utc::now());
    project.updated_on = project.created_on;

    state.projects.insert(id, project.clone());
    single(StatusCode::CREATED, "project", &project)
}

/// PUT /projects/{id}.json
pub async fn update_project(
    State(state): State<SharedState>,
    Path(project): Path<String>,
    Json(body): Json<ProjectEnvelope>,
) -> Response {
    let Some(key) = strip_json(&project) else {
        return not_found();
    };
    let mut state = state.write().await;
    let Some(id) = state.find_project(key).map(|p| p.id) else {
        return not_found();
    };

    let write = body.project;
    if let Some(ref name) = write.name {
        if name.trim().is_empty() {
            return unprocessable(vec!["Name cannot be blank".to_string()]);
        }
    }

    let Some(project) = state.projects.get_mut(&id) else {
        return not_found();
    };
    if let Some(name) = write.name {
        project.name = name;
    }
    if let Some(description) = write.description {
        project.description = Some(description);
    }
    if let Some(homepage) = write.homepage {
        project.homepage = Some(homepage);
    }
    if let Some(is_public) = write.is_public {
        project.is_public = is_public;
    }
    project.updated_on = Some(Utc::now());

    StatusCode::NO_CONTENT.into_response()
}

/// DELETE /projects/{id}.json
///
/// Issues, time entries and wiki pages of the project go with it.
pub async fn delete_project(
    State(state): State<SharedState>,
    Path(project): Path<String>,
) -> Response {
    let Some(key) = strip_json(&project) else {
        return not_found();
    };
    let mut state = state.write().await;
    let Some(id) = state.find_project(key).map(|p| p.id) else {
        return not_found();
    };

    state.projects.remove(&id);
    state.issues.retain(|_, issue| issue.project.id != id);
    state.time_entries.retain(|_, entry| entry.project.id != id);
    state.wiki_pages.retain(|(project_id, _), _| *project_id != id);

    StatusCode::NO_CONTENT.into_response()
}

