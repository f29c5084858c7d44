//! Wiki page endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::issues::IncludeParams;
use super::{not_found, single, strip_json};
use crate::mock_server::state::SharedState;
use crate::{WikiPage, WikiParent};

#[derive(Debug, Deserialize)]
pub struct WikiPageEnvelope {
    pub wiki_page: WikiPageWrite,
}

#[derive(Debug, Default, Deserialize)]
pub struct WikiPageWrite {
    pub text: String,
    pub comments: Option<String>,
    /// Version the edit is based on; stale versions conflict.
    pub version: Option<u32>,
    pub parent_title: Option<String>,
}

/// GET /projects/{project}/wiki/{title}.json
///
/// `index.json` in title position lists the project's pages.
pub async fn get_wiki_page(
    State(state): State<SharedState>,
    Path((project, title)): Path<(String, String)>,
    Query(show): Query<IncludeParams>,
) -> Response {
    let state = state.read().await;
    let Some(project_id) = state.find_project(&project).map(|p| p.id) else {
        return not_found();
    };

    if title == "index.json" {
        let pages: Vec<WikiPage> = state
            .wiki_pages
            .iter()
            .filter(|((id, _), _)| *id == project_id)
            .filter_map(|(_, versions)| versions.last())
            .map(|page| WikiPage {
                text: None,
                author: None,
                comments: None,
                attachments: vec![],
                ..page.clone()
            })
            .collect();
        return Json(json!({ "wiki_pages": pages })).into_response();
    }

    let Some(title) = strip_json(&title) else {
        return not_found();
    };
    match state.wiki_page(project_id, title) {
        Some(page) => single(StatusCode::OK, "wiki_page", &with_includes(page, &show)),
        None => not_found(),
    }
}

/// GET /projects/{project}/wiki/{title}/{version}.json
pub async fn get_wiki_page_version(
    State(state): State<SharedState>,
    Path((project, title, version)): Path<(String, String, String)>,
) -> Response {
    let Some(version) = strip_json(&version).and_then(|v| v.parse::<usize>().ok()) else {
        return not_found();
    };
    let state = state.read().await;
    let Some(project_id) = state.find_project(&project).map(|p| p.id) else {
        return not_found();
    };

    let page = state
        .wiki_pages
        .get(&(project_id, title))
        .and_then(|versions| versions.get(version.checked_sub(1)?));
    match page {
        Some(page) => single(StatusCode::OK, "wiki_page", page),
        None => not_found(),
    }
}

/// PUT /projects/{project}/wiki/{title}.json
///
/// Creates the page (201 with body) or appends a version (204).
pub async fn put_wiki_page(
    State(state): State<SharedState>,
    Path((project, title)): Path<(String, String)>,
    Json(body): Json<WikiPageEnvelope>,
) -> Response {
    let Some(title) = strip_json(&title).map(str::to_string) else {
        return not_found();
    };
    let write = body.wiki_page;
    let mut state = state.write().await;
    let Some(project_id) = state.find_project(&project).map(|p| p.id) else {
        return not_found();
    };
    let author = state.current_user();
    let now = Utc::now();

    let versions = state
        .wiki_pages
        .entry((project_id, title.clone()))
        .or_default();

    let current = versions.last().and_then(|page| page.version).unwrap_or(0);
    if let Some(base) = write.version {
        if current > 0 && base != current {
            return (
                StatusCode::CONFLICT,
                Json(json!({"errors": ["Data has been updated by another user."]})),
            )
                .into_response();
        }
    }

    let page = WikiPage {
        title,
        parent: write
            .parent_title
            .map(|title| WikiParent { title })
            .or_else(|| versions.last().and_then(|p| p.parent.clone())),
        text: Some(write.text),
        version: Some(current + 1),
        author: Some(author),
        comments: write.comments,
        created_on: versions.first().and_then(|p| p.created_on).or(Some(now)),
        updated_on: Some(now),
        attachments: vec![],
    };
    versions.push(page.clone());

    if current == 0 {
        single(StatusCode::CREATED, "wiki_page", &page)
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

/// DELETE /projects/{project}/wiki/{title}.json
pub async fn delete_wiki_page(
    State(state): State<SharedState>,
    Path((project, title)): Path<(String, String)>,
) -> Response {
    let Some(title) = strip_json(&title).map(str::to_string) else {
        return not_found();
    };
    let mut state = state.write().await;
    let Some(project_id) = state.find_project(&project).map(|p| p.id) else {
        return not_found();
    };
    match state.wiki_pages.remove(&(project_id, title)) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(),
    }
}

fn with_includes(page: &WikiPage, show: &IncludeParams) -> WikiPage {
    let mut page = page.clone();
    if !show.includes("attachments") {
        page.attachments.clear();
    }
    page
}
