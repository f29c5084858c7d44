//! Handlers for the authenticated user's account.

use axum::{extract::State, http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Deserialize;

use super::{not_found, single};
use crate::mock_server::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct AccountEnvelope {
    pub user: AccountWrite,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountWrite {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub mail: Option<String>,
}

/// GET /my/account.json
pub async fn get_account(State(state): State<SharedState>) -> Response {
    let state = state.read().await;
    match state.account {
        Some(ref account) => single(StatusCode::OK, "user", account),
        None => not_found(),
    }
}

/// PUT /my/account.json
pub async fn update_account(
    State(state): State<SharedState>,
    Json(body): Json<AccountEnvelope>,
) -> Response {
    let mut state = state.write().await;
    let Some(account) = state.account.as_mut() else {
        return not_found();
    };
    let write = body.user;
    if let Some(firstname) = write.firstname {
        account.firstname = firstname;
    }
    if let Some(lastname) = write.lastname {
        account.lastname = lastname;
    }
    if let Some(mail) = write.mail {
        account.mail = Some(mail);
    }
    StatusCode::NO_CONTENT.into_response()
}
