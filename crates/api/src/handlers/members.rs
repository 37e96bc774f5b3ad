//! Handlers for the opt-in membership registry.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::session::SessionUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptedInMembersResponse {
    pub member_ids: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptInResponse {
    pub success: bool,
    pub message: &'static str,
    pub membership_ids: Vec<String>,
}

/// GET /api/opted-in-members
pub async fn list_members(
    State(state): State<AppState>,
) -> AppResult<Json<OptedInMembersResponse>> {
    state.session_codec()?;

    let member_ids = state.opt_ins.list().await;
    Ok(Json(OptedInMembersResponse {
        count: member_ids.len(),
        member_ids,
    }))
}

/// POST /api/opted-in-members
///
/// Add every membership of the caller's session to the registry.
pub async fn opt_in(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
) -> AppResult<Json<OptInResponse>> {
    let membership_ids = session.membership_ids();
    if membership_ids.is_empty() {
        return Err(AppError::BadRequest(
            "No Destiny memberships found for user".into(),
        ));
    }

    let added = state.opt_ins.add_all(membership_ids.iter().cloned()).await;
    tracing::info!(
        user = %session.display_name,
        memberships = membership_ids.len(),
        added,
        "User opted in",
    );

    Ok(Json(OptInResponse {
        success: true,
        message: "Successfully opted in to data sharing",
        membership_ids,
    }))
}
