//! AJAX endpoints called by the branches admin page.
//!
//! All endpoints take `application/x-www-form-urlencoded` POST bodies, the
//! way the admin page submits them. The `csrfToken` field is accepted and
//! left to the hosting application.

use crate::errors::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::FormRejection, State},
    Form, Json,
};
use branchdesk_core::{
    Branch, BranchDraft, BranchId, BranchService, SqliteBranchRepository,
};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const AJAX_SUCCESS: &str = "SUCCESS";

#[derive(Debug, Deserialize)]
pub struct SaveBranchForm {
    #[serde(rename = "csrfToken", default)]
    pub csrf_token: Option<String>,
    /// JSON-encoded branch record.
    pub branch: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteBranchForm {
    #[serde(rename = "csrfToken", default)]
    pub csrf_token: Option<String>,
    pub branch_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterBranchesForm {
    #[serde(rename = "csrfToken", default)]
    pub csrf_token: Option<String>,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveBranchResponse {
    pub status: String,
    pub id: BranchId,
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": branchdesk_core::core_version(),
    }))
}

/// Inserts or updates the posted branch and returns its id.
pub async fn ajax_save_branch(
    State(state): State<AppState>,
    form: Result<Form<SaveBranchForm>, FormRejection>,
) -> AppResult<Json<SaveBranchResponse>> {
    let Form(form) = form?;
    let draft: BranchDraft = serde_json::from_str(&form.branch)
        .map_err(|err| AppError::bad_request(format!("invalid branch payload: {err}")))?;

    let saved = state
        .with_conn(move |conn| {
            let service = BranchService::new(SqliteBranchRepository::try_new(conn)?);
            Ok(service.save_branch(&draft)?)
        })
        .await?;

    Ok(Json(SaveBranchResponse {
        status: AJAX_SUCCESS.to_string(),
        id: saved.id,
    }))
}

/// Deletes one branch by id.
pub async fn ajax_delete_branch(
    State(state): State<AppState>,
    form: Result<Form<DeleteBranchForm>, FormRejection>,
) -> AppResult<Json<Value>> {
    let Form(form) = form?;
    let id = parse_branch_id(&form.branch_id)?;

    let deleted = state
        .with_conn(move |conn| {
            let service = BranchService::new(SqliteBranchRepository::try_new(conn)?);
            Ok(service.delete_branch(id)?)
        })
        .await?;

    if !deleted {
        return Err(AppError::not_found(format!("branch not found: {id}")));
    }
    Ok(Json(json!({ "status": AJAX_SUCCESS })))
}

/// Returns branches whose name or location contains `key`, ordered by name.
pub async fn ajax_filter_branches(
    State(state): State<AppState>,
    form: Result<Form<FilterBranchesForm>, FormRejection>,
) -> AppResult<Json<Vec<Branch>>> {
    let Form(form) = form?;
    let limit = parse_limit(form.limit.as_deref())?;
    let key = form.key;

    let result = state
        .with_conn(move |conn| {
            let service = BranchService::new(SqliteBranchRepository::try_new(conn)?);
            Ok(service.filter_branches(&key, limit)?)
        })
        .await?;

    debug!(
        "event=ajax_filter module=server status=ok limit={} hits={}",
        result.applied_limit,
        result.items.len()
    );
    Ok(Json(result.items))
}

pub(crate) fn parse_branch_id(raw: &str) -> AppResult<BranchId> {
    raw.trim()
        .parse::<BranchId>()
        .map_err(|_| AppError::bad_request(format!("invalid branch id `{}`", raw.trim())))
}

fn parse_limit(raw: Option<&str>) -> AppResult<Option<u32>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| AppError::bad_request(format!("invalid limit `{value}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_branch_id, parse_limit};

    #[test]
    fn branch_id_must_be_numeric() {
        assert_eq!(parse_branch_id(" 12 ").unwrap(), 12);
        assert!(parse_branch_id("12abc").is_err());
        assert!(parse_branch_id("").is_err());
    }

    #[test]
    fn blank_limit_means_default() {
        assert_eq!(parse_limit(None).unwrap(), None);
        assert_eq!(parse_limit(Some(" ")).unwrap(), None);
        assert_eq!(parse_limit(Some("40")).unwrap(), Some(40));
        assert!(parse_limit(Some("-1")).is_err());
    }
}
