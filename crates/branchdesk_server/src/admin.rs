//! Server-rendered branches admin page.
//!
//! The page works with plain links and form posts: list state travels in
//! the query string (`key`, `limit`, `selected`, `mode`) and every request
//! replays it through [`BranchesPage`] before rendering.

use crate::errors::{AppError, AppResult};
use crate::handlers::parse_branch_id;
use crate::page::{page_href, render_branches_page, PageView, PAGE_PATH};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use branchdesk_core::{
    BranchDraft, BranchId, BranchService, BranchServiceError, BranchesPage, CategoryId,
    CategoryRepository, SqliteBranchRepository, SqliteCategoryRepository, FILTER_LIMIT_MAX,
    FILTER_PAGE_SIZE,
};
use log::info;
use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub key: String,
    pub limit: Option<u32>,
    pub selected: Option<BranchId>,
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub id_service_categories: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub branch_id: String,
}

enum SaveOutcome {
    Saved(BranchId),
    Rejected(Box<PageView>),
}

pub async fn branches_page(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<Html<String>> {
    let Query(query) = query?;
    let base_url = state.base_url().to_string();
    let view = state
        .with_conn(move |conn| {
            let mut view = load_view(conn, &base_url, &query.key, query.limit)?;
            if let Some(id) = query.selected {
                show_selected(conn, &mut view.page, id)?;
            }
            match query.mode.as_deref() {
                Some("add") => view.page.add(),
                Some("edit") => {
                    view.page.edit();
                }
                _ => {}
            }
            Ok(view)
        })
        .await?;

    Ok(Html(render_branches_page(&view)))
}

/// Saves the details form; redirects to the saved record or re-renders the
/// form with the rejection message.
pub async fn save_branch_form(
    State(state): State<AppState>,
    form: Result<Form<DetailsForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = form?;
    let id = parse_optional_id(&form.id)?;
    let category_id = parse_optional_category(&form.id_service_categories)?;
    let base_url = state.base_url().to_string();

    let outcome = state
        .with_conn(move |conn| {
            let mut view = load_view(conn, &base_url, "", None)?;
            match id {
                Some(id) => {
                    show_selected(conn, &mut view.page, id)?;
                    if !view.page.edit() {
                        return Err(AppError::not_found(format!("branch not found: {id}")));
                    }
                }
                None => view.page.add(),
            }
            view.page.edit_form(|fields| {
                fields.name = form.name;
                fields.location = form.location;
                fields.category_id = category_id;
            });

            let Some(draft) = view.page.save() else {
                return Ok(SaveOutcome::Rejected(Box::new(view)));
            };
            save_draft(conn, &draft, view)
        })
        .await?;

    match outcome {
        SaveOutcome::Saved(id) => {
            Ok(Redirect::to(&page_href("", FILTER_PAGE_SIZE, Some(id), None)).into_response())
        }
        SaveOutcome::Rejected(view) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(render_branches_page(&view)),
        )
            .into_response()),
    }
}

pub async fn delete_branch_form(
    State(state): State<AppState>,
    form: Result<Form<DeleteForm>, FormRejection>,
) -> AppResult<Redirect> {
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
    info!("event=page_delete module=server status=ok branch_id={id}");
    Ok(Redirect::to(PAGE_PATH))
}

fn save_draft(conn: &Connection, draft: &BranchDraft, mut view: PageView) -> AppResult<SaveOutcome> {
    let service = BranchService::new(SqliteBranchRepository::try_new(conn)?);
    match service.save_branch(draft) {
        Ok(saved) => Ok(SaveOutcome::Saved(saved.id)),
        Err(BranchServiceError::Invalid(err)) => {
            view.page.on_validation_failed(&err);
            Ok(SaveOutcome::Rejected(Box::new(view)))
        }
        Err(other) => Err(other.into()),
    }
}

/// Replays filter state through the page model and loads the rows.
fn load_view(
    conn: &Connection,
    base_url: &str,
    key: &str,
    limit: Option<u32>,
) -> AppResult<PageView> {
    let service = BranchService::new(SqliteBranchRepository::try_new(conn)?);
    let categories = SqliteCategoryRepository::try_new(conn)?.list_categories()?;

    let mut page = BranchesPage::new(base_url);
    let mut request = page.initialize();
    if !key.is_empty() {
        request = page.submit_filter(key);
    }
    let target = limit.unwrap_or(FILTER_PAGE_SIZE).min(FILTER_LIMIT_MAX);
    while request.limit < target {
        request = page.load_more();
    }

    let result = service.filter_branches(&request.key, Some(request.limit))?;
    page.apply_filter_response(&request, result.items);

    Ok(PageView {
        page,
        branches: service.list_branches()?,
        categories,
        base_url: base_url.to_string(),
    })
}

/// Shows `id` whether or not it is among the loaded rows.
fn show_selected(conn: &Connection, page: &mut BranchesPage, id: BranchId) -> AppResult<()> {
    if page.click_row(id) {
        return Ok(());
    }
    let service = BranchService::new(SqliteBranchRepository::try_new(conn)?);
    if let Some(branch) = service.get_branch(id)? {
        page.show_record(&branch);
    }
    Ok(())
}

fn parse_optional_id(raw: &str) -> AppResult<Option<BranchId>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_branch_id(trimmed).map(Some)
}

fn parse_optional_category(raw: &str) -> AppResult<Option<CategoryId>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    trimmed
        .parse::<CategoryId>()
        .map(Some)
        .map_err(|_| AppError::bad_request(format!("invalid category id `{trimmed}`")))
}
