//! Router assembly.

use crate::state::AppState;
use crate::{admin, handlers, page};
use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use log::info;
use std::time::Instant;

pub const SAVE_BRANCH_PATH: &str = "/index.php/backend_api/ajax_save_branch";
pub const DELETE_BRANCH_PATH: &str = "/index.php/backend_api/ajax_delete_branch";
pub const FILTER_BRANCHES_PATH: &str = "/index.php/backend_api/ajax_filter_branches";

/// Builds the full application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            page::PAGE_PATH,
            get(admin::branches_page).post(admin::save_branch_form),
        )
        .route(page::DELETE_PATH, post(admin::delete_branch_form))
        .route(SAVE_BRANCH_PATH, post(handlers::ajax_save_branch))
        .route(DELETE_BRANCH_PATH, post(handlers::ajax_delete_branch))
        .route(FILTER_BRANCHES_PATH, post(handlers::ajax_filter_branches))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!(
        "event=http_request module=server method={method} path={path} status={} duration_ms={}",
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
