//! Core domain logic for Branchdesk branch management.
//! This crate owns branch validation, persistence and admin page behaviour.

pub mod admin;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use admin::branches_page::{
    BranchForm, BranchesPage, FilterRequest, FilterRow, FormField, PageMode, ResultsView,
    FILTER_PAGE_SIZE,
};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget};
pub use model::branch::{Branch, BranchDraft, BranchId, BranchValidationError, CategoryId};
pub use repo::branch_repo::{
    AvailableBranch, BranchBatchQuery, BranchFilter, BranchOrder, BranchRepository, BranchValue,
    RepoError, RepoResult, SqliteBranchRepository,
};
pub use repo::category_repo::{Category, CategoryRepository, SqliteCategoryRepository};
pub use repo::service_repo::{ServiceId, SqliteServiceRepository};
pub use service::branch_service::{
    BranchService, BranchServiceError, FilterResult, FILTER_DEFAULT_LIMIT, FILTER_LIMIT_MAX,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
