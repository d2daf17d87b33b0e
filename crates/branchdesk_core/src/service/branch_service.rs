//! Branch use-case service.
//!
//! # Responsibility
//! - Normalize write input before it reaches the repository.
//! - Read saved rows back so callers always see persisted state.
//! - Apply the filter contract: cleaned key, bounded limit, name order.
//!
//! # Invariants
//! - Filter results are ordered by name ascending, then id.
//! - The applied filter limit is always in `1..=FILTER_LIMIT_MAX`.

use crate::model::branch::{Branch, BranchDraft, BranchId, BranchValidationError};
use crate::repo::branch_repo::{
    AvailableBranch, BranchBatchQuery, BranchOrder, BranchRepository, RepoError, RepoResult,
};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rows returned when the caller does not ask for a specific count.
pub const FILTER_DEFAULT_LIMIT: u32 = 20;
/// Upper bound on rows returned by one filter call.
pub const FILTER_LIMIT_MAX: u32 = 500;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Service error for branch use cases.
#[derive(Debug)]
pub enum BranchServiceError {
    /// Input failed field or reference validation.
    Invalid(BranchValidationError),
    /// Target branch does not exist.
    BranchNotFound(BranchId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back disagreed.
    InconsistentState(&'static str),
}

impl Display for BranchServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::BranchNotFound(id) => write!(f, "branch not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent branch state: {details}"),
        }
    }
}

impl Error for BranchServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BranchServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::BranchNotFound(id),
            RepoError::Validation(err) => Self::Invalid(err),
            other => Self::Repo(other),
        }
    }
}

/// Filter result envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
    /// Matches ordered by name ascending, then id.
    pub items: Vec<Branch>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// Branch service facade over a repository implementation.
pub struct BranchService<R: BranchRepository> {
    repo: R,
}

impl<R: BranchRepository> BranchService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts or updates a branch and returns the stored row.
    pub fn save_branch(&self, draft: &BranchDraft) -> Result<Branch, BranchServiceError> {
        let draft = draft.trimmed();
        let mode = if draft.id.is_some() { "update" } else { "insert" };
        let id = match self.repo.add(&draft) {
            Ok(id) => id,
            Err(err) => {
                warn!("event=branch_save module=service status=error mode={mode} error={err}");
                return Err(err.into());
            }
        };
        info!("event=branch_save module=service status=ok mode={mode} branch_id={id}");

        self.repo
            .get_row(id)?
            .ok_or(BranchServiceError::InconsistentState(
                "saved branch not found in read-back",
            ))
    }

    /// Deletes a branch. Returns `false` when it did not exist.
    pub fn delete_branch(&self, id: BranchId) -> Result<bool, BranchServiceError> {
        let deleted = self.repo.delete(id)?;
        info!("event=branch_delete module=service status=ok branch_id={id} deleted={deleted}");
        Ok(deleted)
    }

    pub fn get_branch(&self, id: BranchId) -> RepoResult<Option<Branch>> {
        self.repo.get_row(id)
    }

    /// Searches name and location for `key`, returning at most the
    /// normalized `limit` rows.
    pub fn filter_branches(
        &self,
        key: &str,
        limit: Option<u32>,
    ) -> Result<FilterResult, BranchServiceError> {
        let key = normalize_filter_key(key);
        let applied_limit = normalize_filter_limit(limit);
        let items = self.repo.filter(key.as_str(), applied_limit)?;
        debug!(
            "event=branch_filter module=service status=ok key_len={} limit={} hits={}",
            key.chars().count(),
            applied_limit,
            items.len()
        );
        Ok(FilterResult {
            items,
            applied_limit,
        })
    }

    /// Every branch, ordered by name.
    pub fn list_branches(&self) -> RepoResult<Vec<Branch>> {
        self.repo.get_batch(&BranchBatchQuery {
            order: BranchOrder::NameAsc,
            ..BranchBatchQuery::default()
        })
    }

    /// Branches that offer at least one service.
    pub fn available_branches(&self) -> RepoResult<Vec<AvailableBranch>> {
        self.repo.get_available_branches()
    }
}

/// Normalizes a filter limit according to the filter contract.
pub fn normalize_filter_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => FILTER_DEFAULT_LIMIT,
        Some(value) if value > FILTER_LIMIT_MAX => FILTER_LIMIT_MAX,
        Some(value) => value,
    }
}

/// Trims the key and collapses inner whitespace runs to one space.
pub fn normalize_filter_key(key: &str) -> String {
    WHITESPACE_RE.replace_all(key.trim(), " ").into_owned()
}
