//! State machine behind the branches admin page.
//!
//! The page moves between three modes:
//!
//! ```text
//!   View --add()--> Add  --save()/cancel()--> View
//!   View --edit()--> Edit --save()/cancel()--> View
//! ```
//!
//! In `Add`/`Edit` the filter controls are disabled and row clicks are
//! ignored. Filtering is paged with a "load more" pattern: the limit starts
//! at [`FILTER_PAGE_SIZE`] and grows by the same amount each time a full
//! page comes back, up to [`FILTER_LIMIT_MAX`].

use crate::model::branch::{Branch, BranchDraft, BranchId, BranchValidationError, CategoryId};
use crate::service::branch_service::FILTER_LIMIT_MAX;

/// Initial filter limit and load-more increment.
pub const FILTER_PAGE_SIZE: u32 = 20;

const DEFAULT_NEW_BRANCH_NAME: &str = "branch";
const REQUIRED_FIELDS_MESSAGE: &str = "Fields with * are required.";
const SAVED_NOTIFICATION: &str = "Branch saved successfully.";
const DELETED_NOTIFICATION: &str = "Branch deleted successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    View,
    Edit,
    Add,
}

/// Detail form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchForm {
    pub id: Option<BranchId>,
    pub name: String,
    pub location: String,
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Location,
}

/// Filter call the caller must perform; hand it back with the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    pub key: String,
    pub limit: u32,
    /// Row to select once the response is applied.
    pub select_id: Option<BranchId>,
    /// Whether the selected row is also shown in the form.
    pub display: bool,
}

/// One entry of the filter result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRow {
    pub id: BranchId,
    pub title: String,
    pub info: String,
    pub selected: bool,
}

/// What the result pane shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    NoRecords,
    Rows {
        rows: Vec<FilterRow>,
        /// A full page came back below the limit cap, so more rows may exist.
        load_more: bool,
    },
}

#[derive(Debug, Clone)]
pub struct BranchesPage {
    base_url: String,
    filter_key: String,
    filter_limit: u32,
    filter_results: Vec<Branch>,
    last_request: Option<FilterRequest>,
    selected_id: Option<BranchId>,
    mode: PageMode,
    form: BranchForm,
    actions_enabled: bool,
    details_link: Option<String>,
    invalid_fields: Vec<FormField>,
    form_message: Option<String>,
    notification: Option<String>,
}

impl BranchesPage {
    /// Creates a page in `View` mode with an empty form.
    ///
    /// `base_url` prefixes dedicated branch links; a trailing `/` is dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            filter_key: String::new(),
            filter_limit: FILTER_PAGE_SIZE,
            filter_results: Vec::new(),
            last_request: None,
            selected_id: None,
            mode: PageMode::View,
            form: BranchForm::default(),
            actions_enabled: false,
            details_link: None,
            invalid_fields: Vec::new(),
            form_message: None,
            notification: None,
        }
    }

    /// Resets the form and asks for the unfiltered first page.
    pub fn initialize(&mut self) -> FilterRequest {
        self.reset_form();
        self.filter("", None, false)
    }

    pub fn mode(&self) -> PageMode {
        self.mode
    }

    pub fn form(&self) -> &BranchForm {
        &self.form
    }

    /// Form inputs are editable only while adding or editing.
    pub fn form_enabled(&self) -> bool {
        self.mode != PageMode::View
    }

    pub fn filter_key(&self) -> &str {
        &self.filter_key
    }

    pub fn filter_limit(&self) -> u32 {
        self.filter_limit
    }

    pub fn filter_results(&self) -> &[Branch] {
        &self.filter_results
    }

    pub fn selected_id(&self) -> Option<BranchId> {
        self.selected_id
    }

    /// Filter and clear buttons are disabled while adding or editing.
    pub fn filter_enabled(&self) -> bool {
        self.mode == PageMode::View
    }

    /// The result list is dimmed while the form is being edited.
    pub fn results_dimmed(&self) -> bool {
        self.mode != PageMode::View
    }

    pub fn can_edit(&self) -> bool {
        self.mode == PageMode::View && self.actions_enabled
    }

    pub fn can_delete(&self) -> bool {
        self.can_edit()
    }

    /// Dedicated booking link of the clicked branch.
    pub fn details_link(&self) -> Option<&str> {
        self.details_link.as_deref()
    }

    pub fn invalid_fields(&self) -> &[FormField] {
        &self.invalid_fields
    }

    pub fn form_message(&self) -> Option<&str> {
        self.form_message.as_deref()
    }

    /// Takes the pending user notification, if any.
    pub fn take_notification(&mut self) -> Option<String> {
        self.notification.take()
    }

    /// Updates form inputs while in `Add`/`Edit`. Ignored in `View`.
    pub fn edit_form(&mut self, update: impl FnOnce(&mut BranchForm)) {
        if self.form_enabled() {
            update(&mut self.form);
        }
    }

    /// Filter form submitted with `key`.
    pub fn submit_filter(&mut self, key: &str) -> FilterRequest {
        self.selected_id = None;
        self.reset_form();
        self.filter(key, None, false)
    }

    /// Clear button: empties the key and reloads the first page.
    pub fn clear_filter(&mut self) -> FilterRequest {
        let request = self.filter("", None, false);
        self.reset_form();
        request
    }

    /// Records `key` and builds the filter call for the current limit.
    pub fn filter(&mut self, key: &str, select_id: Option<BranchId>, display: bool) -> FilterRequest {
        self.filter_key = key.to_string();
        let request = FilterRequest {
            key: self.filter_key.clone(),
            limit: self.filter_limit,
            select_id,
            display,
        };
        self.last_request = Some(request.clone());
        request
    }

    /// Grows the limit by one page, never past [`FILTER_LIMIT_MAX`], and
    /// repeats the last filter call.
    pub fn load_more(&mut self) -> FilterRequest {
        self.filter_limit = (self.filter_limit + FILTER_PAGE_SIZE).min(FILTER_LIMIT_MAX);
        let (select_id, display) = self
            .last_request
            .as_ref()
            .map_or((None, false), |last| (last.select_id, last.display));
        let key = self.filter_key.clone();
        self.filter(&key, select_id, display)
    }

    /// Stores the rows returned for `request` and applies its selection.
    ///
    /// Responses for a key other than the current one are stale and dropped;
    /// returns whether the response was applied.
    pub fn apply_filter_response(&mut self, request: &FilterRequest, rows: Vec<Branch>) -> bool {
        if request.key != self.filter_key {
            return false;
        }
        self.filter_results = rows;
        if let Some(id) = request.select_id {
            self.select(id, request.display);
        }
        true
    }

    /// Renders the result pane from the latest rows.
    pub fn results_view(&self) -> ResultsView {
        if self.filter_results.is_empty() {
            return ResultsView::NoRecords;
        }
        let rows = self
            .filter_results
            .iter()
            .map(|branch| FilterRow {
                id: branch.id,
                title: branch.name.clone(),
                info: branch.location.clone(),
                selected: self.selected_id == Some(branch.id),
            })
            .collect::<Vec<_>>();
        let load_more =
            self.filter_limit < FILTER_LIMIT_MAX && rows.len() == self.filter_limit as usize;
        ResultsView::Rows { rows, load_more }
    }

    /// Result row clicked. Ignored while adding or editing.
    pub fn click_row(&mut self, id: BranchId) -> bool {
        if self.mode != PageMode::View {
            return false;
        }
        let Some(branch) = self.find_result(id).cloned() else {
            return false;
        };
        self.show_record(&branch);
        true
    }

    /// Shows `branch` as the current record, as a row click would, even when
    /// it is not part of the loaded results (deep links).
    pub fn show_record(&mut self, branch: &Branch) {
        self.reset_form();
        self.details_link = Some(format!("{}/index.php?branch={}", self.base_url, branch.id));
        self.display(branch);
        self.selected_id = Some(branch.id);
        self.actions_enabled = true;
    }

    /// Add button: empty form with defaults in `Add` mode.
    pub fn add(&mut self) {
        self.reset_form();
        self.mode = PageMode::Add;
        self.form.name = DEFAULT_NEW_BRANCH_NAME.to_string();
        self.form.location = String::new();
    }

    /// Edit button: unlocks the displayed record.
    pub fn edit(&mut self) -> bool {
        if !self.can_edit() || self.form.id.is_none() {
            return false;
        }
        self.mode = PageMode::Edit;
        true
    }

    /// Cancel button: drops pending changes and re-shows the edited record.
    pub fn cancel(&mut self) {
        let id = self.form.id;
        self.reset_form();
        if let Some(id) = id {
            self.select(id, true);
        }
    }

    /// Save button: validates the form and returns the draft to post.
    ///
    /// Returns `None` (and sets the form message) when validation fails or
    /// the page is not in `Add`/`Edit`.
    pub fn save(&mut self) -> Option<BranchDraft> {
        if !self.form_enabled() || !self.validate() {
            return None;
        }
        Some(BranchDraft {
            id: self.form.id,
            name: self.form.name.clone(),
            location: self.form.location.clone(),
            category_id: self.form.category_id,
        })
    }

    /// Save succeeded: reload the unfiltered list and show the saved row.
    pub fn on_saved(&mut self, id: BranchId) -> FilterRequest {
        self.notification = Some(SAVED_NOTIFICATION.to_string());
        self.reset_form();
        self.filter("", Some(id), true)
    }

    /// Save rejected by the server: stay in edit mode and show why.
    pub fn on_save_failed(&mut self, message: impl Into<String>) {
        self.form_message = Some(message.into());
    }

    /// Save rejected by server-side validation: show the message and flag
    /// the field it names.
    pub fn on_validation_failed(&mut self, err: &BranchValidationError) {
        self.invalid_fields.clear();
        match err {
            BranchValidationError::MissingName => self.invalid_fields.push(FormField::Name),
            BranchValidationError::MissingLocation => {
                self.invalid_fields.push(FormField::Location)
            }
            BranchValidationError::UnknownCategory(_) => {}
        }
        self.on_save_failed(err.to_string());
    }

    /// Delete button: id of the displayed record to delete.
    pub fn request_delete(&self) -> Option<BranchId> {
        if self.can_delete() {
            self.form.id
        } else {
            None
        }
    }

    /// Delete succeeded: reload the list with the current key.
    pub fn on_deleted(&mut self) -> FilterRequest {
        self.notification = Some(DELETED_NOTIFICATION.to_string());
        self.reset_form();
        let key = self.filter_key.clone();
        self.filter(&key, None, false)
    }

    /// Checks required inputs and flags the failing ones.
    pub fn validate(&mut self) -> bool {
        self.invalid_fields.clear();
        self.form_message = None;

        if self.form.name.trim().is_empty() {
            self.invalid_fields.push(FormField::Name);
        }

        if self.invalid_fields.is_empty() {
            true
        } else {
            self.form_message = Some(REQUIRED_FIELDS_MESSAGE.to_string());
            false
        }
    }

    /// Returns the page to `View` with an empty, locked form.
    pub fn reset_form(&mut self) {
        self.selected_id = None;
        self.mode = PageMode::View;
        self.form = BranchForm::default();
        self.details_link = None;
        self.actions_enabled = false;
        self.invalid_fields.clear();
        self.form_message = None;
    }

    /// Marks row `id` selected; with `display` also fills the form.
    ///
    /// Ids missing from the current results select nothing.
    pub fn select(&mut self, id: BranchId, display: bool) {
        let Some(branch) = self.find_result(id).cloned() else {
            self.selected_id = None;
            return;
        };
        self.selected_id = Some(branch.id);
        if display {
            self.display(&branch);
            self.actions_enabled = true;
        }
    }

    /// Copies `branch` into the form.
    pub fn display(&mut self, branch: &Branch) {
        self.form = BranchForm {
            id: Some(branch.id),
            name: branch.name.clone(),
            location: branch.location.clone(),
            category_id: branch.category_id,
        };
    }

    fn find_result(&self, id: BranchId) -> Option<&Branch> {
        self.filter_results.iter().find(|branch| branch.id == id)
    }
}
