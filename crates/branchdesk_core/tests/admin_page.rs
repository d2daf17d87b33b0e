use branchdesk_core::{
    Branch, BranchesPage, FormField, PageMode, ResultsView, FILTER_LIMIT_MAX, FILTER_PAGE_SIZE,
};

fn branch(id: i64, name: &str, location: &str) -> Branch {
    Branch {
        id,
        name: name.to_string(),
        location: location.to_string(),
        category_id: None,
    }
}

fn rows(count: i64) -> Vec<Branch> {
    (1..=count)
        .map(|id| branch(id, &format!("branch {id}"), "somewhere"))
        .collect()
}

fn loaded_page(results: Vec<Branch>) -> BranchesPage {
    let mut page = BranchesPage::new("http://localhost:8080");
    let request = page.initialize();
    assert!(page.apply_filter_response(&request, results));
    page
}

#[test]
fn initialize_requests_first_unfiltered_page() {
    let mut page = BranchesPage::new("http://localhost:8080");
    let request = page.initialize();
    assert_eq!(request.key, "");
    assert_eq!(request.limit, FILTER_PAGE_SIZE);
    assert_eq!(request.select_id, None);
    assert_eq!(page.mode(), PageMode::View);
    assert!(!page.form_enabled());
}

#[test]
fn empty_response_shows_no_records() {
    let page = loaded_page(Vec::new());
    assert_eq!(page.results_view(), ResultsView::NoRecords);
}

#[test]
fn full_page_offers_load_more_which_grows_the_limit() {
    let mut page = loaded_page(rows(20));
    match page.results_view() {
        ResultsView::Rows { rows, load_more } => {
            assert_eq!(rows.len(), 20);
            assert!(load_more);
        }
        other => panic!("unexpected view: {other:?}"),
    }

    let next = page.load_more();
    assert_eq!(next.limit, 40);
    assert_eq!(next.key, "");

    page.apply_filter_response(&next, rows(27));
    match page.results_view() {
        ResultsView::Rows { load_more, .. } => assert!(!load_more),
        other => panic!("unexpected view: {other:?}"),
    }
}

#[test]
fn clicking_row_displays_record_and_enables_actions() {
    let mut page = loaded_page(vec![branch(3, "Harbor", "Pier 4")]);
    assert!(!page.can_edit());

    assert!(page.click_row(3));
    assert_eq!(page.selected_id(), Some(3));
    assert_eq!(page.form().name, "Harbor");
    assert_eq!(page.form().location, "Pier 4");
    assert!(page.can_edit());
    assert!(page.can_delete());
    assert_eq!(
        page.details_link(),
        Some("http://localhost:8080/index.php?branch=3")
    );
}

#[test]
fn row_clicks_are_ignored_while_editing() {
    let mut page = loaded_page(vec![branch(3, "Harbor", "Pier 4"), branch(4, "Mill", "Dam 1")]);
    page.click_row(3);
    assert!(page.edit());
    assert!(page.results_dimmed());
    assert!(!page.filter_enabled());

    assert!(!page.click_row(4));
    assert_eq!(page.form().id, Some(3));
}

#[test]
fn add_then_save_returns_insert_draft_with_defaults() {
    let mut page = loaded_page(Vec::new());
    page.add();
    assert_eq!(page.mode(), PageMode::Add);
    assert_eq!(page.form().name, "branch");
    assert!(page.form().location.is_empty());

    page.edit_form(|form| form.location = "Quay 2".to_string());
    let draft = page.save().unwrap();
    assert_eq!(draft.id, None);
    assert_eq!(draft.name, "branch");
    assert_eq!(draft.location, "Quay 2");
}

#[test]
fn save_with_missing_name_flags_field_and_keeps_mode() {
    let mut page = loaded_page(Vec::new());
    page.add();
    page.edit_form(|form| form.name = "  ".to_string());

    assert!(page.save().is_none());
    assert_eq!(page.invalid_fields(), [FormField::Name]);
    assert!(page.form_message().is_some());
    assert_eq!(page.mode(), PageMode::Add);
}

#[test]
fn edit_save_carries_record_id() {
    let mut page = loaded_page(vec![branch(3, "Harbor", "Pier 4")]);
    page.click_row(3);
    page.edit();
    page.edit_form(|form| form.name = "Harbor East".to_string());

    let draft = page.save().unwrap();
    assert_eq!(draft.id, Some(3));
    assert_eq!(draft.name, "Harbor East");
}

#[test]
fn cancel_restores_the_edited_record_from_results() {
    let mut page = loaded_page(vec![branch(3, "Harbor", "Pier 4")]);
    page.click_row(3);
    page.edit();
    page.edit_form(|form| form.name = "scratch".to_string());

    page.cancel();
    assert_eq!(page.mode(), PageMode::View);
    assert_eq!(page.form().name, "Harbor");
    assert_eq!(page.selected_id(), Some(3));
    assert!(page.can_edit());
}

#[test]
fn cancel_while_adding_leaves_empty_form() {
    let mut page = loaded_page(vec![branch(3, "Harbor", "Pier 4")]);
    page.add();
    page.cancel();
    assert_eq!(page.mode(), PageMode::View);
    assert_eq!(page.form().id, None);
    assert_eq!(page.selected_id(), None);
}

#[test]
fn on_saved_clears_key_and_selects_saved_row() {
    let mut page = BranchesPage::new("");
    let request = page.submit_filter("harb");
    page.apply_filter_response(&request, vec![branch(3, "Harbor", "Pier 4")]);
    page.add();
    page.save().unwrap();

    let reload = page.on_saved(9);
    assert_eq!(reload.key, "");
    assert_eq!(reload.select_id, Some(9));
    assert!(reload.display);
    assert!(page.take_notification().is_some());

    page.apply_filter_response(
        &reload,
        vec![branch(3, "Harbor", "Pier 4"), branch(9, "branch", "Quay 2")],
    );
    assert_eq!(page.selected_id(), Some(9));
    assert_eq!(page.form().location, "Quay 2");
    assert!(page.can_delete());
}

#[test]
fn delete_flow_reloads_with_current_key() {
    let mut page = BranchesPage::new("");
    let request = page.submit_filter("pier");
    page.apply_filter_response(&request, vec![branch(3, "Harbor", "Pier 4")]);
    assert_eq!(page.request_delete(), None);

    page.click_row(3);
    assert_eq!(page.request_delete(), Some(3));

    let reload = page.on_deleted();
    assert_eq!(reload.key, "pier");
    assert_eq!(page.form().id, None);
    assert!(!page.can_delete());
}

#[test]
fn stale_responses_are_dropped() {
    let mut page = BranchesPage::new("");
    let old = page.submit_filter("old");
    let _current = page.submit_filter("new");

    assert!(!page.apply_filter_response(&old, rows(3)));
    assert!(page.filter_results().is_empty());
}

#[test]
fn clear_filter_resets_key_and_form() {
    let mut page = BranchesPage::new("");
    let request = page.submit_filter("pier");
    page.apply_filter_response(&request, vec![branch(3, "Harbor", "Pier 4")]);
    page.click_row(3);

    let cleared = page.clear_filter();
    assert_eq!(cleared.key, "");
    assert_eq!(page.filter_key(), "");
    assert_eq!(page.form().id, None);
}

#[test]
fn load_more_stops_at_the_filter_limit_cap() {
    let mut page = loaded_page(rows(20));
    let mut request = page.load_more();
    while request.limit < FILTER_LIMIT_MAX {
        request = page.load_more();
    }
    assert_eq!(request.limit, FILTER_LIMIT_MAX);
    assert_eq!(page.load_more().limit, FILTER_LIMIT_MAX);

    let request = page.load_more();
    assert!(page.apply_filter_response(&request, rows(i64::from(FILTER_LIMIT_MAX))));
    match page.results_view() {
        ResultsView::Rows { rows, load_more } => {
            assert_eq!(rows.len(), FILTER_LIMIT_MAX as usize);
            assert!(!load_more);
        }
        other => panic!("unexpected view: {other:?}"),
    }
}
