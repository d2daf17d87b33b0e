use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use branchdesk_core::db::open_db_in_memory;
use branchdesk_core::{BranchDraft, BranchService, SqliteBranchRepository};
use branchdesk_server::{create_app, AppState};
use rusqlite::Connection;
use tower::ServiceExt;

fn seeded_conn(rows: &[(&str, &str)]) -> Connection {
    let conn = open_db_in_memory().unwrap();
    {
        let service = BranchService::new(SqliteBranchRepository::try_new(&conn).unwrap());
        for (name, location) in rows {
            service
                .save_branch(&BranchDraft::new(*name, *location))
                .unwrap();
        }
    }
    conn
}

fn app_with(rows: &[(&str, &str)]) -> Router {
    create_app(AppState::new(seeded_conn(rows), "http://localhost:8080"))
}

async fn get_html(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_text(response).await)
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn page_lists_rows_and_embeds_global_variables() {
    let app = app_with(&[("Harbor", "Pier 4"), ("Mill", "Dam 1")]);
    let (status, html) = get_html(&app, "/index.php/backend/branches").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("var GlobalVariables = {"));
    assert!(html.contains("\"baseUrl\":\"http://localhost:8080\""));
    assert_eq!(html.matches("class=\"branch-row entry").count(), 2);
    assert!(!html.contains("load-more"));
    assert!(html.contains("id=\"edit-branch\" class=\"btn btn-outline-secondary\" disabled"));
}

#[tokio::test]
async fn empty_store_shows_no_records() {
    let app = app_with(&[]);
    let (_, html) = get_html(&app, "/index.php/backend/branches").await;
    assert!(html.contains("No records found."));
}

#[tokio::test]
async fn full_page_renders_load_more_link_with_next_limit() {
    let rows: Vec<(String, String)> = (0..20)
        .map(|idx| (format!("branch {idx:02}"), "somewhere".to_string()))
        .collect();
    let refs: Vec<(&str, &str)> = rows
        .iter()
        .map(|(name, location)| (name.as_str(), location.as_str()))
        .collect();
    let app = app_with(&refs);

    let (_, html) = get_html(&app, "/index.php/backend/branches").await;
    assert!(html.contains("load-more"));
    assert!(html.contains("/index.php/backend/branches?limit=40"));
}

#[tokio::test]
async fn selected_row_is_displayed_with_link_and_actions() {
    let app = app_with(&[("Harbor", "Pier 4")]);
    let (_, html) = get_html(&app, "/index.php/backend/branches?selected=1").await;

    assert!(html.contains("branch-row entry selected"));
    assert!(html.contains("value=\"Harbor\" disabled"));
    assert!(html.contains("http://localhost:8080/index.php?branch=1"));
    assert!(html.contains("action=\"/index.php/backend/branches/delete\""));
}

#[tokio::test]
async fn filter_key_narrows_rendered_rows() {
    let app = app_with(&[("Harbor", "Pier 4"), ("Mill", "Dam 1")]);
    let (_, html) = get_html(&app, "/index.php/backend/branches?key=dam").await;

    assert_eq!(html.matches("class=\"branch-row entry").count(), 1);
    assert!(html.contains("<strong>Mill</strong>"));
    assert!(html.contains("name=\"key\" class=\"key form-control\" value=\"dam\""));
}

#[tokio::test]
async fn add_mode_enables_form_with_defaults() {
    let app = app_with(&[]);
    let (_, html) = get_html(&app, "/index.php/backend/branches?mode=add").await;

    assert!(html.contains("id=\"save-branch\""));
    assert!(html.contains("name=\"name\" class=\"form-control required\" maxlength=\"128\" value=\"branch\">"));
}

#[tokio::test]
async fn posting_details_form_saves_and_redirects_to_record() {
    let app = app_with(&[]);
    let response = app
        .clone()
        .oneshot(form_post(
            "/index.php/backend/branches",
            "id=&name=Harbor&location=Pier+4&id_service_categories=null",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/index.php/backend/branches?selected=1"
    );

    let (_, html) = get_html(&app, "/index.php/backend/branches?selected=1").await;
    assert!(html.contains("value=\"Pier 4\""));
}

#[tokio::test]
async fn posting_invalid_details_form_rerenders_with_message() {
    let app = app_with(&[("Harbor", "Pier 4")]);

    let response = app
        .clone()
        .oneshot(form_post(
            "/index.php/backend/branches",
            "id=1&name=Harbor&location=&id_service_categories=null",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("form-message alert alert-danger"));
    assert!(html.contains("branch location is required"));
    assert!(html.contains("id=\"save-branch\""));

    let response = app
        .clone()
        .oneshot(form_post(
            "/index.php/backend/branches",
            "id=&name=&location=x",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Fields with * are required."));
    assert!(html.contains("form-group has-error"));
}

#[tokio::test]
async fn delete_form_removes_row_and_redirects() {
    let app = app_with(&[("Harbor", "Pier 4")]);
    let response = app
        .clone()
        .oneshot(form_post("/index.php/backend/branches/delete", "branch_id=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (_, html) = get_html(&app, "/index.php/backend/branches").await;
    assert!(html.contains("No records found."));
}

#[tokio::test]
async fn server_rejected_location_flags_the_location_group() {
    let app = app_with(&[]);
    let response = app
        .clone()
        .oneshot(form_post(
            "/index.php/backend/branches",
            "id=&name=Harbor&location=&id_service_categories=null",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = body_text(response).await;
    assert!(html.contains("branch location is required"));
    assert!(html.contains(
        "<div class=\"form-group has-error\">\n<label for=\"branch-location\">"
    ));
    assert!(html.contains("<div class=\"form-group\">\n<label for=\"branch-name\">"));
}

#[tokio::test]
async fn load_more_link_disappears_at_the_limit_cap() {
    let rows: Vec<(String, String)> = (0..500)
        .map(|idx| (format!("branch {idx:03}"), "somewhere".to_string()))
        .collect();
    let refs: Vec<(&str, &str)> = rows
        .iter()
        .map(|(name, location)| (name.as_str(), location.as_str()))
        .collect();
    let app = app_with(&refs);

    let (status, html) = get_html(&app, "/index.php/backend/branches?limit=480").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("/index.php/backend/branches?limit=500"));

    let (_, html) = get_html(&app, "/index.php/backend/branches?limit=500").await;
    assert_eq!(html.matches("class=\"branch-row entry").count(), 500);
    assert!(!html.contains("load-more"));

    let (_, html) = get_html(&app, "/index.php/backend/branches?limit=520").await;
    assert!(!html.contains("load-more"));
    assert!(!html.contains("limit=520"));
}
