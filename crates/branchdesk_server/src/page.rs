//! HTML rendering of the branches admin page.
//!
//! Rendering is a pure function of [`PageView`]; all behaviour (modes,
//! selection, load-more) lives in the core page state.

use branchdesk_core::{Branch, BranchesPage, Category, FormField, ResultsView, FILTER_PAGE_SIZE};
use serde_json::json;

pub const PAGE_PATH: &str = "/index.php/backend/branches";
pub const DELETE_PATH: &str = "/index.php/backend/branches/delete";

/// Everything needed to render the page once.
#[derive(Debug, Clone)]
pub struct PageView {
    pub page: BranchesPage,
    pub branches: Vec<Branch>,
    pub categories: Vec<Category>,
    pub base_url: String,
}

/// Links back to the page with the given list state.
pub fn page_href(key: &str, limit: u32, selected: Option<i64>, mode: Option<&str>) -> String {
    let mut params = Vec::new();
    if !key.is_empty() {
        params.push(format!("key={}", urlencoding::encode(key)));
    }
    if limit != FILTER_PAGE_SIZE {
        params.push(format!("limit={limit}"));
    }
    if let Some(id) = selected {
        params.push(format!("selected={id}"));
    }
    if let Some(mode) = mode {
        params.push(format!("mode={mode}"));
    }

    if params.is_empty() {
        PAGE_PATH.to_string()
    } else {
        format!("{PAGE_PATH}?{}", params.join("&"))
    }
}

pub fn render_branches_page(view: &PageView) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Branches</title>\n</head>\n<body>\n");
    html.push_str(&format!(
        "<script>\n    var GlobalVariables = {};\n</script>\n",
        global_variables_json(view)
    ));
    html.push_str("<div class=\"container-fluid backend-page\" id=\"branches-page\">\n");
    html.push_str("<div class=\"tab-pane active\" id=\"branches\">\n<div class=\"row\">\n");
    render_filter_pane(&mut html, &view.page);
    render_details_pane(&mut html, view);
    html.push_str("</div>\n</div>\n</div>\n</body>\n</html>\n");
    html
}

fn global_variables_json(view: &PageView) -> String {
    let value = json!({
        "baseUrl": view.base_url,
        "branches": view.branches,
        "categories": view.categories,
    });
    // A literal `</script>` inside a string would end the script element.
    value.to_string().replace("</", "<\\/")
}

fn render_filter_pane(html: &mut String, page: &BranchesPage) {
    let disabled = disabled_attr(!page.filter_enabled());
    html.push_str("<div id=\"filter-branches\" class=\"filter-records col col-12 col-md-5\">\n");
    html.push_str(&format!(
        "<form class=\"mb-4\" method=\"get\" action=\"{PAGE_PATH}\">\n\
         <input type=\"text\" name=\"key\" class=\"key form-control\" value=\"{}\"{disabled}>\n\
         <button class=\"filter btn btn-outline-secondary\" type=\"submit\"{disabled}>Filter</button>\n\
         <a class=\"clear btn btn-outline-secondary\" href=\"{PAGE_PATH}\">Clear</a>\n\
         </form>\n",
        escape_html(page.filter_key())
    ));
    html.push_str("<h3>Branches</h3>\n");

    let style = if page.results_dimmed() {
        " style=\"color: #AAA\""
    } else {
        ""
    };
    html.push_str(&format!("<div class=\"results\"{style}>\n"));
    match page.results_view() {
        ResultsView::NoRecords => html.push_str("<em>No records found.</em>\n"),
        ResultsView::Rows { rows, load_more } => {
            for row in rows {
                let selected = if row.selected { " selected" } else { "" };
                html.push_str(&format!(
                    "<a class=\"branch-row entry{selected}\" data-id=\"{id}\" href=\"{href}\">\
                     <strong>{title}</strong><br><span>{info}</span><br></a>\n<hr>\n",
                    id = row.id,
                    href = escape_html(&page_href(
                        page.filter_key(),
                        page.filter_limit(),
                        Some(row.id),
                        None
                    )),
                    title = escape_html(&row.title),
                    info = escape_html(&row.info),
                ));
            }
            if load_more {
                html.push_str(&format!(
                    "<a class=\"btn btn-block btn-outline-secondary load-more text-center\" href=\"{}\">Load more</a>\n",
                    escape_html(&page_href(
                        page.filter_key(),
                        page.filter_limit() + FILTER_PAGE_SIZE,
                        page.selected_id(),
                        None
                    ))
                ));
            }
        }
    }
    html.push_str("</div>\n</div>\n");
}

fn render_details_pane(html: &mut String, view: &PageView) {
    let page = &view.page;
    let form = page.form();
    html.push_str("<div class=\"record-details column col-12 col-md-5\">\n");
    html.push_str("<div class=\"btn-toolbar mb-4\">\n");

    if page.form_enabled() {
        let cancel_href = page_href(page.filter_key(), page.filter_limit(), form.id, None);
        html.push_str(&format!(
            "<div class=\"save-cancel-group btn-group\">\n\
             <button id=\"save-branch\" class=\"btn btn-primary\" type=\"submit\" form=\"branch-form\">Save</button>\n\
             <a id=\"cancel-branch\" class=\"btn btn-outline-secondary\" href=\"{}\">Cancel</a>\n\
             </div>\n",
            escape_html(&cancel_href)
        ));
    } else {
        html.push_str("<div class=\"add-edit-delete-group btn-group\">\n");
        html.push_str(&format!(
            "<a id=\"add-branch\" class=\"btn btn-primary\" href=\"{}\">Add</a>\n",
            escape_html(&page_href(page.filter_key(), page.filter_limit(), None, Some("add")))
        ));
        match (page.can_edit(), form.id) {
            (true, Some(id)) => {
                html.push_str(&format!(
                    "<a id=\"edit-branch\" class=\"btn btn-outline-secondary\" href=\"{}\">Edit</a>\n",
                    escape_html(&page_href(
                        page.filter_key(),
                        page.filter_limit(),
                        Some(id),
                        Some("edit")
                    ))
                ));
                html.push_str(&format!(
                    "<form method=\"post\" action=\"{DELETE_PATH}\">\
                     <input type=\"hidden\" name=\"branch_id\" value=\"{id}\">\
                     <button id=\"delete-branch\" class=\"btn btn-outline-secondary\" type=\"submit\">Delete</button>\
                     </form>\n"
                ));
            }
            _ => {
                html.push_str(
                    "<button id=\"edit-branch\" class=\"btn btn-outline-secondary\" disabled=\"disabled\">Edit</button>\n\
                     <button id=\"delete-branch\" class=\"btn btn-outline-secondary\" disabled=\"disabled\">Delete</button>\n",
                );
            }
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");

    html.push_str("<h3>Details");
    if let Some(link) = page.details_link() {
        html.push_str(&format!(
            " <a href=\"{}\"><span class=\"fas fa-link\"></span></a>",
            escape_html(link)
        ));
    }
    html.push_str("</h3>\n");

    if let Some(message) = page.form_message() {
        html.push_str(&format!(
            "<div class=\"form-message alert alert-danger\">{}</div>\n",
            escape_html(message)
        ));
    }

    let disabled = disabled_attr(!page.form_enabled());
    let has_error = |field: FormField| {
        if page.invalid_fields().contains(&field) {
            " has-error"
        } else {
            ""
        }
    };
    let id_value = form.id.map(|id| id.to_string()).unwrap_or_default();

    html.push_str(&format!(
        "<form id=\"branch-form\" method=\"post\" action=\"{PAGE_PATH}\">\n\
         <input type=\"hidden\" id=\"branch-id\" name=\"id\" value=\"{id_value}\">\n\
         <div class=\"form-group{name_error}\">\n\
         <label for=\"branch-name\">Name <span class=\"text-danger\">*</span></label>\n\
         <input id=\"branch-name\" name=\"name\" class=\"form-control required\" maxlength=\"128\" value=\"{name}\"{disabled}>\n\
         </div>\n\
         <div class=\"form-group{location_error}\">\n\
         <label for=\"branch-location\">Location <span class=\"text-danger\">*</span></label>\n\
         <input id=\"branch-location\" name=\"location\" class=\"form-control\" value=\"{location}\"{disabled}>\n\
         </div>\n",
        name_error = has_error(FormField::Name),
        location_error = has_error(FormField::Location),
        name = escape_html(&form.name),
        location = escape_html(&form.location),
    ));

    html.push_str(&format!(
        "<div class=\"form-group\">\n\
         <label for=\"branch-category\">Category</label>\n\
         <select id=\"branch-category\" name=\"id_service_categories\" class=\"form-control\"{disabled}>\n\
         <option value=\"null\">-</option>\n"
    ));
    for category in &view.categories {
        let selected = if form.category_id == Some(category.id) {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            "<option value=\"{}\"{selected}>{}</option>\n",
            category.id,
            escape_html(&category.name)
        ));
    }
    html.push_str("</select>\n</div>\n</form>\n</div>\n");
}

fn disabled_attr(disabled: bool) -> &'static str {
    if disabled {
        " disabled=\"disabled\""
    } else {
        ""
    }
}

/// Escapes text for HTML element content and quoted attribute values.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
