//! HTTP tests for the dashboard router, driven with `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use recordbook::config::RecordsConfig;
use recordbook::dashboard::{DashboardServer, build_router};
use recordbook::db::Database;
use recordbook::types::{Category, NewRecord};
use std::sync::Arc;
use tower::ServiceExt;

fn setup() -> (Arc<Database>, Router) {
    let db = Arc::new(Database::open_in_memory().expect("Failed to create in-memory database"));
    let router = build_router(DashboardServer::new(Arc::clone(&db), RecordsConfig::default()));
    (db, router)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_version() {
    let (_, app) = setup();

    let response = app.oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn index_page_is_fully_rendered() {
    let (_, app) = setup();

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("htmx"));
    assert!(!html.contains("{{"));
}

#[tokio::test]
async fn add_form_inserts_and_triggers_refresh() {
    let (db, app) = setup();

    let response = app
        .oneshot(post_form(
            "/ui/records",
            "title=Math+olympiad&name=Ann&category=competition&notes=",
        ))
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("HX-Trigger").unwrap(),
        "records-changed"
    );
    let html = body_text(response).await;
    assert!(html.contains("Added record #1: Math olympiad"));

    let record = db.get_record(1).unwrap().unwrap();
    assert_eq!(record.category, Category::Competition);
    assert_eq!(record.name, "Ann");
}

#[tokio::test]
async fn add_form_without_title_shows_error() {
    let (db, app) = setup();

    let response = app
        .oneshot(post_form("/ui/records", "title=+&category=honor"))
        .await
        .unwrap();

    assert!(response.headers().get("HX-Trigger").is_none());
    let html = body_text(response).await;
    assert!(html.contains("message-error"));
    assert!(html.contains("title is required"));
    assert!(db.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn add_form_uses_default_category() {
    let (db, app) = setup();

    app.oneshot(post_form("/ui/records", "title=Plain"))
        .await
        .unwrap();

    let record = db.get_record(1).unwrap().unwrap();
    assert_eq!(record.category, RecordsConfig::default().default_category);
}

#[tokio::test]
async fn records_fragment_applies_filters() {
    let (db, app) = setup();
    db.insert_record(NewRecord::new("Gold <medal>", Category::Honor))
        .unwrap();
    db.insert_record(NewRecord::new("Bank", Category::Account))
        .unwrap();

    let response = app
        .oneshot(get("/ui/records?category=honor&search=gold"))
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains("Found 1 record(s)"));
    assert!(html.contains("Gold &lt;medal&gt;"));
    assert!(!html.contains("Bank"));
}

#[tokio::test]
async fn explicit_all_dates_ignores_submitted_range() {
    let (db, app) = setup();
    db.insert_record(NewRecord::new("Gold", Category::Honor))
        .unwrap();

    let response = app
        .oneshot(get(
            "/ui/records?search=&date=all&from=2999-01-01&to=&sort=id&order=asc",
        ))
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains("Found 1 record(s)"));
    assert!(html.contains("Gold"));
}

#[tokio::test]
async fn records_fragment_combines_field_filters() {
    let (db, app) = setup();
    db.insert_record(NewRecord::new("Gold", Category::Honor).with_name("Ann"))
        .unwrap();
    db.insert_record(NewRecord::new("Silver", Category::Honor).with_name("Bob"))
        .unwrap();
    db.insert_record(NewRecord::new("Bank", Category::Account).with_name("Ann"))
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/ui/records?category=honor&name=Ann"))
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(html.contains("Found 1 record(s)"));
    assert!(html.contains("Gold"));
    assert!(!html.contains("Silver"));
    assert!(!html.contains("Bank"));

    let response = app
        .oneshot(get("/ui/records?category=honor&category=account&name=Ann"))
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(html.contains("Found 2 record(s)"));
    assert!(!html.contains("Silver"));
}

#[tokio::test]
async fn filter_values_fragment_is_removable_block() {
    let (db, app) = setup();
    db.insert_record(NewRecord::new("Gold", Category::Honor))
        .unwrap();

    let response = app.oneshot(get("/ui/filters/category")).await.unwrap();

    let html = body_text(response).await;
    assert!(html.contains(r#"id="filter-category""#));
    assert!(html.contains(r#"name="category" multiple"#));
    assert!(html.contains(r#"<option value="honor">"#));
    assert!(html.contains("removeFilter(this)"));
}

#[tokio::test]
async fn filter_values_for_unknown_field_is_bad_request() {
    let (_, app) = setup();

    let response = app.oneshot(get("/ui/filters/colour")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn records_fragment_reports_no_matches() {
    let (_, app) = setup();

    let response = app.oneshot(get("/ui/records?search=nothing")).await.unwrap();

    assert!(body_text(response).await.contains("No matching records"));
}

#[tokio::test]
async fn stats_fragment_shows_chart() {
    let (db, app) = setup();
    db.insert_record(NewRecord::new("Gold", Category::Honor))
        .unwrap();

    let response = app.oneshot(get("/ui/stats")).await.unwrap();

    let html = body_text(response).await;
    assert!(html.contains("Total records"));
    assert!(html.contains("<svg"));
}

#[tokio::test]
async fn update_form_changes_field() {
    let (db, app) = setup();
    let id = db
        .insert_record(NewRecord::new("Diploma", Category::Other))
        .unwrap()
        .id;

    let response = app
        .oneshot(post_form(
            &format!("/ui/records/{}", id),
            "field=category&value=education",
        ))
        .await
        .unwrap();

    assert!(response.headers().get("HX-Trigger").is_some());
    assert_eq!(
        db.get_record(id).unwrap().unwrap().category,
        Category::Education
    );
}

#[tokio::test]
async fn edit_form_prefills_current_value() {
    let (db, app) = setup();
    let id = db
        .insert_record(NewRecord::new("Diploma", Category::Education).with_name("Ann & Co"))
        .unwrap()
        .id;

    let response = app
        .oneshot(get(&format!("/ui/records/{}/edit", id)))
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains(r#"<option value="name" selected>"#));
    assert!(html.contains(r#"<input type="text" name="value" value="Ann &amp; Co">"#));
    assert!(html.contains(&format!(r#"hx-get="/ui/records/{}/input""#, id)));
}

#[tokio::test]
async fn value_input_follows_chosen_field() {
    let (db, app) = setup();
    let id = db
        .insert_record(NewRecord::new("Diploma", Category::Education).with_notes("line 1\nline 2"))
        .unwrap()
        .id;

    let response = app
        .clone()
        .oneshot(get(&format!("/ui/records/{}/input?field=notes", id)))
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(html.contains(r#"<textarea name="value""#));
    assert!(html.contains("line 1\nline 2</textarea>"));

    let response = app
        .clone()
        .oneshot(get(&format!("/ui/records/{}/input?field=category", id)))
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(html.contains(r#"<select name="value">"#));
    assert!(html.contains(r#"value="education" selected"#));

    let response = app
        .oneshot(get(&format!("/ui/records/{}/input?field=id", id)))
        .await
        .unwrap();
    assert!(body_text(response).await.contains("message-error"));
}

#[tokio::test]
async fn delete_form_removes_checked_records() {
    let (db, app) = setup();
    for title in ["A", "B", "C"] {
        db.insert_record(NewRecord::new(title, Category::Other))
            .unwrap();
    }

    let response = app
        .oneshot(post_form("/ui/records/delete", "id=1&id=3"))
        .await
        .unwrap();

    assert!(body_text(response).await.contains("Deleted 2 record(s)"));
    assert_eq!(db.list_ids().unwrap(), vec![2]);
}

#[tokio::test]
async fn delete_form_without_selection_is_rejected() {
    let (db, app) = setup();
    db.insert_record(NewRecord::new("Kept", Category::Other))
        .unwrap();

    let response = app
        .oneshot(post_form("/ui/records/delete", ""))
        .await
        .unwrap();

    assert!(
        body_text(response)
            .await
            .contains("Select at least one record to delete")
    );
    assert_eq!(db.list_ids().unwrap(), vec![1]);
}

#[tokio::test]
async fn import_confirm_inserts_rows() {
    let (db, app) = setup();

    let response = app
        .oneshot(post_form(
            "/ui/import",
            "csv=title%2Ccategory%0AGold%2Chonor%0A%2Chonor%0A",
        ))
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains("Imported 1 record(s), skipped 1 without a title"));
    assert_eq!(db.list_all().unwrap().len(), 1);
}

#[tokio::test]
async fn export_sets_download_name() {
    let (db, app) = setup();
    db.insert_record(NewRecord::new("Gold", Category::Honor))
        .unwrap();

    let response = app.oneshot(get("/export.csv")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"all_personal_info_"));

    let body = body_text(response).await;
    assert!(body.starts_with("id,name,title,category,created_at,notes"));
    assert!(body.contains("Gold"));
}

#[tokio::test]
async fn filtered_export_uses_filtered_name() {
    let (_, app) = setup();

    let response = app
        .oneshot(get("/export.csv?category=honor"))
        .await
        .unwrap();

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains("personal_info_export_"));
}

#[tokio::test]
async fn api_record_not_found_is_json_404() {
    let (_, app) = setup();

    let response = app.oneshot(get("/api/records/99")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["code"], "RECORD_NOT_FOUND");
}

#[tokio::test]
async fn api_records_rejects_bad_date() {
    let (_, app) = setup();

    let response = app
        .oneshot(get("/api/records?date=custom&from=yesterday"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
