//! HTTP server implementation for the web dashboard.
//!
//! Serves the single records page, the htmx fragments it loads, CSV
//! download, and a small JSON API.

use axum::{
    Router,
    extract::{Form, Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use super::templates;
use crate::chart::render_svg_bar_chart;
use crate::config::{RecordsConfig, UiConfig};
use crate::csv_io::{CsvPreview, export_file_name, import_csv, preview_csv, records_to_csv};
use crate::db::Database;
use crate::db::query::RecordQuery;
use crate::error::{ErrorCode, RecordError};
use crate::types::{Category, Field, NewRecord, Record};

/// htmx event fired after any change to the records table.
const RECORDS_CHANGED: &str = "records-changed";

/// Dashboard server state shared across handlers.
#[derive(Clone)]
pub struct DashboardServer {
    db: Arc<Database>,
    records: Arc<RecordsConfig>,
}

impl DashboardServer {
    pub fn new(db: Arc<Database>, records: RecordsConfig) -> Self {
        Self {
            db,
            records: Arc::new(records),
        }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn records_config(&self) -> &RecordsConfig {
        &self.records
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// JSON error body with an HTTP status derived from the error code.
struct ApiError(RecordError);

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(RecordError::from(err))
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::MissingRequiredField | ErrorCode::InvalidFieldValue => StatusCode::BAD_REQUEST,
        ErrorCode::RecordNotFound => StatusCode::NOT_FOUND,
        ErrorCode::ImportFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (status_for(self.0.code), Json(self.0)).into_response()
    }
}

/// Escape HTML special characters.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn message(kind: &str, text: &str) -> String {
    format!(
        r#"<div class="message message-{}">{}</div>"#,
        kind,
        html_escape(text)
    )
}

/// Fragment plus the header that tells the page to refresh its views.
fn changed(html: String) -> Response {
    ([("HX-Trigger", RECORDS_CHANGED)], Html(html)).into_response()
}

/// `<option>` list of categories, labels shown with their Chinese names.
pub(crate) fn category_options(selected: Category) -> String {
    Category::ALL
        .iter()
        .map(|c| {
            format!(
                r#"<option value="{}"{}>{} · {}</option>"#,
                c.as_str(),
                if *c == selected { " selected" } else { "" },
                c.label(),
                c.native_label()
            )
        })
        .collect()
}

/// `<option>` list of every field.
pub(crate) fn field_options() -> String {
    Field::ALL
        .iter()
        .map(|f| format!(r#"<option value="{}">{}</option>"#, f.column(), f.label()))
        .collect()
}

/// Root endpoint - serves the dashboard page.
async fn root(State(state): State<DashboardServer>) -> Html<String> {
    Html(templates::render_index(state.records_config()))
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Summary cards and bar chart.
async fn ui_stats(State(state): State<DashboardServer>) -> Html<String> {
    let stats = match state.db().stats() {
        Ok(stats) => stats,
        Err(e) => {
            return Html(message(
                "error",
                &format!("Failed to load statistics: {}", RecordError::from(e)),
            ));
        }
    };

    if stats.total == 0 {
        return Html(
            r#"<div class="empty-state">No records yet. Add one or import a CSV to see the summary.</div>"#
                .to_string(),
        );
    }

    Html(format!(
        r#"
        <div class="grid grid-stats">
            <div class="card stat">
                <div class="stat-value">{}</div>
                <div class="stat-label">Total records</div>
            </div>
            <div class="card stat">
                <div class="stat-value">{}</div>
                <div class="stat-label">Categories</div>
            </div>
            <div class="card stat">
                <div class="stat-value stat-small">{}</div>
                <div class="stat-label">Last added</div>
            </div>
        </div>
        <div class="card chart-card">{}</div>
    "#,
        stats.total,
        stats.category_count,
        html_escape(stats.latest.as_deref().unwrap_or("-")),
        render_svg_bar_chart(&stats.by_category)
    ))
}

fn render_records_table(records: &[Record]) -> String {
    let mut html = String::from(
        r##"<form id="records-form" hx-post="/ui/records/delete" hx-target="#message" hx-confirm="Delete the selected records?">
        <table><thead><tr><th class="select-col"><input type="checkbox" onclick="toggleAll(this)"></th>"##,
    );
    for field in Field::ALL {
        html.push_str(&format!("<th>{}</th>", field.label()));
    }
    html.push_str("<th></th></tr></thead><tbody>");

    for record in records {
        html.push_str(&format!(
            r#"<tr><td class="select-col"><input type="checkbox" name="id" value="{}"></td>"#,
            record.id
        ));
        for field in Field::ALL {
            let value = match field {
                Field::Category => record.category.label().to_string(),
                other => record.field_value(other),
            };
            html.push_str(&format!("<td>{}</td>", html_escape(&value)));
        }
        html.push_str(&format!(
            r##"<td><button type="button" class="btn btn-small" hx-get="/ui/records/{}/edit" hx-target="#editor" onclick="setMode('update')">Edit</button></td></tr>"##,
            record.id
        ));
    }

    html.push_str(
        r#"</tbody></table>
        <div class="actions"><button type="submit" class="btn btn-danger">Delete selected</button></div>
        </form>"#,
    );
    html
}

/// Records table for the current search, filters and sort.
async fn ui_records(
    State(state): State<DashboardServer>,
    Query(params): Query<Vec<(String, String)>>,
) -> Html<String> {
    let result = RecordQuery::from_pairs(&params)
        .and_then(|q| state.db().query_records(&q).map_err(RecordError::from));

    match result {
        Ok(records) if records.is_empty() => Html(message("info", "No matching records")),
        Ok(records) => Html(format!(
            "{}{}",
            message("success", &format!("Found {} record(s)", records.len())),
            render_records_table(&records)
        )),
        Err(e) => Html(message("error", &e.message)),
    }
}

/// Removable multi-select of the distinct values stored in a field. One
/// block is added per filtered field; the filters combine with AND.
async fn ui_filter_values(
    State(state): State<DashboardServer>,
    Path(field): Path<String>,
) -> Response {
    let Some(field) = Field::parse(&field) else {
        return (
            StatusCode::BAD_REQUEST,
            Html(message("error", &format!("Unknown field '{}'", field))),
        )
            .into_response();
    };

    let values = match state.db().distinct_values(field) {
        Ok(values) => values,
        Err(e) => return Html(message("error", &RecordError::from(e).message)).into_response(),
    };

    let mut html = format!(
        r#"<div class="field-filter" id="filter-{col}"><label>{label} <select name="{col}" multiple size="6" class="filter-values">"#,
        col = field.column(),
        label = field.label()
    );
    for value in values {
        let label = match field {
            Field::Category => Category::parse(&value)
                .map(|c| c.label().to_string())
                .unwrap_or_else(|| value.clone()),
            _ => value.clone(),
        };
        html.push_str(&format!(
            r#"<option value="{}">{}</option>"#,
            html_escape(&value),
            html_escape(&label)
        ));
    }
    html.push_str(
        r#"</select></label><button type="button" class="btn btn-small" onclick="removeFilter(this)">Remove</button></div>"#,
    );
    Html(html).into_response()
}

#[derive(Debug, serde::Deserialize)]
struct AddForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    notes: String,
}

/// Handle the add form.
async fn ui_add(State(state): State<DashboardServer>, Form(form): Form<AddForm>) -> Response {
    let category = if form.category.trim().is_empty() {
        state.records_config().default_category
    } else {
        match Category::parse(&form.category) {
            Some(c) => c,
            None => {
                return Html(message(
                    "error",
                    &format!("Unknown category '{}'", form.category),
                ))
                .into_response();
            }
        }
    };

    let record = NewRecord::new(form.title, category)
        .with_name(form.name)
        .with_notes(form.notes);

    match state.db().insert_record(record) {
        Ok(record) => changed(message(
            "success",
            &format!("Added record #{}: {}", record.id, record.title),
        )),
        Err(e) => Html(message("error", &RecordError::from(e).message)).into_response(),
    }
}

fn render_record_detail(record: &Record) -> String {
    let mut html = format!(
        r#"<div class="card record-detail"><h3>Record #{}</h3><dl>"#,
        record.id
    );
    for field in Field::ALL {
        let value = match field {
            Field::Category => format!(
                "{} ({})",
                record.category.label(),
                record.category.native_label()
            ),
            other => record.field_value(other),
        };
        html.push_str(&format!(
            "<dt>{}</dt><dd>{}</dd>",
            field.label(),
            html_escape(&value)
        ));
    }
    html.push_str("</dl></div>");
    html
}

/// Input for a field's new value, pre-filled with the current one.
fn render_value_input(record: &Record, field: Field) -> String {
    match field {
        Field::Notes => format!(
            r#"<textarea name="value" rows="3">{}</textarea>"#,
            html_escape(&record.notes)
        ),
        Field::Category => format!(
            r#"<select name="value">{}</select>"#,
            category_options(record.category)
        ),
        other => format!(
            r#"<input type="text" name="value" value="{}">"#,
            html_escape(&record.field_value(other))
        ),
    }
}

fn render_update_form(record: &Record, field: Field) -> String {
    let fields: String = Field::ALL
        .iter()
        .filter(|f| f.is_updatable())
        .map(|f| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                f.column(),
                if *f == field { " selected" } else { "" },
                f.label()
            )
        })
        .collect();

    format!(
        r##"<form class="update-form" hx-post="/ui/records/{id}" hx-target="#editor">
            <label>Field <select name="field" hx-get="/ui/records/{id}/input" hx-target="#value-input" hx-trigger="change">{fields}</select></label>
            <label>New value <span id="value-input">{input}</span></label>
            <button type="submit" class="btn btn-primary">Update</button>
        </form>"##,
        id = record.id,
        fields = fields,
        input = render_value_input(record, field)
    )
}

/// Field shown first in the update form.
const FIRST_UPDATE_FIELD: Field = Field::Name;

/// Current record and the form to change one of its fields.
async fn ui_edit(State(state): State<DashboardServer>, Path(id): Path<i64>) -> Html<String> {
    match state.db().get_record(id) {
        Ok(Some(record)) => Html(format!(
            "{}{}",
            render_record_detail(&record),
            render_update_form(&record, FIRST_UPDATE_FIELD)
        )),
        Ok(None) => Html(message("error", &RecordError::not_found(id).message)),
        Err(e) => Html(message("error", &RecordError::from(e).message)),
    }
}

#[derive(Debug, serde::Deserialize)]
struct ValueInputQuery {
    field: String,
}

/// Value input for the field picked in the update form.
async fn ui_value_input(
    State(state): State<DashboardServer>,
    Path(id): Path<i64>,
    Query(query): Query<ValueInputQuery>,
) -> Html<String> {
    let Some(field) = Field::parse(&query.field).filter(|f| f.is_updatable()) else {
        return Html(message("error", &format!("Unknown field '{}'", query.field)));
    };

    match state.db().get_record(id) {
        Ok(Some(record)) => Html(render_value_input(&record, field)),
        Ok(None) => Html(message("error", &RecordError::not_found(id).message)),
        Err(e) => Html(message("error", &RecordError::from(e).message)),
    }
}

#[derive(Debug, serde::Deserialize)]
struct UpdateForm {
    field: String,
    #[serde(default)]
    value: String,
}

/// Handle the update form.
async fn ui_update(
    State(state): State<DashboardServer>,
    Path(id): Path<i64>,
    Form(form): Form<UpdateForm>,
) -> Response {
    let Some(field) = Field::parse(&form.field) else {
        return Html(message("error", &format!("Unknown field '{}'", form.field)))
            .into_response();
    };

    match state.db().update_field(id, field, &form.value) {
        Ok(record) => changed(format!(
            "{}{}{}",
            message("success", &format!("Updated {} of record #{}", field.label(), id)),
            render_record_detail(&record),
            render_update_form(&record, field)
        )),
        Err(e) => Html(message("error", &RecordError::from(e).message)).into_response(),
    }
}

/// Delete one record or a batch of checked records.
async fn ui_delete(
    State(state): State<DashboardServer>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let mut ids = Vec::new();
    for (key, value) in &pairs {
        if key != "id" {
            continue;
        }
        match value.trim().parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(_) => {
                return Html(message("error", &format!("Invalid record id '{}'", value)))
                    .into_response();
            }
        }
    }

    let result = match ids.as_slice() {
        [id] => state.db().delete_record(*id).map(|()| 1),
        _ => state.db().delete_records(&ids),
    };

    match result {
        Ok(removed) => changed(message("success", &format!("Deleted {} record(s)", removed))),
        Err(e) => Html(message("error", &RecordError::from(e).message)).into_response(),
    }
}

fn render_preview(preview: &CsvPreview, csv_text: &str) -> String {
    let mut html = format!(
        r#"<div class="message message-info">{} row(s) in file, showing the first {}</div><table><thead><tr>"#,
        preview.total_rows,
        preview.rows.len()
    );
    for header in &preview.headers {
        html.push_str(&format!("<th>{}</th>", html_escape(header)));
    }
    html.push_str("</tr></thead><tbody>");
    for row in &preview.rows {
        html.push_str("<tr>");
        for value in row {
            html.push_str(&format!("<td>{}</td>", html_escape(value)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");

    if preview.has_title {
        html.push_str(&format!(
            r##"<form hx-post="/ui/import" hx-target="#import-result">
                <textarea name="csv" hidden>{}</textarea>
                <button type="submit" class="btn btn-primary">Confirm import</button>
            </form>"##,
            html_escape(csv_text)
        ));
    } else {
        html.push_str(&message(
            "error",
            "The file has no 'title' column and cannot be imported",
        ));
    }
    html
}

/// Parse an uploaded CSV and show its first rows.
async fn ui_import_preview(
    State(state): State<DashboardServer>,
    mut multipart: Multipart,
) -> Html<String> {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                match field.bytes().await {
                    Ok(bytes) => upload = Some(bytes),
                    Err(e) => return Html(message("error", &format!("Upload failed: {}", e))),
                }
            }
            Ok(None) => break,
            Err(e) => return Html(message("error", &format!("Upload failed: {}", e))),
        }
    }

    let Some(bytes) = upload else {
        return Html(message("error", "Choose a CSV file to import"));
    };
    let Ok(text) = String::from_utf8(bytes.to_vec()) else {
        return Html(message("error", "Import failed: the file is not UTF-8 text"));
    };

    debug!(bytes = text.len(), "CSV uploaded for preview");
    match preview_csv(text.as_bytes(), state.records_config().preview_rows) {
        Ok(preview) => Html(render_preview(&preview, &text)),
        Err(e) => Html(message("error", &RecordError::import_failed(e).message)),
    }
}

#[derive(Debug, serde::Deserialize)]
struct ImportForm {
    #[serde(default)]
    csv: String,
}

/// Import the previewed CSV.
async fn ui_import(State(state): State<DashboardServer>, Form(form): Form<ImportForm>) -> Response {
    match import_csv(state.db(), form.csv.as_bytes()) {
        Ok(report) => {
            let mut html = message(
                "success",
                &format!(
                    "Imported {} record(s), skipped {} without a title",
                    report.imported, report.skipped
                ),
            );
            if !report.warnings.is_empty() {
                html.push_str(r#"<ul class="warnings">"#);
                for warning in &report.warnings {
                    html.push_str(&format!("<li>{}</li>", html_escape(warning)));
                }
                html.push_str("</ul>");
            }
            changed(html)
        }
        Err(e) => Html(message("error", &e.message)).into_response(),
    }
}

/// Download the current view as CSV.
async fn export_csv(
    State(state): State<DashboardServer>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let query = RecordQuery::from_pairs(&params)?;
    let records = state.db().query_records(&query)?;
    let body = records_to_csv(&records).map_err(RecordError::internal)?;
    let file_name = export_file_name(query.is_filtered(), &chrono::Local::now());

    info!(count = records.len(), file = %file_name, "CSV export");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response())
}

/// JSON list of records, same parameters as the table.
async fn api_records(
    State(state): State<DashboardServer>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let query = RecordQuery::from_pairs(&params)?;
    Ok(Json(state.db().query_records(&query)?))
}

async fn api_record(
    State(state): State<DashboardServer>,
    Path(id): Path<i64>,
) -> Result<Json<Record>, ApiError> {
    state
        .db()
        .get_record(id)?
        .map(Json)
        .ok_or_else(|| RecordError::not_found(id).into())
}

/// Build the router with all routes.
pub fn build_router(state: DashboardServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/export.csv", get(export_csv))
        // htmx fragments
        .route("/ui/stats", get(ui_stats))
        .route("/ui/records", get(ui_records).post(ui_add))
        .route("/ui/records/delete", post(ui_delete))
        .route("/ui/records/{id}", post(ui_update))
        .route("/ui/records/{id}/edit", get(ui_edit))
        .route("/ui/records/{id}/input", get(ui_value_input))
        .route("/ui/filters/{field}", get(ui_filter_values))
        .route("/ui/import/preview", post(ui_import_preview))
        .route("/ui/import", post(ui_import))
        // JSON API
        .route("/api/health", get(health))
        .route("/api/records", get(api_records))
        .route("/api/records/{id}", get(api_record))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Status of the dashboard server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardStatus {
    /// Serving requests.
    Running,
    /// Failed to bind, retrying in background.
    Retrying,
    Stopped,
}

/// Handle for managing the dashboard server lifecycle.
pub struct DashboardHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    status_rx: watch::Receiver<DashboardStatus>,
}

impl DashboardHandle {
    pub fn status(&self) -> DashboardStatus {
        *self.status_rx.borrow()
    }

    /// Wait until the status changes, returning the new value.
    pub async fn changed(&mut self) -> DashboardStatus {
        if self.status_rx.changed().await.is_err() {
            return DashboardStatus::Stopped;
        }
        *self.status_rx.borrow()
    }

    /// Trigger shutdown of the dashboard server.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Start the HTTP server on the specified port.
///
/// Returns a sender that signals shutdown and the bound address.
pub async fn start_server(
    db: Arc<Database>,
    port: u16,
    records: RecordsConfig,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let state = DashboardServer::new(db, records);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Dashboard server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Dashboard server shutting down");
            })
            .await
        {
            tracing::error!("Dashboard server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}

/// Retry delay with jitter taken from the clock's sub-second nanos.
fn compute_jittered_delay(base_ms: u64, jitter_ms: u64) -> Duration {
    use std::time::SystemTime;

    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);

    let jitter_range = (jitter_ms * 2) as i64;
    let jitter = if jitter_range > 0 {
        (nanos as i64 % jitter_range) - (jitter_ms as i64)
    } else {
        0
    };

    // At least one second
    let delay_ms = (base_ms as i64 + jitter).max(1000) as u64;
    Duration::from_millis(delay_ms)
}

/// Start the HTTP server, retrying in the background while the port is busy.
///
/// Never fails; watch the returned handle for status.
pub fn start_server_with_retry(
    db: Arc<Database>,
    ui_config: &UiConfig,
    records: RecordsConfig,
) -> DashboardHandle {
    let port = ui_config.port;
    let retry_jitter_ms = ui_config.retry_jitter_ms;
    let retry_max_ms = ui_config.retry_max_ms;
    let retry_multiplier = ui_config.retry_multiplier;
    let mut current_delay_ms = ui_config.retry_initial_ms;

    let (status_tx, status_rx) = watch::channel(DashboardStatus::Retrying);
    let (handle_shutdown_tx, mut handle_shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        loop {
            match handle_shutdown_rx.try_recv() {
                Ok(()) | Err(oneshot::error::TryRecvError::Closed) => {
                    info!("Dashboard retry loop shutting down");
                    let _ = status_tx.send(DashboardStatus::Stopped);
                    break;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
            }

            match start_server(Arc::clone(&db), port, records.clone()).await {
                Ok((shutdown_tx, bound_addr)) => {
                    info!("Dashboard available at http://{}", bound_addr);
                    let _ = status_tx.send(DashboardStatus::Running);

                    let _ = handle_shutdown_rx.await;
                    let _ = shutdown_tx.send(());
                    let _ = status_tx.send(DashboardStatus::Stopped);
                    break;
                }
                Err(e) => {
                    warn!(
                        "Failed to start dashboard on port {}: {}. Retrying in {:.1}s...",
                        port,
                        e,
                        current_delay_ms as f64 / 1000.0
                    );
                    let _ = status_tx.send(DashboardStatus::Retrying);

                    let delay = compute_jittered_delay(current_delay_ms, retry_jitter_ms);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = &mut handle_shutdown_rx => {
                            let _ = status_tx.send(DashboardStatus::Stopped);
                            break;
                        }
                    }

                    current_delay_ms =
                        ((current_delay_ms as f64 * retry_multiplier) as u64).min(retry_max_ms);
                }
            }
        }
    });

    DashboardHandle {
        shutdown_tx: Some(handle_shutdown_tx),
        status_rx,
    }
}
