use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::export::{export_spreadsheet, EXPORT_FILE_NAME, XLSX_MIME};
use crate::server::types::ApiErrorType;
use crate::sync::SyncPipeline;
use crate::types::AppState;

/// Query parameters for loading a week of the schedule.
#[derive(Debug, Deserialize)]
pub struct LoadParams {
    pub week: Option<i64>,
    pub semester: Option<i64>,
}

/// POST /schedule/load?week=&semester=
/// Fetches the given week from HEMIS and upserts it into the store
pub async fn post_load_schedule(
    Query(params): Query<LoadParams>,
    State(s): State<Arc<AppState>>,
) -> Response {
    let week = params.week.unwrap_or(s.config.default_week);
    let semester = params.semester.unwrap_or(s.config.default_semester);
    info!("POST /schedule/load (week {}, semester {})", week, semester);

    let pipeline =
        SyncPipeline::new(&s.client, &s.store).with_policy(s.config.malformed_policy);

    match pipeline.sync(week, semester).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "loaded": report.received,
                "message": format!("{} lessons loaded", report.received),
                "report": report,
            })),
        )
            .into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// GET /schedule
/// Returns every stored row with the table's column names
pub async fn get_schedule(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /schedule");

    match s.store.query_all() {
        Ok(table) => (StatusCode::OK, Json(table)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// GET /schedule/export
/// Returns the stored schedule as an XLSX download
pub async fn get_schedule_export(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /schedule/export");

    let table = match s.store.query_all() {
        Ok(table) => table,
        Err(e) => return ApiErrorType::from(e).into_response(),
    };

    match export_spreadsheet(&table) {
        Ok(Some(bytes)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, XLSX_MIME.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(None) => {
            warn!("Export requested but the store is empty");
            (
                StatusCode::OK,
                Json(json!({ "message": "No data found in the store." })),
            )
                .into_response()
        }
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}
