//! HTTP request handlers for the Settlement Engine API.
//!
//! Every handler tags its log lines with a per-request correlation id,
//! delegates to the shared [`SettlementEngine`](crate::engine::SettlementEngine)
//! and maps engine errors onto the JSON error body. Operations that take a
//! month lock run on the blocking pool so a long batch never stalls the
//! async workers.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::SettlementEngine;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceEntry, EmployeeKpiEntry, Month};

use super::request::{
    CorrectionRequest, EmployeeMonthRequest, ProcessAttendanceRequest, ProcessPayrollRequest,
    RankRequest, UploadRequest,
};
use super::response::{ApiError, ApiErrorResponse, ScoreResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/attendance/uploads", post(upload_handler))
        .route(
            "/attendance/uploads/:branch_id/:month",
            delete(clear_upload_handler),
        )
        .route("/attendance/readiness/:month", get(readiness_handler))
        .route("/attendance/manual", post(manual_entry_handler))
        .route("/attendance/corrections", post(correction_handler))
        .route("/attendance/process", post(process_attendance_handler))
        .route(
            "/attendance/summaries/:employee_id/:month",
            get(attendance_summary_handler),
        )
        .route("/kpi/entries", post(kpi_entry_handler))
        .route("/kpi/assign", post(assign_kpis_handler))
        .route("/kpi/scores/:employee_id/:month", get(score_handler))
        .route("/performance/rank", post(rank_handler))
        .route("/performance/lock", post(lock_handler))
        .route("/payroll/process", post(process_payroll_handler))
        .route("/payroll/runs/:run_id/approve", post(approve_payroll_handler))
        .route("/payroll/months/:month", get(payroll_run_handler))
        .with_state(state)
}

/// Unwraps a JSON body or builds the 400 response for it.
fn parse_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            Err((
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response())
        }
    }
}

fn parse_month(raw: &str) -> EngineResult<Month> {
    raw.parse()
}

/// Runs an engine operation on the blocking thread pool.
async fn run_blocking<T, F>(state: AppState, operation: F) -> EngineResult<T>
where
    T: Send + 'static,
    F: FnOnce(&SettlementEngine) -> EngineResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || operation(state.engine()))
        .await
        .unwrap_or_else(|err| {
            Err(EngineError::Internal {
                message: format!("engine task failed: {}", err),
            })
        })
}

/// Builds the 200 response for a successful operation, or the mapped error
/// response for a failed one.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    operation: &str,
    start_time: Instant,
    result: EngineResult<T>,
) -> Response {
    match result {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                operation,
                duration_us = start_time.elapsed().as_micros(),
                "Request completed"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(body),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                error = %err,
                "Request failed"
            );
            let api_error: ApiErrorResponse = err.into();
            (
                api_error.status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(api_error.error),
            )
                .into_response()
        }
    }
}

/// Handler for POST /attendance/uploads.
async fn upload_handler(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing attendance upload");
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = run_blocking(state, move |engine| {
        engine.record_upload(
            &request.branch_id,
            request.month,
            &request.file_name,
            request.records,
        )
    })
    .await;
    respond(correlation_id, "record_upload", start_time, result)
}

/// Handler for DELETE /attendance/uploads/:branch_id/:month.
async fn clear_upload_handler(
    State(state): State<AppState>,
    Path((branch_id, month)): Path<(String, String)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, branch_id = %branch_id, "Clearing attendance upload");
    let start_time = Instant::now();
    let result = match parse_month(&month) {
        Ok(month) => {
            run_blocking(state, move |engine| engine.clear_upload(&branch_id, month)).await
        }
        Err(err) => Err(err),
    };
    respond(correlation_id, "clear_upload", start_time, result)
}

/// Handler for GET /attendance/readiness/:month.
async fn readiness_handler(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Checking month readiness");
    let start_time = Instant::now();
    let result = parse_month(&month).map(|month| state.engine().month_readiness(month));
    respond(correlation_id, "month_readiness", start_time, result)
}

/// Handler for POST /attendance/manual.
async fn manual_entry_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceEntry>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Recording manual attendance");
    let entry = match parse_body(correlation_id, payload) {
        Ok(entry) => entry,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = run_blocking(state, move |engine| engine.record_manual_entry(entry)).await;
    respond(correlation_id, "record_manual_entry", start_time, result)
}

/// Handler for POST /attendance/corrections.
async fn correction_handler(
    State(state): State<AppState>,
    payload: Result<Json<CorrectionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Correcting attendance");
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = run_blocking(state, move |engine| {
        engine.correct_attendance(request.entry, &request.reason)
    })
    .await;
    respond(correlation_id, "correct_attendance", start_time, result)
}

/// Handler for POST /attendance/process.
async fn process_attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProcessAttendanceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing monthly attendance");
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = run_blocking(state, move |engine| {
        engine.process_month(request.month, request.branch_id.as_deref())
    })
    .await;
    respond(correlation_id, "process_month", start_time, result)
}

/// Handler for GET /attendance/summaries/:employee_id/:month.
async fn attendance_summary_handler(
    State(state): State<AppState>,
    Path((employee_id, month)): Path<(String, String)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee_id = %employee_id, "Fetching attendance summary");
    let start_time = Instant::now();
    let result = parse_month(&month).and_then(|month| {
        state
            .engine()
            .attendance_summary(&employee_id, month)
            .ok_or_else(|| EngineError::NotFound {
                entity: "MonthlyAttendanceSummary",
                id: format!("{}/{}", employee_id, month),
            })
    });
    respond(correlation_id, "attendance_summary", start_time, result)
}

/// Handler for POST /kpi/entries.
async fn kpi_entry_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeKpiEntry>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Saving KPI entry");
    let entry = match parse_body(correlation_id, payload) {
        Ok(entry) => entry,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = state.engine().save_kpi_entry(entry);
    respond(correlation_id, "save_kpi_entry", start_time, result)
}

/// Handler for POST /kpi/assign.
async fn assign_kpis_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeMonthRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Assigning role KPIs");
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = state
        .engine()
        .assign_role_kpis(&request.employee_id, request.month);
    respond(correlation_id, "assign_role_kpis", start_time, result)
}

/// Handler for GET /kpi/scores/:employee_id/:month.
async fn score_handler(
    State(state): State<AppState>,
    Path((employee_id, month)): Path<(String, String)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee_id = %employee_id, "Computing KPI score");
    let start_time = Instant::now();
    let result = parse_month(&month).and_then(|month| {
        state
            .engine()
            .compute_monthly_score(&employee_id, month)
            .map(|score| ScoreResponse {
                employee_id: employee_id.clone(),
                month,
                score,
            })
    });
    respond(correlation_id, "compute_monthly_score", start_time, result)
}

/// Handler for POST /performance/rank.
async fn rank_handler(
    State(state): State<AppState>,
    payload: Result<Json<RankRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Ranking performance");
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = run_blocking(state, move |engine| {
        engine.rank(request.month, request.department_id.as_deref())
    })
    .await;
    respond(correlation_id, "rank", start_time, result)
}

/// Handler for POST /performance/lock.
async fn lock_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeMonthRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Toggling performance lock");
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = run_blocking(state, move |engine| {
        engine.toggle_lock(&request.employee_id, request.month)
    })
    .await;
    respond(correlation_id, "toggle_lock", start_time, result)
}

/// Handler for POST /payroll/process.
async fn process_payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProcessPayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll");
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = run_blocking(state, move |engine| {
        engine.process_payroll(request.month, request.force_replace)
    })
    .await;
    respond(correlation_id, "process_payroll", start_time, result)
}

/// Handler for POST /payroll/runs/:run_id/approve.
async fn approve_payroll_handler(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, run_id = %run_id, "Approving payroll run");
    let start_time = Instant::now();
    let result = match Uuid::parse_str(&run_id) {
        Ok(id) => run_blocking(state, move |engine| engine.approve_payroll(id)).await,
        Err(_) => Err(EngineError::validation(format!(
            "'{}' is not a valid run id",
            run_id
        ))),
    };
    respond(correlation_id, "approve_payroll", start_time, result)
}

/// Handler for GET /payroll/months/:month.
async fn payroll_run_handler(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Fetching payroll run");
    let start_time = Instant::now();
    let result = parse_month(&month).and_then(|month| {
        state
            .engine()
            .payroll_run(month)
            .ok_or_else(|| EngineError::NotFound {
                entity: "PayrollRun",
                id: month.to_string(),
            })
    });
    respond(correlation_id, "payroll_run", start_time, result)
}
