use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{as_of, optional_str, required_str, window_days};
use crate::ipc::types::{AppState, Request};
use crate::reports::{self, SummaryOptions};
use serde_json::json;

fn reports_attendance_summary(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let cfg = &state.config.attendance;
    // "all" is what the class picker sends for no restriction.
    let class_section = optional_str(params, "classSection")?
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"));
    let opts = SummaryOptions {
        window_days: window_days(params, cfg.default_window_days)?,
        as_of: as_of(params)?,
        class_section: class_section.as_deref(),
        low_attendance_threshold: cfg.low_attendance_threshold,
    };
    Ok(json!(reports::attendance_summary(&state.store, opts)))
}

fn reports_student_summary(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let cfg = &state.config.attendance;
    let student_id = required_str(params, "studentId")?;
    let summary = reports::student_summary(
        &state.store,
        &student_id,
        window_days(params, cfg.default_window_days)?,
        as_of(params)?,
        cfg.recent_limit,
    );
    Ok(json!(summary))
}

fn handle_reports_attendance_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, reports_attendance_summary(state, &req.params))
}

fn handle_reports_student_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, reports_student_summary(state, &req.params))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.attendanceSummary" => Some(handle_reports_attendance_summary(state, req)),
        "reports.studentSummary" => Some(handle_reports_student_summary(state, req)),
        _ => None,
    }
}
