use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{
    as_of, optional_str, parse_date, parse_time_hhmm, required_str, split_class_section,
    window_days,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{AttendanceRecord, AttendanceStatus, RecordFilter};
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

fn attendance_append(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let raw = params
        .get("records")
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing records"))?;
    let records: Vec<AttendanceRecord> = serde_json::from_value(raw)
        .map_err(|e| HandlerErr::bad_params(format!("invalid records: {}", e)))?;

    let appended = state.store.append(records);
    tracing::info!(appended, total = state.store.len(), "attendance appended");
    Ok(json!({ "appended": appended, "total": state.store.len() }))
}

fn attendance_stats(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = optional_str(params, "date")?;
    let class_section = optional_str(params, "classSection")?;
    let stats = state
        .store
        .stats(date.as_deref(), class_section.as_deref());
    Ok(json!(stats))
}

fn attendance_class_attendance(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_section = optional_str(params, "classSection")?.unwrap_or_default();
    let days = window_days(params, state.config.attendance.default_window_days)?;
    let today = as_of(params)?;
    Ok(json!(state.store.class_attendance(&class_section, days, today)))
}

fn parse_marks(params: &serde_json::Value) -> Result<Vec<(String, AttendanceStatus)>, HandlerErr> {
    let Some(obj) = params.get("marks").and_then(|v| v.as_object()) else {
        return Err(HandlerErr::bad_params("marks must be an object of studentId -> status"));
    };
    let mut out: Vec<(String, AttendanceStatus)> = Vec::with_capacity(obj.len());
    for (student_id, v) in obj {
        let status = v
            .as_str()
            .and_then(AttendanceStatus::parse)
            .ok_or_else(|| {
                HandlerErr::bad_params("status must be present, absent or late")
                    .with_details(json!({ "studentId": student_id, "status": v }))
            })?;
        out.push((student_id.clone(), status));
    }
    Ok(out)
}

/// Builds one record per marked student from the roster, then appends the batch.
fn attendance_mark(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_section = required_str(params, "classSection")?;
    let (class, section) = split_class_section(&class_section)
        .ok_or_else(|| HandlerErr::bad_params("classSection must be <class>-<section>"))?;
    let subject = required_str(params, "subject")?;
    let teacher_id = required_str(params, "teacherId")?;
    let date_raw = required_str(params, "date")?;
    let date = parse_date(&date_raw, "date")?;
    let time_marked = match optional_str(params, "timeMarked")? {
        Some(t) => parse_time_hhmm(&t)?,
        None => chrono::Local::now().format("%H:%M").to_string(),
    };
    let marks: HashMap<String, AttendanceStatus> = parse_marks(params)?.into_iter().collect();
    if marks.is_empty() {
        return Err(HandlerErr::bad_params("marks must not be empty"));
    }

    let roster_students = state.roster.list(Some(class_section.as_str()), None);
    let mut unknown: Vec<&str> = marks
        .keys()
        .filter(|id| !roster_students.iter().any(|s| &s.id == *id))
        .map(|s| s.as_str())
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        return Err(
            HandlerErr::new("not_found", "student not in class roster")
                .with_details(json!({ "classSection": class_section, "studentIds": unknown })),
        );
    }

    let records: Vec<AttendanceRecord> = roster_students
        .iter()
        .filter_map(|s| {
            marks.get(&s.id).map(|status| AttendanceRecord {
                id: Uuid::new_v4().to_string(),
                student_id: s.id.clone(),
                student_name: s.name.clone(),
                class: class.to_string(),
                section: section.to_string(),
                date: date.format("%Y-%m-%d").to_string(),
                status: *status,
                subject: subject.clone(),
                teacher_id: teacher_id.clone(),
                time_marked: time_marked.clone(),
            })
        })
        .collect();
    let record_ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();

    let appended = state.store.append(records);
    tracing::info!(
        class_section = %class_section,
        subject = %subject,
        date = %date,
        appended,
        "attendance marked"
    );
    Ok(json!({ "appended": appended, "recordIds": record_ids }))
}

fn attendance_records(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = optional_str(params, "date")?;
    let class_section = optional_str(params, "classSection")?;
    let student_id = optional_str(params, "studentId")?.filter(|s| !s.is_empty());
    let status = match optional_str(params, "status")? {
        Some(raw) if !raw.is_empty() => Some(
            AttendanceStatus::parse(&raw)
                .ok_or_else(|| HandlerErr::bad_params("status must be present, absent or late"))?,
        ),
        _ => None,
    };

    let filter = RecordFilter {
        student_id,
        status,
        ..RecordFilter::new(date.as_deref(), class_section.as_deref())
    };
    let records: Vec<&AttendanceRecord> = state.store.filtered(&filter).collect();
    Ok(json!({ "count": records.len(), "records": records }))
}

fn handle_attendance_append(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, attendance_append(state, &req.params))
}

fn handle_attendance_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, attendance_stats(state, &req.params))
}

fn handle_attendance_class_attendance(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, attendance_class_attendance(state, &req.params))
}

fn handle_attendance_mark(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, attendance_mark(state, &req.params))
}

fn handle_attendance_records(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, attendance_records(state, &req.params))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.append" => Some(handle_attendance_append(state, req)),
        "attendance.stats" => Some(handle_attendance_stats(state, req)),
        "attendance.classAttendance" => Some(handle_attendance_class_attendance(state, req)),
        "attendance.mark" => Some(handle_attendance_mark(state, req)),
        "attendance.records" => Some(handle_attendance_records(state, req)),
        _ => None,
    }
}
