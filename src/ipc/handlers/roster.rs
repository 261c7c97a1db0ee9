use crate::ipc::error::{ok, respond, HandlerErr};
use crate::ipc::helpers::optional_str;
use crate::ipc::types::{AppState, Request};
use crate::roster::{RosterError, Student};
use serde_json::json;

fn students_add(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let raw = params
        .get("student")
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing student"))?;
    let student: Student = serde_json::from_value(raw)
        .map_err(|e| HandlerErr::bad_params(format!("invalid student: {}", e)))?;

    let student_id = state.roster.add(student).map_err(|e| match e {
        RosterError::MissingField(_) => HandlerErr::bad_params(e.to_string()),
        RosterError::DuplicateId(ref id) => HandlerErr::new("conflict", e.to_string())
            .with_details(json!({ "studentId": id })),
    })?;
    tracing::info!(student_id = %student_id, "student added");
    Ok(json!({ "studentId": student_id }))
}

fn students_list(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_section = optional_str(params, "classSection")?.filter(|s| !s.is_empty());
    let search = optional_str(params, "search")?;
    let students = state
        .roster
        .list(class_section.as_deref(), search.as_deref());
    Ok(json!({ "students": students }))
}

fn handle_students_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, students_add(state, &req.params))
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, students_list(state, &req.params))
}

fn handle_classes_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "classes": state.roster.classes() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.add" => Some(handle_students_add(state, req)),
        "students.list" => Some(handle_students_list(state, req)),
        "classes.list" => Some(handle_classes_list(state, req)),
        _ => None,
    }
}
