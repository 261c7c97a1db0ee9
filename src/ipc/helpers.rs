use crate::calc;
use crate::ipc::error::HandlerErr;
use chrono::NaiveDate;

pub fn required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Missing and `null` both read as `None`; any other non-string is rejected.
pub fn optional_str(params: &serde_json::Value, key: &str) -> Result<Option<String>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(HandlerErr::bad_params(format!("{} must be a string", key))),
    }
}

pub fn parse_date(raw: &str, key: &str) -> Result<NaiveDate, HandlerErr> {
    calc::parse_iso_date(raw)
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))
}

/// `asOf` when supplied, otherwise today's local date.
pub fn as_of(params: &serde_json::Value) -> Result<NaiveDate, HandlerErr> {
    match optional_str(params, "asOf")? {
        Some(raw) if !raw.trim().is_empty() => parse_date(&raw, "asOf"),
        _ => Ok(chrono::Local::now().date_naive()),
    }
}

pub fn window_days(params: &serde_json::Value, default: u32) -> Result<u32, HandlerErr> {
    match params.get("windowDays") {
        None | Some(serde_json::Value::Null) => Ok(default),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| HandlerErr::bad_params("windowDays must be a non-negative integer")),
    }
}

/// Splits `"<class>-<section>"` at the first dash.
pub fn split_class_section(key: &str) -> Option<(&str, &str)> {
    let (class, section) = key.trim().split_once('-')?;
    if class.is_empty() || section.is_empty() {
        return None;
    }
    Some((class, section))
}

pub fn parse_time_hhmm(raw: &str) -> Result<String, HandlerErr> {
    chrono::NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| HandlerErr::bad_params("timeMarked must be HH:MM"))
}
