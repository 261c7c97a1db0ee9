use crate::calc::{self, DateWindow, StatusTally};
use crate::store::{AttendanceRecord, AttendanceStore};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

const WEEKLY_BUCKETS: usize = 4;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallAttendance {
    pub total: usize,
    pub percentage: f64,
    pub trend: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBreakdown {
    pub class: String,
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub percentage: f64,
    pub trend: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPoint {
    pub week: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowAttendanceStudent {
    pub student_id: String,
    pub student_name: String,
    pub class: String,
    pub total: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub window: DateWindow,
    pub class_section: Option<String>,
    pub overall: OverallAttendance,
    pub by_class: Vec<ClassBreakdown>,
    pub weekly_trend: Vec<WeekPoint>,
    pub low_attendance: Vec<LowAttendanceStudent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: String,
    pub student_name: Option<String>,
    pub window: DateWindow,
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub percentage: f64,
    pub trend: f64,
    pub recent: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, Copy)]
pub struct SummaryOptions<'a> {
    pub window_days: u32,
    pub as_of: NaiveDate,
    pub class_section: Option<&'a str>,
    pub low_attendance_threshold: f64,
}

pub fn attendance_summary(store: &AttendanceStore, opts: SummaryOptions<'_>) -> AttendanceSummary {
    let window = DateWindow::ending(opts.as_of, opts.window_days);
    let previous = window.preceding();

    let current_tally = StatusTally::from_records(store.in_window(opts.class_section, window));
    let previous_tally = StatusTally::from_records(store.in_window(opts.class_section, previous));
    let overall = OverallAttendance {
        total: current_tally.total,
        percentage: current_tally.percent(),
        trend: calc::trend(&current_tally, &previous_tally),
    };

    // (current, previous) per class-section.
    let mut per_class: BTreeMap<String, (StatusTally, StatusTally)> = BTreeMap::new();
    for r in store.in_window(opts.class_section, window) {
        per_class.entry(r.class_section_key()).or_default().0.add(r.status);
    }
    for r in store.in_window(opts.class_section, previous) {
        if let Some(entry) = per_class.get_mut(&r.class_section_key()) {
            entry.1.add(r.status);
        }
    }
    let by_class = per_class
        .into_iter()
        .map(|(class, (cur, prev))| ClassBreakdown {
            class,
            total: cur.total,
            present: cur.present,
            absent: cur.absent,
            late: cur.late,
            percentage: cur.percent(),
            trend: calc::trend(&cur, &prev),
        })
        .collect();

    let weekly_trend = calc::weekly_windows(opts.as_of, WEEKLY_BUCKETS)
        .into_iter()
        .enumerate()
        .map(|(i, w)| {
            let t = StatusTally::from_records(store.in_window(opts.class_section, w));
            WeekPoint {
                week: format!("Week {}", i + 1),
                start_date: w.start,
                end_date: w.end,
                total: t.total,
                percentage: t.percent(),
            }
        })
        .collect();

    AttendanceSummary {
        window,
        class_section: opts.class_section.map(|s| s.to_string()),
        overall,
        by_class,
        weekly_trend,
        low_attendance: low_attendance(store, opts.class_section, window, opts.low_attendance_threshold),
    }
}

fn low_attendance(
    store: &AttendanceStore,
    class_section: Option<&str>,
    window: DateWindow,
    threshold: f64,
) -> Vec<LowAttendanceStudent> {
    let mut per_student: BTreeMap<&str, (&AttendanceRecord, StatusTally)> = BTreeMap::new();
    for r in store.in_window(class_section, window) {
        per_student
            .entry(r.student_id.as_str())
            .or_insert_with(|| (r, StatusTally::default()))
            .1
            .add(r.status);
    }

    let mut out: Vec<LowAttendanceStudent> = per_student
        .into_iter()
        .filter_map(|(student_id, (first, tally))| {
            let percentage = tally.percent();
            (percentage < threshold).then(|| LowAttendanceStudent {
                student_id: student_id.to_string(),
                student_name: first.student_name.clone(),
                class: first.class_section_key(),
                total: tally.total,
                percentage,
            })
        })
        .collect();
    out.sort_by(|a, b| {
        a.percentage
            .partial_cmp(&b.percentage)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.student_name.cmp(&b.student_name))
    });
    out
}

pub fn student_summary(
    store: &AttendanceStore,
    student_id: &str,
    window_days: u32,
    as_of: NaiveDate,
    recent_limit: usize,
) -> StudentSummary {
    let window = DateWindow::ending(as_of, window_days);
    let previous = window.preceding();
    let of_student = |w: DateWindow| {
        store
            .in_window(None, w)
            .filter(move |r| r.student_id == student_id)
    };

    let current = StatusTally::from_records(of_student(window));
    let before = StatusTally::from_records(of_student(previous));

    let mut recent: Vec<&AttendanceRecord> = of_student(window).collect();
    // Stable sort keeps insertion order for same-day entries.
    recent.sort_by(|a, b| (&b.date, &b.time_marked).cmp(&(&a.date, &a.time_marked)));
    recent.truncate(recent_limit);

    StudentSummary {
        student_id: student_id.to_string(),
        student_name: store
            .records()
            .iter()
            .rev()
            .find(|r| r.student_id == student_id)
            .map(|r| r.student_name.clone()),
        window,
        total: current.total,
        present: current.present,
        absent: current.absent,
        late: current.late,
        percentage: current.percent(),
        trend: calc::trend(&current, &before),
        recent: recent.into_iter().cloned().collect(),
    }
}
