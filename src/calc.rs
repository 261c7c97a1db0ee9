use crate::store::{AttendanceRecord, AttendanceStatus};
use chrono::{Days, NaiveDate};
use serde::Serialize;

/// 1-decimal rounding with ties going up: `Int(10*x + 0.5) / 10`.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTally {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

impl StatusTally {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AttendanceRecord>,
    {
        let mut tally = Self::default();
        for r in records {
            tally.add(r.status);
        }
        tally
    }

    pub fn add(&mut self, status: AttendanceStatus) {
        self.total += 1;
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Late => self.late += 1,
        }
    }

    pub fn attended(&self) -> usize {
        self.present + self.late
    }

    /// Unrounded attendance percentage, `None` when nothing was counted.
    pub fn raw_percent(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.attended() as f64 / self.total as f64 * 100.0)
    }

    pub fn percent(&self) -> f64 {
        self.raw_percent().map(round_off_1_decimal).unwrap_or(0.0)
    }
}

/// Dashboard-facing stats; `percentage` is already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub percentage: String,
}

impl AttendanceStats {
    pub fn from_tally(t: &StatusTally) -> Self {
        Self {
            total: t.total,
            present: t.present,
            absent: t.absent,
            late: t.late,
            percentage: format_percentage(t),
        }
    }
}

/// One decimal place with ties rounded up, or a bare `"0"` for an empty set.
pub fn format_percentage(t: &StatusTally) -> String {
    match t.raw_percent() {
        Some(p) => format!("{:.1}", round_off_1_decimal(p)),
        None => "0".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAttendance {
    pub percentage: f64,
    pub trend: f64,
}

impl ClassAttendance {
    pub fn from_tallies(current: &StatusTally, previous: &StatusTally) -> Self {
        Self {
            percentage: current.percent(),
            trend: trend(current, previous),
        }
    }
}

/// Change in attendance percentage between two windows. Zero unless both have records.
pub fn trend(current: &StatusTally, previous: &StatusTally) -> f64 {
    match (current.raw_percent(), previous.raw_percent()) {
        (Some(cur), Some(prev)) => round_off_1_decimal(cur - prev),
        _ => 0.0,
    }
}

/// Inclusive calendar range. Empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// `[end - days, end]`, clamped to the earliest representable date.
    pub fn ending(end: NaiveDate, days: u32) -> Self {
        Self {
            start: end
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN),
            end,
        }
    }

    /// Window of the same length ending the day before `self.start`.
    pub fn preceding(&self) -> Self {
        let span = self.end.signed_duration_since(self.start);
        match self.start.pred_opt() {
            Some(end) => Self {
                start: end.checked_sub_signed(span).unwrap_or(NaiveDate::MIN),
                end,
            },
            None => Self::empty(),
        }
    }

    fn empty() -> Self {
        Self {
            start: NaiveDate::MAX,
            end: NaiveDate::MIN,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Up to `count` consecutive 7-day buckets ending at `end`, oldest first.
/// Stops early at the earliest representable date.
pub fn weekly_windows(end: NaiveDate, count: usize) -> Vec<DateWindow> {
    let mut out: Vec<DateWindow> = Vec::with_capacity(count);
    let mut cursor = Some(end);
    for _ in 0..count {
        let Some(last) = cursor else { break };
        let w = DateWindow::ending(last, 6);
        cursor = w.start.pred_opt();
        out.push(w);
    }
    out.reverse();
    out
}
