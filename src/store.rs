use crate::calc::{self, AttendanceStats, ClassAttendance, DateWindow, StatusTally};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            "late" => Some(Self::Late),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
        }
    }

    /// Late arrivals count toward attendance.
    pub fn counts_as_attended(self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

/// One status entry for one student, date and subject. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub class: String,
    pub section: String,
    pub date: String,
    pub status: AttendanceStatus,
    pub subject: String,
    pub teacher_id: String,
    pub time_marked: String,
}

impl AttendanceRecord {
    pub fn class_section_key(&self) -> String {
        format!("{}-{}", self.class, self.section)
    }

    /// Same as `class_section_key() == key` without allocating.
    pub fn matches_class_section(&self, key: &str) -> bool {
        key.strip_prefix(self.class.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .map(|section| section == self.section)
            .unwrap_or(false)
    }

    pub fn calendar_date(&self) -> Option<NaiveDate> {
        calc::parse_iso_date(&self.date)
    }
}

/// Conjunction of optional record filters. Empty strings are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub date: Option<String>,
    pub class_section: Option<String>,
    pub student_id: Option<String>,
    pub status: Option<AttendanceStatus>,
}

impl RecordFilter {
    pub fn new(date: Option<&str>, class_section: Option<&str>) -> Self {
        Self {
            date: non_empty(date),
            class_section: non_empty(class_section),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        if let Some(date) = &self.date {
            if record.date != *date {
                return false;
            }
        }
        if let Some(key) = &self.class_section {
            if !record.matches_class_section(key) {
                return false;
            }
        }
        if let Some(student_id) = &self.student_id {
            if record.student_id != *student_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        true
    }
}

fn non_empty(v: Option<&str>) -> Option<String> {
    v.filter(|s| !s.is_empty()).map(|s| s.to_string())
}

/// Append-only attendance log owned by the running session.
#[derive(Debug, Default)]
pub struct AttendanceStore {
    records: Vec<AttendanceRecord>,
}

impl AttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends in order. Duplicate ids are kept.
    pub fn append<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = AttendanceRecord>,
    {
        let before = self.records.len();
        self.records.extend(records);
        self.records.len() - before
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn filtered<'a>(
        &'a self,
        filter: &'a RecordFilter,
    ) -> impl Iterator<Item = &'a AttendanceRecord> + 'a {
        self.records.iter().filter(move |r| filter.matches(r))
    }

    pub fn in_window<'a>(
        &'a self,
        class_section: Option<&'a str>,
        window: DateWindow,
    ) -> impl Iterator<Item = &'a AttendanceRecord> + 'a {
        self.records.iter().filter(move |r| {
            class_section.map_or(true, |key| r.matches_class_section(key))
                && r.calendar_date().is_some_and(|d| window.contains(d))
        })
    }

    pub fn stats(&self, date: Option<&str>, class_section: Option<&str>) -> AttendanceStats {
        let filter = RecordFilter::new(date, class_section);
        AttendanceStats::from_tally(&StatusTally::from_records(self.filtered(&filter)))
    }

    /// Rolling attendance for one class-section over `[today - window_days, today]`,
    /// with the trend measured against the preceding window of the same length.
    pub fn class_attendance(
        &self,
        class_section: &str,
        window_days: u32,
        today: NaiveDate,
    ) -> ClassAttendance {
        let current = DateWindow::ending(today, window_days);
        let previous = current.preceding();
        ClassAttendance::from_tallies(
            &StatusTally::from_records(self.in_window(Some(class_section), current)),
            &StatusTally::from_records(self.in_window(Some(class_section), previous)),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        id: &str,
        class: &str,
        section: &str,
        date: &str,
        status: AttendanceStatus,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id: id.to_string(),
            student_id: format!("S{}", id),
            student_name: format!("Student {}", id),
            class: class.to_string(),
            section: section.to_string(),
            date: date.to_string(),
            status,
            subject: "Mathematics".to_string(),
            teacher_id: "T001".to_string(),
            time_marked: "09:15".to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    #[test]
    fn stats_matches_reference_scenario() {
        let mut store = AttendanceStore::new();
        store.append(vec![
            record("1", "10", "A", "2025-01-20", AttendanceStatus::Present),
            record("2", "10", "A", "2025-01-20", AttendanceStatus::Late),
            record("3", "10", "A", "2025-01-20", AttendanceStatus::Absent),
        ]);
        let s = store.stats(Some("2025-01-20"), Some("10-A"));
        assert_eq!(s.total, 3);
        assert_eq!(s.present, 1);
        assert_eq!(s.absent, 1);
        assert_eq!(s.late, 1);
        assert_eq!(s.percentage, "66.7");
    }

    #[test]
    fn stats_and_class_attendance_agree_on_ties() {
        let mut store = AttendanceStore::new();
        let records: Vec<AttendanceRecord> = (0..16)
            .map(|i| {
                let status = if i < 9 {
                    AttendanceStatus::Present
                } else {
                    AttendanceStatus::Absent
                };
                record(&i.to_string(), "10", "A", "2025-01-20", status)
            })
            .collect();
        store.append(records);

        assert_eq!(store.stats(None, Some("10-A")).percentage, "56.3");
        let ca = store.class_attendance("10-A", 30, date("2025-01-20"));
        assert_eq!(ca.percentage, 56.3);
    }

    #[test]
    fn class_attendance_survives_oversized_window() {
        let mut store = AttendanceStore::new();
        store.append(vec![record("1", "10", "A", "2025-01-19", AttendanceStatus::Present)]);
        let ca = store.class_attendance("10-A", u32::MAX, date("2025-01-20"));
        assert_eq!(ca.percentage, 100.0);
        assert_eq!(ca.trend, 0.0);
    }

    #[test]
    fn empty_store_stats_are_zero() {
        let store = AttendanceStore::new();
        let s = store.stats(None, None);
        assert_eq!((s.total, s.present, s.absent, s.late), (0, 0, 0, 0));
        assert_eq!(s.percentage, "0");
    }

    #[test]
    fn date_filter_excludes_other_days() {
        let mut store = AttendanceStore::new();
        store.append(vec![
            record("1", "10", "A", "2025-01-20", AttendanceStatus::Present),
            record("2", "10", "A", "2025-01-19", AttendanceStatus::Absent),
            record("3", "9", "B", "2025-01-20", AttendanceStatus::Absent),
        ]);
        let s = store.stats(Some("2025-01-20"), None);
        assert_eq!(s.total, 2);
        assert_eq!(s.present + s.absent + s.late, s.total);
        assert_eq!(s.percentage, "50.0");

        let s = store.stats(Some(""), Some("10-A"));
        assert_eq!(s.total, 2);
    }

    #[test]
    fn malformed_class_section_matches_nothing() {
        let mut store = AttendanceStore::new();
        store.append(vec![record("1", "10", "A", "2025-01-20", AttendanceStatus::Present)]);
        for key in ["10A", "10-", "-A", "10-A-", "10 -A"] {
            assert_eq!(store.stats(None, Some(key)).total, 0, "key {key}");
        }
    }

    #[test]
    fn split_appends_equal_single_append() {
        let a = record("1", "10", "A", "2025-01-20", AttendanceStatus::Present);
        let b = record("1", "10", "A", "2025-01-20", AttendanceStatus::Late);

        let mut split = AttendanceStore::new();
        split.append(vec![a.clone()]);
        split.append(vec![b.clone()]);

        let mut single = AttendanceStore::new();
        assert_eq!(single.append(vec![a, b]), 2);

        assert_eq!(split.records(), single.records());
        assert_eq!(split.stats(None, None), single.stats(None, None));
    }

    #[test]
    fn class_attendance_ignores_records_outside_window() {
        let today = date("2025-03-01");
        let mut store = AttendanceStore::new();
        store.append(vec![
            record("1", "10", "A", "2025-02-20", AttendanceStatus::Present),
            record("2", "10", "A", "2025-01-20", AttendanceStatus::Absent),
            record("3", "10", "A", "not-a-date", AttendanceStatus::Absent),
            record("4", "10", "B", "2025-02-20", AttendanceStatus::Absent),
        ]);
        let ca = store.class_attendance("10-A", 30, today);
        assert_eq!(ca.percentage, 100.0);
        assert_eq!(store.class_attendance("10-A", 30, today), ca);
    }

    #[test]
    fn class_attendance_window_bounds_are_inclusive() {
        let today = date("2025-03-01");
        let mut store = AttendanceStore::new();
        store.append(vec![
            record("1", "10", "A", "2025-03-01", AttendanceStatus::Present),
            record("2", "10", "A", "2025-01-30", AttendanceStatus::Absent),
            record("3", "10", "A", "2025-01-29", AttendanceStatus::Absent),
        ]);
        // 2025-03-01 minus 30 days is 2025-01-30.
        let ca = store.class_attendance("10-A", 30, today);
        assert_eq!(ca.percentage, 50.0);
    }

    #[test]
    fn class_attendance_trend_compares_previous_window() {
        let today = date("2025-03-01");
        let mut store = AttendanceStore::new();
        store.append(vec![
            record("1", "10", "A", "2025-02-27", AttendanceStatus::Present),
            record("2", "10", "A", "2025-02-27", AttendanceStatus::Present),
            record("3", "10", "A", "2025-02-27", AttendanceStatus::Late),
            record("4", "10", "A", "2025-02-27", AttendanceStatus::Absent),
            record("5", "10", "A", "2025-02-20", AttendanceStatus::Present),
            record("6", "10", "A", "2025-02-20", AttendanceStatus::Absent),
        ]);
        // Current [02-22, 03-01] = 75%, previous [02-14, 02-21] = 50%.
        let ca = store.class_attendance("10-A", 7, today);
        assert_eq!(ca.percentage, 75.0);
        assert_eq!(ca.trend, 25.0);
    }

    #[test]
    fn record_filter_combines_all_fields() {
        let mut store = AttendanceStore::new();
        store.append(vec![
            record("1", "10", "A", "2025-01-20", AttendanceStatus::Present),
            record("2", "10", "A", "2025-01-20", AttendanceStatus::Absent),
        ]);
        let filter = RecordFilter {
            student_id: Some("S2".to_string()),
            status: Some(AttendanceStatus::Absent),
            ..RecordFilter::new(Some("2025-01-20"), Some("10-A"))
        };
        let ids: Vec<&str> = store.filtered(&filter).map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(AttendanceStatus::parse(" Late "), Some(AttendanceStatus::Late));
        assert_eq!(AttendanceStatus::parse("excused"), None);
        assert!(AttendanceStatus::Late.counts_as_attended());
        assert!(!AttendanceStatus::Absent.counts_as_attended());
    }
}
