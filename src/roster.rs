use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub class: String,
    pub section: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<String>,
}

impl Student {
    pub fn class_section_key(&self) -> String {
        format!("{}-{}", self.class, self.section)
    }

    fn matches_search(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower) || self.roll_number.contains(needle_lower)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSectionSummary {
    pub key: String,
    pub class: String,
    pub section: String,
    pub student_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("student id already exists: {0}")]
    DuplicateId(String),
}

/// Students known to this session. Insertion order is kept; listings sort on read.
#[derive(Debug, Default)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn get(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Adds a student, assigning a fresh id when none was given.
    pub fn add(&mut self, mut student: Student) -> Result<String, RosterError> {
        student.name = student.name.trim().to_string();
        student.class = student.class.trim().to_string();
        student.section = student.section.trim().to_string();
        if student.name.is_empty() {
            return Err(RosterError::MissingField("name"));
        }
        if student.class.is_empty() {
            return Err(RosterError::MissingField("class"));
        }
        if student.section.is_empty() {
            return Err(RosterError::MissingField("section"));
        }
        if student.id.trim().is_empty() {
            student.id = uuid::Uuid::new_v4().to_string();
        }
        if self.get(&student.id).is_some() {
            return Err(RosterError::DuplicateId(student.id));
        }
        let id = student.id.clone();
        self.students.push(student);
        Ok(id)
    }

    /// Students sorted by class-section then roll number, optionally narrowed by
    /// class-section and a name / roll-number search.
    pub fn list(&self, class_section: Option<&str>, search: Option<&str>) -> Vec<&Student> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let mut out: Vec<&Student> = self
            .students
            .iter()
            .filter(|s| class_section.map_or(true, |k| s.class_section_key() == k))
            .filter(|s| needle.as_deref().map_or(true, |n| s.matches_search(n)))
            .collect();
        out.sort_by(|a, b| compare_roster_order(a, b));
        out
    }

    pub fn classes(&self) -> Vec<ClassSectionSummary> {
        let mut by_key: BTreeMap<String, ClassSectionSummary> = BTreeMap::new();
        for s in &self.students {
            by_key
                .entry(s.class_section_key())
                .or_insert_with(|| ClassSectionSummary {
                    key: s.class_section_key(),
                    class: s.class.clone(),
                    section: s.section.clone(),
                    student_count: 0,
                })
                .student_count += 1;
        }
        by_key.into_values().collect()
    }
}

fn compare_roster_order(a: &Student, b: &Student) -> Ordering {
    a.class_section_key()
        .cmp(&b.class_section_key())
        .then_with(|| compare_roll_numbers(&a.roll_number, &b.roll_number))
        .then_with(|| a.name.cmp(&b.name))
}

// Numeric roll numbers sort numerically so "2" precedes "10".
fn compare_roll_numbers(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
