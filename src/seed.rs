use crate::roster::{Roster, Student};
use crate::store::{AttendanceRecord, AttendanceStatus, AttendanceStore};

const SAMPLE_STUDENTS: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("1", "Harpreet Kaur", "01", "Gurmeet Singh", "9876543211", "Amritsar"),
    ("2", "Simran Singh", "02", "Jasbir Kaur", "9876543213", "Ludhiana"),
    ("3", "Arjun Sharma", "03", "Rajesh Sharma", "9876543215", "Jalandhar"),
    ("4", "Priya Patel", "04", "Suresh Patel", "9876543217", "Chandigarh"),
    ("5", "Gurdeep Kaur", "05", "Manjit Singh", "9876543219", "Patiala"),
];

// (id, student id, date, status, subject, teacher, time)
const SAMPLE_RECORDS: &[(&str, &str, &str, AttendanceStatus, &str, &str, &str)] = &[
    ("1", "1", "2025-01-20", AttendanceStatus::Present, "Mathematics", "T001", "09:15"),
    ("2", "2", "2025-01-20", AttendanceStatus::Late, "Mathematics", "T001", "09:25"),
    ("3", "3", "2025-01-20", AttendanceStatus::Absent, "Mathematics", "T001", "09:15"),
    ("4", "1", "2025-01-19", AttendanceStatus::Present, "Science", "T001", "10:15"),
    ("5", "2", "2025-01-19", AttendanceStatus::Present, "Science", "T001", "10:15"),
    ("6", "4", "2025-01-18", AttendanceStatus::Absent, "English", "T002", "11:15"),
    ("7", "5", "2025-01-18", AttendanceStatus::Present, "English", "T002", "11:15"),
];

fn sample_student(row: &(&str, &str, &str, &str, &str, &str)) -> Student {
    let (id, name, roll, parent, parent_phone, address) = *row;
    let first = name.split_whitespace().next().unwrap_or(name).to_lowercase();
    Student {
        id: id.to_string(),
        name: name.to_string(),
        class: "10".to_string(),
        section: "A".to_string(),
        roll_number: roll.to_string(),
        email: Some(format!("{}@example.com", first)),
        phone: None,
        parent_name: Some(parent.to_string()),
        parent_phone: Some(parent_phone.to_string()),
        address: Some(address.to_string()),
        admission_date: Some("2023-04-01".to_string()),
    }
}

/// Loads the demo class 10-A and its first week of records.
pub fn load_sample_data(roster: &mut Roster, store: &mut AttendanceStore) -> anyhow::Result<()> {
    for row in SAMPLE_STUDENTS {
        roster
            .add(sample_student(row))
            .map_err(|e| anyhow::anyhow!("seed roster: {}", e))?;
    }

    let records = SAMPLE_RECORDS
        .iter()
        .map(|&(id, student_id, date, status, subject, teacher_id, time)| {
            let student_name = roster
                .get(student_id)
                .map(|s| s.name.clone())
                .unwrap_or_default();
            AttendanceRecord {
                id: id.to_string(),
                student_id: student_id.to_string(),
                student_name,
                class: "10".to_string(),
                section: "A".to_string(),
                date: date.to_string(),
                status,
                subject: subject.to_string(),
                teacher_id: teacher_id.to_string(),
                time_marked: time.to_string(),
            }
        })
        .collect::<Vec<_>>();
    store.append(records);
    Ok(())
}
