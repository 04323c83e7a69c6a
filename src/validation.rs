//! Request validation. Each function consumes a raw request body and returns
//! the trimmed, typed value the handlers pass on to the store.

use chrono::NaiveDate;
use derive_more::Display;
use std::str::FromStr;
use validator::ValidateEmail;

use crate::api::attendance::MarkAttendance;
use crate::api::employee::CreateEmployee;
use crate::model::attendance::{AttendanceMark, AttendanceStatus};
use crate::model::employee::NewEmployee;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "{}: {}", field, message)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::error::Error for ValidationError {}

/// `ValidateEmail` accepts single-label domains such as `localhost`; a
/// deliverable address needs at least one dot between non-empty labels.
fn has_dotted_domain(email: &str) -> bool {
    email.rsplit_once('@').is_some_and(|(_, domain)| {
        domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
    })
}

fn required(field: &'static str, value: &str, message: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, message));
    }
    Ok(trimmed.to_string())
}

pub fn validate_new_employee(body: CreateEmployee) -> Result<NewEmployee, ValidationError> {
    let employee_id = required("employee_id", &body.employee_id, "Employee ID cannot be empty")?;
    let full_name = required("full_name", &body.full_name, "Full name cannot be empty")?;
    let email = required("email", &body.email, "Email cannot be empty")?;
    if !email.validate_email() || !has_dotted_domain(&email) {
        return Err(ValidationError::new(
            "email",
            "value is not a valid email address",
        ));
    }
    let department = required("department", &body.department, "Department cannot be empty")?;

    Ok(NewEmployee {
        employee_id,
        full_name,
        email,
        department,
    })
}

/// Only `present` and `absent` can be marked; `leave` is stored but not
/// accepted from this endpoint.
pub fn parse_mark_status(raw: &str) -> Result<AttendanceStatus, ValidationError> {
    match AttendanceStatus::from_str(raw) {
        Ok(status @ (AttendanceStatus::Present | AttendanceStatus::Absent)) => Ok(status),
        _ => Err(ValidationError::new(
            "status",
            r#"Status must be either "present" or "absent""#,
        )),
    }
}

pub fn validate_attendance(
    body: MarkAttendance,
    today: NaiveDate,
) -> Result<AttendanceMark, ValidationError> {
    let employee_code = required("employee_id", &body.employee_id, "Employee ID cannot be empty")?;
    let status = parse_mark_status(&body.status)?;
    if body.date > today {
        return Err(ValidationError::new(
            "date",
            "Cannot mark attendance for future dates",
        ));
    }

    Ok(AttendanceMark {
        employee_code,
        date: body.date,
        status,
    })
}

/// Longest stats range, counted in daily buckets including both ends.
pub const MAX_RANGE_DAYS: i64 = 366;

pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if start > end {
        return Err(ValidationError::new(
            "start_date",
            "start_date cannot be after end_date",
        ));
    }
    if (end - start).num_days() + 1 > MAX_RANGE_DAYS {
        return Err(ValidationError::new(
            "start_date",
            format!("Date range cannot exceed {MAX_RANGE_DAYS} days"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(code: &str, name: &str, email: &str, dept: &str) -> CreateEmployee {
        CreateEmployee {
            employee_id: code.to_string(),
            full_name: name.to_string(),
            email: email.to_string(),
            department: dept.to_string(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn employee_fields_are_trimmed() {
        let new = validate_new_employee(employee(
            "  EMP-7 ",
            " Ada Lovelace",
            "ada@example.com ",
            " R&D ",
        ))
        .unwrap();

        assert_eq!(new.employee_id, "EMP-7");
        assert_eq!(new.full_name, "Ada Lovelace");
        assert_eq!(new.email, "ada@example.com");
        assert_eq!(new.department, "R&D");
    }

    #[test]
    fn blank_employee_fields_are_rejected() {
        let err = validate_new_employee(employee("   ", "Ada", "ada@example.com", "R&D")).unwrap_err();
        assert_eq!(err.field, "employee_id");

        let err = validate_new_employee(employee("E1", "", "ada@example.com", "R&D")).unwrap_err();
        assert_eq!(err.field, "full_name");

        let err = validate_new_employee(employee("E1", "Ada", "ada@example.com", "\t")).unwrap_err();
        assert_eq!(err.to_string(), "department: Department cannot be empty");
    }

    #[test]
    fn malformed_email_is_rejected() {
        for bad in [
            "ada",
            "ada@",
            "@example.com",
            "ada example@x.com",
            "ada@localhost",
            "ada@example.",
        ] {
            let err = validate_new_employee(employee("E1", "Ada", bad, "R&D")).unwrap_err();
            assert_eq!(err.field, "email", "accepted {bad:?}");
        }
    }

    #[test]
    fn leave_and_unknown_statuses_cannot_be_marked() {
        assert_eq!(parse_mark_status("present").unwrap(), AttendanceStatus::Present);
        assert_eq!(parse_mark_status("absent").unwrap(), AttendanceStatus::Absent);
        assert!(parse_mark_status("leave").is_err());
        assert!(parse_mark_status("PRESENT").is_err());
        assert!(parse_mark_status("").is_err());
    }

    #[test]
    fn future_dates_are_rejected() {
        let today = day("2026-03-10");
        let body = MarkAttendance {
            employee_id: "E1".into(),
            date: day("2026-03-11"),
            status: "present".into(),
        };
        let err = validate_attendance(body, today).unwrap_err();
        assert_eq!(err.field, "date");

        let body = MarkAttendance {
            employee_id: " E1 ".into(),
            date: today,
            status: "absent".into(),
        };
        let mark = validate_attendance(body, today).unwrap();
        assert_eq!(mark.employee_code, "E1");
        assert_eq!(mark.status, AttendanceStatus::Absent);
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(validate_range(day("2026-03-01"), day("2026-03-01")).is_ok());
        assert!(validate_range(day("2026-03-02"), day("2026-03-01")).is_err());
    }

    #[test]
    fn range_is_capped_at_max_days() {
        // 2024 is a leap year: 2024-01-01..=2024-12-31 is exactly 366 days
        assert!(validate_range(day("2024-01-01"), day("2024-12-31")).is_ok());

        let err = validate_range(day("2024-01-01"), day("2025-01-01")).unwrap_err();
        assert_eq!(err.field, "start_date");
        assert_eq!(err.message, "Date range cannot exceed 366 days");

        assert!(validate_range(NaiveDate::MIN, NaiveDate::MAX).is_err());
    }
}
