use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::employee::EmployeeBrief;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = "5d2a4b1e-7c3f-4a9b-8e6d-1f2c3b4a5d6e")]
    pub id: String,
    /// Internal key of the employee
    #[schema(example = "0b6f3c9e-8f0d-4c55-9d0e-2f3c1a7b9e21")]
    pub employee_id: String,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "present")]
    pub status: AttendanceStatus,
    #[schema(example = "2026-01-01T09:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Attendance record joined with the employee it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceEntry {
    pub id: String,
    pub employee_id: String,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    pub employee: EmployeeBrief,
}

impl AttendanceEntry {
    pub fn new(record: AttendanceRecord, employee: EmployeeBrief) -> Self {
        Self {
            id: record.id,
            employee_id: record.employee_id,
            date: record.date,
            status: record.status,
            created_at: record.created_at,
            employee,
        }
    }
}

/// Validated request to mark attendance, before the employee is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceMark {
    pub employee_code: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Row ready for insertion, keyed by the employee's internal id.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub employee_key: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Date and status pair used by the range aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMark {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}
