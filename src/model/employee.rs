use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "0b6f3c9e-8f0d-4c55-9d0e-2f3c1a7b9e21",
        "employee_id": "EMP-001",
        "full_name": "John Doe",
        "email": "john.doe@company.com",
        "department": "Engineering",
        "created_at": "2026-01-01T09:00:00Z"
    })
)]
pub struct Employee {
    /// Internal key, used by delete
    #[schema(example = "0b6f3c9e-8f0d-4c55-9d0e-2f3c1a7b9e21")]
    pub id: String,

    /// External employee code, unique
    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "John Doe")]
    pub full_name: String,

    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(
        example = "2026-01-01T09:00:00Z",
        value_type = String,
        format = "date-time"
    )]
    pub created_at: DateTime<Utc>,
}

/// Validated, trimmed input for a new employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
}

/// Employee identity returned alongside their attendance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmployeeRef {
    #[schema(example = "0b6f3c9e-8f0d-4c55-9d0e-2f3c1a7b9e21")]
    pub id: String,
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
}

impl From<&Employee> for EmployeeRef {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id.clone(),
            employee_id: employee.employee_id.clone(),
            full_name: employee.full_name.clone(),
        }
    }
}

/// Employee attributes joined into attendance listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmployeeBrief {
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
    #[schema(example = "Engineering")]
    pub department: String,
}

impl From<&Employee> for EmployeeBrief {
    fn from(employee: &Employee) -> Self {
        Self {
            employee_id: employee.employee_id.clone(),
            full_name: employee.full_name.clone(),
            department: employee.department.clone(),
        }
    }
}
