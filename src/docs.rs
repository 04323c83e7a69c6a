use crate::api::attendance::{
    AttendanceListResponse, EmployeeAttendanceResponse, MarkAttendance, StatsResponse,
};
use crate::api::employee::{CreateEmployee, EmployeeListResponse};
use crate::dashboard::{DailyStats, DashboardSummary};
use crate::model::attendance::{AttendanceEntry, AttendanceRecord, AttendanceStatus};
use crate::model::employee::{Employee, EmployeeBrief, EmployeeRef};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS Lite API",
        version = "1.0.0",
        description = r#"
## HRMS Lite

Employee records and daily attendance.

- **Employees**: add, list, look up by employee code, delete by internal id
- **Attendance**: mark a day as present or absent, list per employee or for everyone
- **Dashboard**: per-day summary and daily counts over a date range

Errors are returned as `{"message": "..."}`.
"#,
    ),
    paths(
        crate::api::employee::add_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::mark_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::employee_attendance,
        crate::api::attendance::dashboard_summary,
        crate::api::attendance::dashboard_stats
    ),
    components(
        schemas(
            CreateEmployee,
            Employee,
            EmployeeRef,
            EmployeeBrief,
            EmployeeListResponse,
            MarkAttendance,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceEntry,
            AttendanceListResponse,
            EmployeeAttendanceResponse,
            DashboardSummary,
            DailyStats,
            StatsResponse
        )
    ),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Dashboard", description = "Attendance statistics"),
    )
)]
pub struct ApiDoc;
