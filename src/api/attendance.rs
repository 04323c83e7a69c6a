use crate::{
    dashboard::{self, DailyStats, DashboardSummary},
    error::ApiError,
    model::attendance::{AttendanceEntry, AttendanceRecord, NewAttendance},
    model::employee::EmployeeRef,
    store::{ATTENDANCE_DAY_KEY, HrStore, StoreError},
    validation::{validate_attendance, validate_range},
};
use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct MarkAttendance {
    /// External employee code
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    /// `present` or `absent`
    #[schema(example = "present")]
    pub status: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateFilter {
    /// Only this date (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2026-01-01")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsRange {
    /// First day, defaults to six days before `end_date`
    #[param(value_type = Option<String>, example = "2026-01-01")]
    pub start_date: Option<NaiveDate>,
    /// Last day, defaults to today
    #[param(value_type = Option<String>, example = "2026-01-07")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeAttendanceResponse {
    pub employee: EmployeeRef,
    pub attendance: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub count: usize,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub attendance: Vec<AttendanceEntry>,
    #[schema(example = 1)]
    pub count: usize,
}

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub daily_stats: Vec<DailyStats>,
}

/// Mark attendance
#[utoipa::path(
    post,
    path = "/attendance",
    request_body = MarkAttendance,
    responses(
        (status = 201, description = "Attendance marked", body = Object, example = json!({
            "message": "Attendance marked successfully",
            "data": {
                "id": "5d2a4b1e-7c3f-4a9b-8e6d-1f2c3b4a5d6e",
                "employee_id": "0b6f3c9e-8f0d-4c55-9d0e-2f3c1a7b9e21",
                "date": "2026-01-01",
                "status": "present",
                "created_at": "2026-01-01T09:00:00Z"
            }
        })),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Already marked for that date", body = Object, example = json!({
            "message": "Attendance already marked for employee 'EMP-001' on 2026-01-01"
        })),
        (status = 422, description = "Invalid status or future date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    store: web::Data<dyn HrStore>,
    payload: web::Json<MarkAttendance>,
) -> Result<HttpResponse, ApiError> {
    let mark = validate_attendance(payload.into_inner(), today())?;

    let employee = store
        .find_employee_by_code(&mark.employee_code)
        .await
        .map_err(|e| ApiError::internal("Error marking attendance", e))?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    let new = NewAttendance {
        employee_key: employee.id,
        date: mark.date,
        status: mark.status,
    };

    match store.insert_attendance(new).await {
        Ok(record) => {
            info!(
                employee_id = %mark.employee_code,
                date = %record.date,
                status = %record.status,
                "Attendance marked"
            );
            Ok(HttpResponse::Created().json(json!({
                "message": "Attendance marked successfully",
                "data": record
            })))
        }
        Err(StoreError::UniqueViolation {
            constraint,
            message,
        }) => {
            debug!(?constraint, employee_id = %mark.employee_code, "Duplicate attendance");
            Err(ApiError::Conflict(match constraint.as_deref() {
                Some(ATTENDANCE_DAY_KEY) => format!(
                    "Attendance already marked for employee '{}' on {}",
                    mark.employee_code, mark.date
                ),
                _ => format!("Conflict: {message}"),
            }))
        }
        Err(e) => Err(ApiError::internal("Error marking attendance", e)),
    }
}

/// Attendance of one employee
#[utoipa::path(
    get,
    path = "/attendance/{employee_id}",
    params(
        ("employee_id", Path, description = "External employee code"),
        DateFilter
    ),
    responses(
        (status = 200, description = "Employee with records, latest first", body = EmployeeAttendanceResponse),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn employee_attendance(
    store: web::Data<dyn HrStore>,
    path: web::Path<String>,
    query: web::Query<DateFilter>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();

    let employee = store
        .find_employee_by_code(&code)
        .await
        .map_err(|e| ApiError::internal("Error fetching attendance", e))?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    let attendance = store
        .attendance_for_employee(&employee.id, query.date)
        .await
        .map_err(|e| ApiError::internal("Error fetching attendance", e))?;

    Ok(HttpResponse::Ok().json(EmployeeAttendanceResponse {
        employee: EmployeeRef::from(&employee),
        count: attendance.len(),
        attendance,
    }))
}

/// List all attendance
#[utoipa::path(
    get,
    path = "/attendance",
    params(DateFilter),
    responses(
        (status = 200, description = "Records joined with employee, latest first", body = AttendanceListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    store: web::Data<dyn HrStore>,
    query: web::Query<DateFilter>,
) -> Result<HttpResponse, ApiError> {
    let attendance = store
        .list_attendance(query.date)
        .await
        .map_err(|e| ApiError::internal("Error fetching attendance records", e))?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        count: attendance.len(),
        attendance,
    }))
}

/// Dashboard summary for one day
#[utoipa::path(
    get,
    path = "/attendance/dashboard/summary",
    params(DateFilter),
    responses(
        (status = 200, description = "Counts per status", body = DashboardSummary),
        (status = 500, description = "Internal server error")
    ),
    tag = "Dashboard"
)]
pub async fn dashboard_summary(
    store: web::Data<dyn HrStore>,
    query: web::Query<DateFilter>,
) -> Result<HttpResponse, ApiError> {
    let date = query.date.unwrap_or_else(today);

    let total = store
        .count_employees()
        .await
        .map_err(|e| ApiError::internal("Error fetching dashboard summary", e))?;
    let records = store
        .list_attendance(Some(date))
        .await
        .map_err(|e| ApiError::internal("Error fetching dashboard summary", e))?;

    Ok(HttpResponse::Ok().json(dashboard::summarize(date, total, records)))
}

/// Daily counts over a date range
#[utoipa::path(
    get,
    path = "/attendance/dashboard/stats",
    params(StatsRange),
    responses(
        (status = 200, description = "One bucket per day, ascending", body = StatsResponse),
        (status = 422, description = "start_date after end_date or range longer than 366 days"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Dashboard"
)]
pub async fn dashboard_stats(
    store: web::Data<dyn HrStore>,
    query: web::Query<StatsRange>,
) -> Result<HttpResponse, ApiError> {
    let (start_date, end_date) = dashboard::resolve_range(query.start_date, query.end_date, today());
    validate_range(start_date, end_date)?;

    let marks = store
        .attendance_between(start_date, end_date)
        .await
        .map_err(|e| ApiError::internal("Error fetching dashboard stats", e))?;

    Ok(HttpResponse::Ok().json(StatsResponse {
        start_date,
        end_date,
        daily_stats: dashboard::daily_stats(start_date, end_date, &marks),
    }))
}
