use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use futures::future::BoxFuture;
use sqlx::{FromRow, MySql, MySqlPool, QueryBuilder};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use super::{HrStore, StoreError, StoreResult};
use crate::model::attendance::{
    AttendanceEntry, AttendanceRecord, AttendanceStatus, NewAttendance, StatusMark,
};
use crate::model::employee::{Employee, EmployeeBrief, NewEmployee};

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let message = db_err.message().to_string();
                let constraint = db_err
                    .constraint()
                    .map(str::to_string)
                    .or_else(|| duplicate_key_name(&message));
                return StoreError::UniqueViolation {
                    constraint,
                    message,
                };
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// MySQL reports the key only in the message:
/// `Duplicate entry 'EMP-1' for key 'employees.uq_employees_employee_id'`.
/// Older servers omit the table prefix.
fn duplicate_key_name(message: &str) -> Option<String> {
    let (_, rest) = message.rsplit_once("for key '")?;
    let key = rest.strip_suffix('\'').unwrap_or(rest);
    let key = key.rsplit('.').next().unwrap_or(key);
    (!key.is_empty()).then(|| key.to_string())
}

fn parse_status(raw: &str) -> StoreResult<AttendanceStatus> {
    AttendanceStatus::from_str(raw)
        .map_err(|_| StoreError::Backend(format!("unknown attendance status '{raw}'")))
}

#[derive(FromRow)]
struct AttendanceRow {
    id: String,
    employee_id: String,
    date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> StoreResult<Self> {
        Ok(Self {
            status: parse_status(&row.status)?,
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct AttendanceEntryRow {
    id: String,
    employee_id: String,
    date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
    employee_code: String,
    full_name: String,
    department: String,
}

impl TryFrom<AttendanceEntryRow> for AttendanceEntry {
    type Error = StoreError;

    fn try_from(row: AttendanceEntryRow) -> StoreResult<Self> {
        Ok(Self {
            status: parse_status(&row.status)?,
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            created_at: row.created_at,
            employee: EmployeeBrief {
                employee_id: row.employee_code,
                full_name: row.full_name,
                department: row.department,
            },
        })
    }
}

// TIMESTAMP(6) keeps microseconds; truncate so the returned row matches storage
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl HrStore for MySqlStore {
    fn insert_employee(&self, employee: NewEmployee) -> BoxFuture<'_, StoreResult<Employee>> {
        Box::pin(async move {
            let employee = Employee {
                id: Uuid::new_v4().to_string(),
                employee_id: employee.employee_id,
                full_name: employee.full_name,
                email: employee.email,
                department: employee.department,
                created_at: now(),
            };

            sqlx::query(
                r#"
                INSERT INTO employees (id, employee_id, full_name, email, department, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&employee.id)
            .bind(&employee.employee_id)
            .bind(&employee.full_name)
            .bind(&employee.email)
            .bind(&employee.department)
            .bind(employee.created_at)
            .execute(&self.pool)
            .await?;

            Ok(employee)
        })
    }

    fn list_employees(&self) -> BoxFuture<'_, StoreResult<Vec<Employee>>> {
        Box::pin(async move {
            let employees = sqlx::query_as::<_, Employee>(
                r#"
                SELECT id, employee_id, full_name, email, department, created_at
                FROM employees
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(employees)
        })
    }

    fn find_employee_by_code<'a>(
        &'a self,
        code: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<Employee>>> {
        Box::pin(async move {
            let employee = sqlx::query_as::<_, Employee>(
                r#"
                SELECT id, employee_id, full_name, email, department, created_at
                FROM employees
                WHERE employee_id = ?
                "#,
            )
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
            Ok(employee)
        })
    }

    fn delete_employee<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<bool>> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM employees WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn count_employees(&self) -> BoxFuture<'_, StoreResult<u64>> {
        Box::pin(async move {
            let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
                .fetch_one(&self.pool)
                .await?;
            Ok(u64::try_from(total).unwrap_or(0))
        })
    }

    fn insert_attendance(
        &self,
        attendance: NewAttendance,
    ) -> BoxFuture<'_, StoreResult<AttendanceRecord>> {
        Box::pin(async move {
            let record = AttendanceRecord {
                id: Uuid::new_v4().to_string(),
                employee_id: attendance.employee_key,
                date: attendance.date,
                status: attendance.status,
                created_at: now(),
            };

            sqlx::query(
                r#"
                INSERT INTO attendance (id, employee_id, date, status, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.id)
            .bind(&record.employee_id)
            .bind(record.date)
            .bind(record.status.to_string())
            .bind(record.created_at)
            .execute(&self.pool)
            .await?;

            Ok(record)
        })
    }

    fn attendance_for_employee<'a>(
        &'a self,
        employee_key: &'a str,
        date: Option<NaiveDate>,
    ) -> BoxFuture<'a, StoreResult<Vec<AttendanceRecord>>> {
        Box::pin(async move {
            let mut query = QueryBuilder::<MySql>::new(
                "SELECT id, employee_id, date, status, created_at FROM attendance WHERE employee_id = ",
            );
            query.push_bind(employee_key);
            if let Some(date) = date {
                query.push(" AND date = ").push_bind(date);
            }
            query.push(" ORDER BY date DESC, created_at DESC");

            debug!(sql = %query.sql(), employee_key, ?date, "Fetching employee attendance");

            query
                .build_query_as::<AttendanceRow>()
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(AttendanceRecord::try_from)
                .collect()
        })
    }

    fn list_attendance(
        &self,
        date: Option<NaiveDate>,
    ) -> BoxFuture<'_, StoreResult<Vec<AttendanceEntry>>> {
        Box::pin(async move {
            let mut query = QueryBuilder::<MySql>::new(
                r#"
                SELECT a.id, a.employee_id, a.date, a.status, a.created_at,
                       e.employee_id AS employee_code, e.full_name, e.department
                FROM attendance a
                JOIN employees e ON e.id = a.employee_id
                "#,
            );
            if let Some(date) = date {
                query.push(" WHERE a.date = ").push_bind(date);
            }
            query.push(" ORDER BY a.date DESC, a.created_at DESC");

            debug!(sql = %query.sql(), ?date, "Listing attendance");

            query
                .build_query_as::<AttendanceEntryRow>()
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(AttendanceEntry::try_from)
                .collect()
        })
    }

    fn attendance_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'_, StoreResult<Vec<StatusMark>>> {
        Box::pin(async move {
            let rows = sqlx::query_as::<_, (NaiveDate, String)>(
                "SELECT date, status FROM attendance WHERE date BETWEEN ? AND ?",
            )
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

            rows.into_iter()
                .map(|(date, status)| {
                    Ok(StatusMark {
                        date,
                        status: parse_status(&status)?,
                    })
                })
                .collect()
        })
    }
}
