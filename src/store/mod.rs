//! Storage abstraction for employees and attendance.
//!
//! Handlers only see `dyn HrStore`. The MySQL implementation talks to the
//! hosted database; the in-memory one enforces the same unique keys and is
//! used for local runs and tests.

pub mod memory;
pub mod mysql;

use chrono::NaiveDate;
use derive_more::Display;
use futures::future::BoxFuture;
use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

use crate::config::{Config, StoreBackend};
use crate::db::init_db;
use crate::model::attendance::{AttendanceEntry, AttendanceRecord, NewAttendance, StatusMark};
use crate::model::employee::{Employee, NewEmployee};

use self::memory::MemoryStore;
use self::mysql::MySqlStore;

/// Unique key on `employees.employee_id`.
pub const EMPLOYEE_CODE_KEY: &str = "uq_employees_employee_id";
/// Unique key on `employees.email`.
pub const EMPLOYEE_EMAIL_KEY: &str = "uq_employees_email";
/// Unique key on `attendance (employee_id, date)`.
pub const ATTENDANCE_DAY_KEY: &str = "uq_attendance_employee_date";

#[derive(Debug, Display)]
pub enum StoreError {
    /// A unique key rejected the write. `constraint` is the key name when
    /// the backend reports one.
    #[display(fmt = "{}", message)]
    UniqueViolation {
        constraint: Option<String>,
        message: String,
    },
    #[display(fmt = "{}", _0)]
    Backend(String),
}

impl StoreError {
    pub fn unique(constraint: &str, message: impl Into<String>) -> Self {
        StoreError::UniqueViolation {
            constraint: Some(constraint.to_string()),
            message: message.into(),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait HrStore: Send + Sync + 'static {
    fn insert_employee(&self, employee: NewEmployee) -> BoxFuture<'_, StoreResult<Employee>>;

    /// Newest first.
    fn list_employees(&self) -> BoxFuture<'_, StoreResult<Vec<Employee>>>;

    fn find_employee_by_code<'a>(
        &'a self,
        code: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<Employee>>>;

    /// Returns `false` when no employee had this internal key.
    fn delete_employee<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<bool>>;

    fn count_employees(&self) -> BoxFuture<'_, StoreResult<u64>>;

    fn insert_attendance(
        &self,
        attendance: NewAttendance,
    ) -> BoxFuture<'_, StoreResult<AttendanceRecord>>;

    /// Records of one employee, latest date first.
    fn attendance_for_employee<'a>(
        &'a self,
        employee_key: &'a str,
        date: Option<NaiveDate>,
    ) -> BoxFuture<'a, StoreResult<Vec<AttendanceRecord>>>;

    /// All records joined with their employee, latest date first.
    fn list_attendance(
        &self,
        date: Option<NaiveDate>,
    ) -> BoxFuture<'_, StoreResult<Vec<AttendanceEntry>>>;

    /// Date and status of every record in `start..=end`.
    fn attendance_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'_, StoreResult<Vec<StatusMark>>>;
}

/// Build the store selected by `STORE_BACKEND`.
pub async fn connect(config: &Config) -> anyhow::Result<Arc<dyn HrStore>> {
    match config.store_backend {
        StoreBackend::Mysql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the mysql backend")?;
            let pool = init_db(url, config.database_max_connections)
                .await
                .context("Failed to connect to database")?;
            Ok(Arc::new(MySqlStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store, data is lost on restart");
            Ok(Arc::new(MemoryStore::default()))
        }
    }
}
