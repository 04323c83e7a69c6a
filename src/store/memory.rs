use chrono::{NaiveDate, Utc};
use futures::future::{self, BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::{
    ATTENDANCE_DAY_KEY, EMPLOYEE_CODE_KEY, EMPLOYEE_EMAIL_KEY, HrStore, StoreError, StoreResult,
};
use crate::model::attendance::{
    AttendanceEntry, AttendanceRecord, NewAttendance, StatusMark,
};
use crate::model::employee::{Employee, EmployeeBrief, NewEmployee};

/// In-process store with the same unique keys and cascade as the MySQL
/// schema. Rows are kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    employees: RwLock<Vec<Employee>>,
    attendance: RwLock<Vec<AttendanceRecord>>,
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
}

/// Latest date first; among equal dates the most recently created first.
fn newest_first(records: &mut [AttendanceRecord]) {
    records.reverse();
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

impl MemoryStore {
    fn insert_employee_now(&self, new: NewEmployee) -> StoreResult<Employee> {
        let mut employees = write(&self.employees)?;

        if employees.iter().any(|e| e.employee_id == new.employee_id) {
            return Err(StoreError::unique(
                EMPLOYEE_CODE_KEY,
                format!("duplicate employee_id '{}'", new.employee_id),
            ));
        }
        if employees.iter().any(|e| e.email == new.email) {
            return Err(StoreError::unique(
                EMPLOYEE_EMAIL_KEY,
                format!("duplicate email '{}'", new.email),
            ));
        }

        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            employee_id: new.employee_id,
            full_name: new.full_name,
            email: new.email,
            department: new.department,
            created_at: Utc::now(),
        };
        employees.push(employee.clone());
        Ok(employee)
    }

    fn list_employees_now(&self) -> StoreResult<Vec<Employee>> {
        let mut employees = read(&self.employees)?.clone();
        employees.reverse();
        employees.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(employees)
    }

    fn find_employee_now(&self, code: &str) -> StoreResult<Option<Employee>> {
        Ok(read(&self.employees)?
            .iter()
            .find(|e| e.employee_id == code)
            .cloned())
    }

    fn delete_employee_now(&self, id: &str) -> StoreResult<bool> {
        let mut employees = write(&self.employees)?;
        let before = employees.len();
        employees.retain(|e| e.id != id);
        if employees.len() == before {
            return Ok(false);
        }

        // ON DELETE CASCADE
        write(&self.attendance)?.retain(|r| r.employee_id != id);
        Ok(true)
    }

    fn insert_attendance_now(&self, new: NewAttendance) -> StoreResult<AttendanceRecord> {
        // held until the push: a delete must not cascade in between
        let employees = read(&self.employees)?;
        if !employees.iter().any(|e| e.id == new.employee_key) {
            return Err(StoreError::Backend(format!(
                "attendance references unknown employee '{}'",
                new.employee_key
            )));
        }

        // same lock order as delete_employee_now: employees, then attendance
        let mut attendance = write(&self.attendance)?;
        if attendance
            .iter()
            .any(|r| r.employee_id == new.employee_key && r.date == new.date)
        {
            return Err(StoreError::unique(
                ATTENDANCE_DAY_KEY,
                format!("duplicate attendance for '{}' on {}", new.employee_key, new.date),
            ));
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            employee_id: new.employee_key,
            date: new.date,
            status: new.status,
            created_at: Utc::now(),
        };
        attendance.push(record.clone());
        Ok(record)
    }

    fn attendance_for_employee_now(
        &self,
        employee_key: &str,
        date: Option<NaiveDate>,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let mut records: Vec<_> = read(&self.attendance)?
            .iter()
            .filter(|r| r.employee_id == employee_key)
            .filter(|r| date.is_none_or(|d| r.date == d))
            .cloned()
            .collect();
        newest_first(&mut records);
        Ok(records)
    }

    fn list_attendance_now(&self, date: Option<NaiveDate>) -> StoreResult<Vec<AttendanceEntry>> {
        let employees: HashMap<String, EmployeeBrief> = read(&self.employees)?
            .iter()
            .map(|e| (e.id.clone(), EmployeeBrief::from(e)))
            .collect();

        let mut records: Vec<_> = read(&self.attendance)?
            .iter()
            .filter(|r| date.is_none_or(|d| r.date == d))
            .cloned()
            .collect();
        newest_first(&mut records);

        // inner join: orphaned rows cannot exist, but skip rather than fail
        Ok(records
            .into_iter()
            .filter_map(|r| {
                let employee = employees.get(&r.employee_id)?.clone();
                Some(AttendanceEntry::new(r, employee))
            })
            .collect())
    }

    fn attendance_between_now(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<StatusMark>> {
        Ok(read(&self.attendance)?
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .map(|r| StatusMark {
                date: r.date,
                status: r.status,
            })
            .collect())
    }
}

impl HrStore for MemoryStore {
    fn insert_employee(&self, employee: NewEmployee) -> BoxFuture<'_, StoreResult<Employee>> {
        future::ready(self.insert_employee_now(employee)).boxed()
    }

    fn list_employees(&self) -> BoxFuture<'_, StoreResult<Vec<Employee>>> {
        future::ready(self.list_employees_now()).boxed()
    }

    fn find_employee_by_code<'a>(
        &'a self,
        code: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<Employee>>> {
        future::ready(self.find_employee_now(code)).boxed()
    }

    fn delete_employee<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<bool>> {
        future::ready(self.delete_employee_now(id)).boxed()
    }

    fn count_employees(&self) -> BoxFuture<'_, StoreResult<u64>> {
        let count = read(&self.employees).map(|e| e.len() as u64);
        future::ready(count).boxed()
    }

    fn insert_attendance(
        &self,
        attendance: NewAttendance,
    ) -> BoxFuture<'_, StoreResult<AttendanceRecord>> {
        future::ready(self.insert_attendance_now(attendance)).boxed()
    }

    fn attendance_for_employee<'a>(
        &'a self,
        employee_key: &'a str,
        date: Option<NaiveDate>,
    ) -> BoxFuture<'a, StoreResult<Vec<AttendanceRecord>>> {
        future::ready(self.attendance_for_employee_now(employee_key, date)).boxed()
    }

    fn list_attendance(
        &self,
        date: Option<NaiveDate>,
    ) -> BoxFuture<'_, StoreResult<Vec<AttendanceEntry>>> {
        future::ready(self.list_attendance_now(date)).boxed()
    }

    fn attendance_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'_, StoreResult<Vec<StatusMark>>> {
        future::ready(self.attendance_between_now(start, end)).boxed()
    }
}
