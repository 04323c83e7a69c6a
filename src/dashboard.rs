//! Attendance aggregation for the dashboard endpoints.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceEntry, AttendanceStatus, StatusMark};

/// Days covered by the stats endpoint when no start date is given.
pub const DEFAULT_RANGE_DAYS: u64 = 7;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    #[schema(example = 12)]
    pub total_employees: u64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = 9)]
    pub present: u64,
    #[schema(example = 1)]
    pub absent: u64,
    #[schema(example = 0)]
    pub leave: u64,
    #[schema(example = 2)]
    pub not_marked: u64,
    pub attendance_records: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailyStats {
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub present: u64,
    pub absent: u64,
    pub leave: u64,
}

impl DailyStats {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            present: 0,
            absent: 0,
            leave: 0,
        }
    }

    fn count(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Leave => self.leave += 1,
        }
    }
}

pub fn summarize(
    date: NaiveDate,
    total_employees: u64,
    records: Vec<AttendanceEntry>,
) -> DashboardSummary {
    let mut counts = DailyStats::empty(date);
    for record in &records {
        counts.count(record.status);
    }

    DashboardSummary {
        total_employees,
        date,
        present: counts.present,
        absent: counts.absent,
        leave: counts.leave,
        // stale counts can race a delete; clamp at zero
        not_marked: total_employees.saturating_sub(records.len() as u64),
        attendance_records: records,
    }
}

/// Fill in missing range bounds: `end` defaults to `today`, `start` to the
/// seven days ending at `end`.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let end = end.unwrap_or(today);
    let start = start.unwrap_or_else(|| {
        end.checked_sub_days(Days::new(DEFAULT_RANGE_DAYS - 1))
            .unwrap_or(NaiveDate::MIN)
    });
    (start, end)
}

/// One zeroed bucket per day in `start..=end`, then counted from `marks`.
/// Marks outside the range are ignored. Output is ascending by date.
pub fn daily_stats(start: NaiveDate, end: NaiveDate, marks: &[StatusMark]) -> Vec<DailyStats> {
    let mut buckets = BTreeMap::new();
    let mut current = Some(start);
    while let Some(day) = current.filter(|d| *d <= end) {
        buckets.insert(day, DailyStats::empty(day));
        current = day.succ_opt();
    }

    for mark in marks {
        if let Some(bucket) = buckets.get_mut(&mark.date) {
            bucket.count(mark.status);
        }
    }

    buckets.into_values().collect()
}
