use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::export::CsvRecord;
use crate::workflows::subsidy::domain::{DateRange, UserId};

/// Recorded attendance event measured in hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub kind: AttendanceKind,
    pub hours: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceKind {
    /// Overtime that may be swapped for time off.
    ReplaceableOvertime,
    /// Overtime paid out, never offset.
    PaidOvertime,
    PersonalLeave,
}

/// Overtime and personal leave after reconciling one against the other.
///
/// The smaller of the two sums is the offset and is removed from both totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveOffset {
    pub overtime_hours: Decimal,
    pub personal_leave_hours: Decimal,
    pub offset_hours: Decimal,
    pub overtime_after_offset: Decimal,
    pub personal_leave_after_offset: Decimal,
}

impl LeaveOffset {
    pub fn reconcile(overtime_hours: Decimal, personal_leave_hours: Decimal) -> Self {
        let overtime_hours = overtime_hours.max(Decimal::ZERO);
        let personal_leave_hours = personal_leave_hours.max(Decimal::ZERO);
        let offset_hours = overtime_hours.min(personal_leave_hours);

        Self {
            overtime_hours,
            personal_leave_hours,
            offset_hours,
            overtime_after_offset: overtime_hours - offset_hours,
            personal_leave_after_offset: personal_leave_hours - offset_hours,
        }
    }
}

/// Sums one user's replaceable overtime and personal leave inside `range`, then reconciles.
pub fn summarize_hours(entries: &[AttendanceEntry], user_id: &UserId, range: DateRange) -> LeaveOffset {
    let (overtime, leave) = entries
        .iter()
        .filter(|entry| entry.user_id == *user_id && range.contains(entry.date))
        .fold((Decimal::ZERO, Decimal::ZERO), |(overtime, leave), entry| {
            match entry.kind {
                AttendanceKind::ReplaceableOvertime => (overtime + entry.hours, leave),
                AttendanceKind::PersonalLeave => (overtime, leave + entry.hours),
                AttendanceKind::PaidOvertime => (overtime, leave),
            }
        });

    LeaveOffset::reconcile(overtime, leave)
}

/// Statistics export row for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffsetRow {
    pub user_id: UserId,
    pub offset: LeaveOffset,
}

impl CsvRecord for OffsetRow {
    const HEADERS: &'static [&'static str] = &[
        "user_id",
        "overtime_hours",
        "personal_leave_hours",
        "offset_hours",
        "overtime_after_offset",
        "personal_leave_after_offset",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.user_id.0.clone(),
            self.offset.overtime_hours.to_string(),
            self.offset.personal_leave_hours.to_string(),
            self.offset.offset_hours.to_string(),
            self.offset.overtime_after_offset.to_string(),
            self.offset.personal_leave_after_offset.to_string(),
        ]
    }
}
