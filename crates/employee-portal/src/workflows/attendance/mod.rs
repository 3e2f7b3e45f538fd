//! Attendance figures shown next to the subsidy dashboard.

mod offset;

pub use offset::{summarize_hours, AttendanceEntry, AttendanceKind, LeaveOffset, OffsetRow};
