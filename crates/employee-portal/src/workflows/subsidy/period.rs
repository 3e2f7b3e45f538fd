use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::DateRange;

pub const PROBATION_DAYS: i64 = 90;
const DAYS_PER_YEAR: f64 = 365.25;

/// Work-anniversary window that quotas reset on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnniversaryPeriod {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub is_current_period: bool,
    pub fiscal_year: i32,
}

impl AnniversaryPeriod {
    /// Resolves the anniversary period in progress on `now`.
    pub fn resolve(hire_date: NaiveDate, now: NaiveDate) -> Self {
        let mut period_start = anniversary_in(hire_date, now.year());
        if now < period_start {
            period_start = anniversary_in(hire_date, now.year() - 1);
        }
        let period_end = anniversary_in(hire_date, period_start.year() + 1);

        Self {
            period_start,
            period_end,
            is_current_period: now < period_end,
            fiscal_year: period_start.year(),
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.period_start, self.period_end)
    }

    /// The anniversary window immediately before this one.
    ///
    /// Both bounds are anniversaries of `hire_date`, so leap-day hires keep contiguous windows.
    pub fn previous_range(&self, hire_date: NaiveDate) -> DateRange {
        let start = anniversary_in(hire_date, self.period_start.year() - 1);
        DateRange::new(start, self.period_start)
    }
}

/// Hire month/day placed in `year`. A Feb 29 anniversary rolls over to March 1.
fn anniversary_in(hire_date: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, hire_date.month(), hire_date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(hire_date)
}

/// Seniority flags gating subsidy eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceTenure {
    pub days_of_service: i64,
    pub years_of_service: f64,
    pub probation_passed: bool,
    pub one_year_completed: bool,
}

impl ServiceTenure {
    pub fn at(hire_date: NaiveDate, now: NaiveDate) -> Self {
        let days_of_service = days_between(hire_date, now);
        let years_of_service = years_of_service(hire_date, now);

        Self {
            days_of_service,
            years_of_service,
            probation_passed: days_of_service >= PROBATION_DAYS,
            one_year_completed: years_of_service >= 1.0,
        }
    }
}

pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Years since hire rounded to two decimals.
pub fn years_of_service(hire_date: NaiveDate, now: NaiveDate) -> f64 {
    let years = days_between(hire_date, now) as f64 / DAYS_PER_YEAR;
    (years * 100.0).round() / 100.0
}
