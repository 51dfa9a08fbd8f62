//! Fee periods: the (month, year) pair a payment covers.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Years accepted for fee periods. Guards against typo years reaching the
/// database or gateway receipts.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 2000..=2100;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Validation failures for [`FeePeriod::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodValidationError {
    /// Month outside `1..=12`.
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u8),
    /// Year outside the accepted calendar range.
    #[error("year {0} is outside the accepted range")]
    YearOutOfRange(i32),
}

/// A validated calendar month a fee payment covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub struct FeePeriod {
    month: u8,
    year: i32,
}

impl FeePeriod {
    /// Validate a raw (month, year) pair.
    pub fn try_new(month: u8, year: i32) -> Result<Self, PeriodValidationError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodValidationError::MonthOutOfRange(month));
        }
        if !YEAR_RANGE.contains(&year) {
            return Err(PeriodValidationError::YearOutOfRange(year));
        }
        Ok(Self { month, year })
    }

    /// The period containing `now`, used for reminders and dashboards.
    pub fn containing(now: DateTime<Utc>) -> Self {
        // chrono months are always 1..=12 and the year range is generous, so
        // this cannot fail for clock-derived input.
        let month = u8::try_from(now.month()).unwrap_or(1);
        Self {
            month,
            year: now.year(),
        }
    }

    /// Month ordinal in `1..=12`.
    pub fn month(self) -> u8 {
        self.month
    }

    /// Calendar year.
    pub fn year(self) -> i32 {
        self.year
    }

    /// English month name, for emails and report rows.
    pub fn month_name(self) -> &'static str {
        month_name(self.month)
    }

    /// Receipt label sent to the gateway when creating an order.
    pub fn receipt_label(self) -> String {
        format!("month_{}_{}", self.month, self.year)
    }
}

impl std::fmt::Display for FeePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

/// English name for a month ordinal; out-of-range input maps to a placeholder
/// rather than panicking.
pub fn month_name(month: u8) -> &'static str {
    usize::from(month)
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES.get(index))
        .copied()
        .unwrap_or("?")
}
