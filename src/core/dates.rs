use chrono::{Datelike, Days, Months, NaiveDate};

use super::types::MonthOverflow;

/// Shift `date` forward by whole calendar months.
///
/// Returns `None` only when the result falls outside chrono's calendar range.
pub fn add_months(date: NaiveDate, months: u32, overflow: MonthOverflow) -> Option<NaiveDate> {
    match overflow {
        MonthOverflow::Clamp => date.checked_add_months(Months::new(months)),
        MonthOverflow::Rollover => {
            let month_start = date.with_day(1)?.checked_add_months(Months::new(months))?;
            month_start.checked_add_days(Days::new(u64::from(date.day() - 1)))
        }
    }
}

/// Whole-month difference `later - earlier`, ignoring the day of month.
///
/// Negative when `later` is in an earlier month than `earlier`.
pub fn months_between(later: NaiveDate, earlier: NaiveDate) -> i32 {
    (later.year() - earlier.year()) * 12 + (later.month() as i32 - earlier.month() as i32)
}
