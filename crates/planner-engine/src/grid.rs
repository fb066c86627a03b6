//! Calendar grid helpers for month and week views.
//!
//! Weeks start on Sunday.

use chrono::{Datelike, Days, NaiveDate};

/// Every day of `date`'s month, in order.
pub fn days_in_month(date: NaiveDate) -> Vec<NaiveDate> {
    let first = first_of_month(date);
    first
        .iter_days()
        .take_while(|day| day.month() == first.month())
        .collect()
}

/// The Sunday-to-Saturday week containing `date`.
pub fn days_in_week(date: NaiveDate) -> Vec<NaiveDate> {
    week_start(date).iter_days().take(7).collect()
}

/// The days shown by a month view: from the Sunday on or before the 1st to
/// the Saturday on or after the last day. Always whole weeks.
pub fn month_grid(date: NaiveDate) -> Vec<NaiveDate> {
    let first = first_of_month(date);
    let last = days_in_month(date).last().copied().unwrap_or(first);
    let end = week_end(last);
    week_start(first)
        .iter_days()
        .take_while(|day| *day <= end)
        .collect()
}

pub fn is_same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn week_start(date: NaiveDate) -> NaiveDate {
    let back = Days::new(u64::from(date.weekday().num_days_from_sunday()));
    date.checked_sub_days(back).unwrap_or(NaiveDate::MIN)
}

fn week_end(date: NaiveDate) -> NaiveDate {
    let ahead = Days::new(u64::from(6 - date.weekday().num_days_from_sunday()));
    date.checked_add_days(ahead).unwrap_or(NaiveDate::MAX)
}
