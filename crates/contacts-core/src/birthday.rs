//! Birthday arithmetic.
//!
//! Only the month and day of a stored birthday matter. A 29 February birthday
//! is celebrated on 28 February in common years.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, Local, NaiveDate};

/// Forward window used by `get_upcoming_birthdays` unless configured otherwise.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Today's date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// The date on which `birthday` is celebrated in `year`.
fn occurrence_in(birthday: NaiveDate, year: i32) -> NaiveDate {
    birthday
        .with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
        .unwrap_or(birthday)
}

/// Days from `today` until the next celebration of `birthday`.
///
/// Returns 0 when `today` is the birthday; a birthday already passed this
/// year wraps to next year.
pub fn days_to_birthday_from(birthday: NaiveDate, today: NaiveDate) -> i64 {
    let this_year = occurrence_in(birthday, today.year());
    let next = if this_year >= today {
        this_year
    } else {
        occurrence_in(birthday, today.year() + 1)
    };
    (next - today).num_days()
}

/// Days from today (local date) until the next celebration of `birthday`.
pub fn days_to_birthday(birthday: NaiveDate) -> i64 {
    days_to_birthday_from(birthday, today())
}

/// A forward-looking range of calendar days, `start..=start + days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthdayWindow {
    pub start: NaiveDate,
    pub days: u32,
}

impl BirthdayWindow {
    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self { start, days }
    }

    /// Window starting today.
    pub fn from_today(days: u32) -> Self {
        Self::new(today(), days)
    }

    /// Last day covered by the window (inclusive).
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(u64::from(self.days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Whether the next celebration of `birthday` falls inside the window.
    pub fn contains(&self, birthday: NaiveDate) -> bool {
        days_to_birthday_from(birthday, self.start) <= i64::from(self.days)
    }

    /// `MM-DD` keys of every birthday celebrated inside the window, sorted.
    ///
    /// Storage adapters match these against the month/day of the stored
    /// birthday. A window covering 28 February of a common year also
    /// yields `02-29`.
    pub fn month_days(&self) -> Vec<String> {
        let mut keys = BTreeSet::new();
        // A year's worth of days already covers every key.
        let span = self.days.min(366);
        for offset in 0..=span {
            let Some(day) = self.start.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            keys.insert(day.format("%m-%d").to_string());
            if day.month() == 2 && day.day() == 28 && !is_leap_year(day.year()) {
                keys.insert("02-29".to_string());
            }
        }
        keys.into_iter().collect()
    }
}
