//! Weekday index conversion.
//!
//! Custody plans number weekdays Monday-first: `0` = Monday .. `6` = Sunday.
//! Most calendar sources (JavaScript `Date::getDay`, cron, many UI pickers)
//! number them Sunday-first. Every conversion between the two goes through
//! this module; nothing else in the crate does weekday arithmetic by hand.

use chrono::{Datelike, NaiveDate, Weekday};

/// Monday-first weekday index, `0..=6`.
pub type WeekdayIndex = u8;

pub const MONDAY: WeekdayIndex = 0;
pub const SUNDAY: WeekdayIndex = 6;

/// Monday-first index of `date`'s weekday.
pub fn weekday_index(date: NaiveDate) -> WeekdayIndex {
    index_of(date.weekday())
}

/// Monday-first index of a chrono [`Weekday`].
pub fn index_of(weekday: Weekday) -> WeekdayIndex {
    weekday.num_days_from_monday() as WeekdayIndex
}

/// Convert a Sunday-first index (`0` = Sunday) to a Monday-first one.
///
/// Values outside `0..=6` are reduced modulo 7 first.
///
/// ```
/// use custody_engine::weekday::from_sunday_first;
///
/// assert_eq!(from_sunday_first(0), 6); // Sunday
/// assert_eq!(from_sunday_first(1), 0); // Monday
/// ```
pub fn from_sunday_first(native: u8) -> WeekdayIndex {
    (native % 7 + 6) % 7
}

/// Convert a Monday-first index back to the Sunday-first convention.
pub fn to_sunday_first(index: WeekdayIndex) -> u8 {
    (index % 7 + 1) % 7
}

/// Whether `index` is a valid Monday-first weekday index.
pub fn is_valid(index: WeekdayIndex) -> bool {
    index <= SUNDAY
}
