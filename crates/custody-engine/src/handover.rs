//! Handover computation.
//!
//! - [`next_handover_date`]: the next moment custody changes hands
//! - [`handover_candidates`]: the dates in a range that fall on a handover weekday
//! - [`list_transfer_dates_in_range`]: the candidates on which custody actually
//!   moves, with who hands over to whom
//!
//! All three read the same [`CustodyPlan`] the resolver reads; none of them
//! consult a clock.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::trace;

use crate::plan::{CustodyPlan, ParentId, Pattern};
use crate::resolver::{days_since_start, resolve_custody_holder};
use crate::weekday::{weekday_index, WeekdayIndex};

/// How many days past the starting date a custom-pattern scan looks.
const CUSTOM_SCAN_DAYS: i64 = 14;

/// The next moment, strictly after `from`, at which custody transfers.
///
/// - 7/7: start of the day the current custody block ends (for the default
///   one-week blocks, `7 - (days since start mod 7)` days ahead)
/// - 10/4: start of day 10 or day 14 of the cycle, whichever is next
/// - custom with handover weekdays: the first handover weekday at the plan's
///   handover time (see [`CustodyPlan::handover_time`]) that is later than
///   `from`, scanning `from`'s own date and the 14 days after it
/// - anything else: `from` plus seven days
///
/// The 7/7 and 10/4 results carry no time of day (midnight); callers that
/// want the clock time combine the date with `swapTime`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use custody_engine::{next_handover_date, CustodyPlan, Pattern};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let plan = CustodyPlan::new(Pattern::TenFour, start, "A", "B");
///
/// let from = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let next = next_handover_date(&plan, from);
/// assert_eq!(next.to_string(), "2024-01-11 00:00:00");
/// ```
pub fn next_handover_date(plan: &CustodyPlan, from: NaiveDateTime) -> NaiveDateTime {
    let from_date = from.date();
    let days = days_since_start(plan, from_date);

    let next = match plan.pattern {
        Pattern::SevenSeven => {
            let (p1_weeks, p2_weeks) = plan.week_counts();
            let week_in_cycle = days.div_euclid(7).rem_euclid(p1_weeks + p2_weeks);
            let block_end = if week_in_cycle < p1_weeks {
                p1_weeks
            } else {
                p1_weeks + p2_weeks
            };
            let days_until = (block_end - week_in_cycle) * 7 - days.rem_euclid(7);
            start_of_day(from_date, days_until)
        }
        Pattern::TenFour => {
            let day_in_cycle = days.rem_euclid(14);
            let days_until = if day_in_cycle < 10 {
                10 - day_in_cycle
            } else {
                14 - day_in_cycle
            };
            start_of_day(from_date, days_until)
        }
        Pattern::Custom => match plan
            .custom_week_config
            .as_ref()
            .filter(|c| !c.handover_weekdays.is_empty())
        {
            Some(config) => scan_custom(&config.handover_weekdays, plan.handover_time(), from)
                .unwrap_or_else(|| add_days(from, 7)),
            None => add_days(from, 7),
        },
        Pattern::FourteenZero | Pattern::WeekdayWeekend | Pattern::Alternating => {
            add_days(from, 7)
        }
    };

    trace!(%from, %next, pattern = ?plan.pattern, "next handover");
    next
}

fn scan_custom(
    weekdays: &[WeekdayIndex],
    time: NaiveTime,
    from: NaiveDateTime,
) -> Option<NaiveDateTime> {
    (0..=CUSTOM_SCAN_DAYS)
        .filter_map(|offset| from.date().checked_add_signed(Duration::days(offset)))
        .filter(|day| weekdays.contains(&weekday_index(*day)))
        .map(|day| day.and_time(time))
        .find(|candidate| *candidate > from)
}

fn start_of_day(date: NaiveDate, days_ahead: i64) -> NaiveDateTime {
    add_days(date.and_time(NaiveTime::default()), days_ahead)
}

fn add_days(dt: NaiveDateTime, days: i64) -> NaiveDateTime {
    dt.checked_add_signed(Duration::days(days))
        .unwrap_or(NaiveDateTime::MAX)
}

// ── Candidates ──────────────────────────────────────────────────────────────

/// Lazy iterator over the dates of a range that fall on a handover weekday.
///
/// Created by [`handover_candidates`].
#[derive(Debug, Clone)]
pub struct HandoverCandidates {
    weekdays: Vec<WeekdayIndex>,
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for HandoverCandidates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while let Some(date) = self.next.filter(|d| *d <= self.end) {
            self.next = date.succ_opt();
            if self.weekdays.contains(&weekday_index(date)) {
                return Some(date);
            }
        }
        None
    }
}

/// Dates in `[start, end]` whose weekday is one of the plan's handover
/// weekdays (see [`CustodyPlan::handover_weekdays`]).
pub fn handover_candidates(
    plan: &CustodyPlan,
    start: NaiveDate,
    end: NaiveDate,
) -> HandoverCandidates {
    HandoverCandidates {
        weekdays: plan.handover_weekdays(),
        next: Some(start),
        end,
    }
}

// ── Transfers ───────────────────────────────────────────────────────────────

/// A handover on a specific date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transfer<'a> {
    pub date: NaiveDate,
    pub from: &'a ParentId,
    pub to: &'a ParentId,
}

/// Lazy iterator over the handovers in a range.
///
/// Created by [`list_transfer_dates_in_range`]. Finite, and cloning yields an
/// independent iterator from the same position.
#[derive(Debug, Clone)]
pub struct TransferDates<'a> {
    plan: &'a CustodyPlan,
    candidates: HandoverCandidates,
}

impl<'a> Iterator for TransferDates<'a> {
    type Item = Transfer<'a>;

    fn next(&mut self) -> Option<Transfer<'a>> {
        let plan = self.plan;
        self.candidates
            .by_ref()
            .find_map(|date| transfer_on(plan, date))
    }
}

/// Handovers on handover weekdays within `[start, end]`.
///
/// A candidate date `d` reports a transfer when its holder differs from the
/// day before (custody moved into `d`), or when it matches the day before
/// and differs from the day after (custody moves out of `d`). An unassigned
/// day before `d` rules out both, so nothing is reported.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use custody_engine::{list_transfer_dates_in_range, CustodyPlan, Pattern};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let plan = CustodyPlan::new(Pattern::SevenSeven, start, "A", "B");
///
/// let from = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// let to = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// let transfers: Vec<_> = list_transfer_dates_in_range(&plan, from, to).collect();
/// assert_eq!(transfers.len(), 4);
/// assert_eq!(transfers[0].date.to_string(), "2024-01-08");
/// assert_eq!(transfers[0].from.as_str(), "A");
/// assert_eq!(transfers[0].to.as_str(), "B");
/// ```
pub fn list_transfer_dates_in_range(
    plan: &CustodyPlan,
    start: NaiveDate,
    end: NaiveDate,
) -> TransferDates<'_> {
    TransferDates {
        plan,
        candidates: handover_candidates(plan, start, end),
    }
}

fn transfer_on(plan: &CustodyPlan, date: NaiveDate) -> Option<Transfer<'_>> {
    let current = resolve_custody_holder(plan, date)?;
    let previous = date
        .pred_opt()
        .and_then(|d| resolve_custody_holder(plan, d));
    let following = date
        .succ_opt()
        .and_then(|d| resolve_custody_holder(plan, d));

    match (previous, following) {
        (Some(prev), _) if prev != current => Some(Transfer {
            date,
            from: prev,
            to: current,
        }),
        (Some(prev), Some(next)) if prev == current && next != current => Some(Transfer {
            date,
            from: current,
            to: next,
        }),
        _ => None,
    }
}
