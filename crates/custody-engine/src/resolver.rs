//! Custody holder resolution.
//!
//! Answers "who has the children on this day?" for a [`CustodyPlan`]. Rules
//! apply in strict precedence:
//!
//! 1. an explicit per-date override (`customSchedule`)
//! 2. a holiday range covering the date (first in list order)
//! 3. the plan's recurring pattern
//!
//! A date no rule covers is unassigned (`None`). That is a gap in the plan's
//! configuration, not an error.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::trace;

use crate::plan::{CustodyPlan, Holiday, ParentId, Pattern};
use crate::weekday::weekday_index;

/// Which rule decided a date's holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Source {
    Override,
    Holiday,
    Pattern,
    Unassigned,
}

/// A resolved holder together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution<'a> {
    pub holder: Option<&'a ParentId>,
    pub source: Source,
}

/// The parent holding custody on `date`, or `None` if the plan does not say.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use custody_engine::{resolve_custody_holder, CustodyPlan, Pattern};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let plan = CustodyPlan::new(Pattern::SevenSeven, start, "A", "B");
///
/// let second_week = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
/// assert_eq!(resolve_custody_holder(&plan, second_week).unwrap().as_str(), "B");
/// ```
pub fn resolve_custody_holder(plan: &CustodyPlan, date: NaiveDate) -> Option<&ParentId> {
    resolve(plan, date).holder
}

/// Like [`resolve_custody_holder`], but also reports which rule decided.
pub fn resolve(plan: &CustodyPlan, date: NaiveDate) -> Resolution<'_> {
    if let Some(entry) = plan.custom_schedule.iter().find(|o| o.date == date) {
        trace!(%date, holder = %entry.parent_id, "resolved by explicit override");
        return Resolution {
            holder: Some(&entry.parent_id),
            source: Source::Override,
        };
    }

    if let Some(holiday) = holiday_on(plan, date) {
        trace!(%date, holiday = %holiday.name, holder = %holiday.parent_id, "resolved by holiday");
        return Resolution {
            holder: Some(&holiday.parent_id),
            source: Source::Holiday,
        };
    }

    match resolve_pattern(plan, date) {
        Some(holder) => {
            trace!(%date, pattern = ?plan.pattern, %holder, "resolved by pattern");
            Resolution {
                holder: Some(holder),
                source: Source::Pattern,
            }
        }
        None => {
            trace!(%date, pattern = ?plan.pattern, "no rule covers date");
            Resolution {
                holder: None,
                source: Source::Unassigned,
            }
        }
    }
}

/// The first holiday (in list order) whose range covers `date`.
pub fn holiday_on(plan: &CustodyPlan, date: NaiveDate) -> Option<&Holiday> {
    plan.holidays.iter().find(|h| h.contains(date))
}

/// Whether a holiday override applies on `date`.
pub fn is_holiday(plan: &CustodyPlan, date: NaiveDate) -> bool {
    holiday_on(plan, date).is_some()
}

/// Whole days from the plan's start date to `date` (negative before it).
pub(crate) fn days_since_start(plan: &CustodyPlan, date: NaiveDate) -> i64 {
    (date - plan.start_date).num_days()
}

fn resolve_pattern(plan: &CustodyPlan, date: NaiveDate) -> Option<&ParentId> {
    let days = days_since_start(plan, date);

    match plan.pattern {
        Pattern::SevenSeven => {
            let (p1_weeks, p2_weeks) = plan.week_counts();
            let week = days.div_euclid(7);
            if week.rem_euclid(p1_weeks + p2_weeks) < p1_weeks {
                Some(&plan.parent1_id)
            } else {
                Some(&plan.parent2_id)
            }
        }
        Pattern::TenFour => {
            if days.rem_euclid(14) < 10 {
                Some(&plan.parent1_id)
            } else {
                Some(&plan.parent2_id)
            }
        }
        Pattern::Custom => from_weekly_schedule(plan, date)
            .or_else(|| from_custom_week(plan, date))
            .or_else(|| from_weekday_sets(plan, date)),
        Pattern::FourteenZero | Pattern::WeekdayWeekend | Pattern::Alternating => {
            from_weekday_sets(plan, date)
        }
    }
}

fn from_weekly_schedule(plan: &CustodyPlan, date: NaiveDate) -> Option<&ParentId> {
    let schedule = plan.weekly_schedule.as_ref()?;
    let day = schedule.get(usize::from(weekday_index(date)))?;
    if day.parent1.has_custody {
        Some(&plan.parent1_id)
    } else if day.parent2.has_custody {
        Some(&plan.parent2_id)
    } else {
        None
    }
}

fn from_custom_week(plan: &CustodyPlan, date: NaiveDate) -> Option<&ParentId> {
    let config = plan.custom_week_config.as_ref()?;
    let assignments = config.assignments_for_week(date.iso_week().week());
    assignments
        .get(usize::from(weekday_index(date)))?
        .as_ref()
        .filter(|id| !id.is_empty())
}

fn from_weekday_sets(plan: &CustodyPlan, date: NaiveDate) -> Option<&ParentId> {
    let index = weekday_index(date);
    if plan.parent1_weekdays.contains(&index) {
        Some(&plan.parent1_id)
    } else if plan.parent2_weekdays.contains(&index) {
        Some(&plan.parent2_id)
    } else {
        None
    }
}

// ── Calendar views ──────────────────────────────────────────────────────────

/// One rendered calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CustodyDay<'a> {
    pub date: NaiveDate,
    pub holder: Option<&'a ParentId>,
    pub source: Source,
}

/// Lazy iterator over every day of an inclusive range with its holder.
///
/// Created by [`custody_days`]. Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct CustodyDays<'a> {
    plan: &'a CustodyPlan,
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl<'a> Iterator for CustodyDays<'a> {
    type Item = CustodyDay<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let date = self.next.filter(|d| *d <= self.end)?;
        self.next = date.succ_opt();
        let Resolution { holder, source } = resolve(self.plan, date);
        Some(CustodyDay {
            date,
            holder,
            source,
        })
    }
}

/// Every date in `[start, end]` with its holder. Empty if `end < start`.
pub fn custody_days(plan: &CustodyPlan, start: NaiveDate, end: NaiveDate) -> CustodyDays<'_> {
    CustodyDays {
        plan,
        next: Some(start),
        end,
    }
}

/// Day counts per holder over a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodyShare {
    pub parent1_days: u32,
    pub parent2_days: u32,
    /// Days assigned (by override or holiday) to an id that is neither parent.
    pub other_days: u32,
    pub unassigned_days: u32,
}

impl CustodyShare {
    pub fn total_days(&self) -> u32 {
        self.parent1_days + self.parent2_days + self.other_days + self.unassigned_days
    }

    /// Parent 1's share of the assigned days, `0.0..=100.0`.
    pub fn parent1_percent(&self) -> f64 {
        let assigned = self.parent1_days + self.parent2_days + self.other_days;
        if assigned == 0 {
            0.0
        } else {
            f64::from(self.parent1_days) * 100.0 / f64::from(assigned)
        }
    }
}

/// Count custody days per parent over `[start, end]`.
pub fn custody_share(plan: &CustodyPlan, start: NaiveDate, end: NaiveDate) -> CustodyShare {
    custody_days(plan, start, end).fold(CustodyShare::default(), |mut share, day| {
        match day.holder {
            None => share.unassigned_days += 1,
            Some(id) if *id == plan.parent1_id => share.parent1_days += 1,
            Some(id) if *id == plan.parent2_id => share.parent2_days += 1,
            Some(_) => share.other_days += 1,
        }
        share
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{CustomWeekConfig, DayCustody, DaySchedule, ScheduleOverride};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan(pattern: Pattern) -> CustodyPlan {
        // 2024-01-01 is a Monday
        CustodyPlan::new(pattern, date(2024, 1, 1), "A", "B")
    }

    fn holder(plan: &CustodyPlan, d: NaiveDate) -> Option<&str> {
        resolve_custody_holder(plan, d).map(ParentId::as_str)
    }

    fn holiday(id: &str, start: NaiveDate, end: NaiveDate, parent: &str) -> Holiday {
        Holiday {
            id: id.into(),
            name: id.into(),
            start_date: start,
            end_date: end,
            parent_id: parent.into(),
        }
    }

    // ── 7/7 ─────────────────────────────────────────────────────────────

    #[test]
    fn test_seven_seven_alternates_weekly() {
        let p = plan(Pattern::SevenSeven);
        for day in 1..=7 {
            assert_eq!(holder(&p, date(2024, 1, day)), Some("A"), "Jan {day}");
        }
        for day in 8..=14 {
            assert_eq!(holder(&p, date(2024, 1, day)), Some("B"), "Jan {day}");
        }
        for day in 15..=21 {
            assert_eq!(holder(&p, date(2024, 1, day)), Some("A"), "Jan {day}");
        }
    }

    #[test]
    fn test_seven_seven_before_start_continues_cycle() {
        let p = plan(Pattern::SevenSeven);
        // The week before the start belongs to the other parent
        assert_eq!(holder(&p, date(2023, 12, 31)), Some("B"));
        assert_eq!(holder(&p, date(2023, 12, 25)), Some("B"));
        assert_eq!(holder(&p, date(2023, 12, 24)), Some("A"));
    }

    #[test]
    fn test_seven_seven_asymmetric_week_counts() {
        let mut p = plan(Pattern::SevenSeven);
        p.parent1_week_count = 2;
        p.parent2_week_count = 1;
        assert_eq!(holder(&p, date(2024, 1, 1)), Some("A"));
        assert_eq!(holder(&p, date(2024, 1, 8)), Some("A"));
        assert_eq!(holder(&p, date(2024, 1, 15)), Some("B"));
        assert_eq!(holder(&p, date(2024, 1, 21)), Some("B"));
        assert_eq!(holder(&p, date(2024, 1, 22)), Some("A"));
    }

    // ── 10/4 ────────────────────────────────────────────────────────────

    #[test]
    fn test_ten_four_cycle_boundaries() {
        let p = plan(Pattern::TenFour);
        assert_eq!(holder(&p, date(2024, 1, 1)), Some("A")); // day 0
        assert_eq!(holder(&p, date(2024, 1, 10)), Some("A")); // day 9
        assert_eq!(holder(&p, date(2024, 1, 11)), Some("B")); // day 10
        assert_eq!(holder(&p, date(2024, 1, 14)), Some("B")); // day 13
        assert_eq!(holder(&p, date(2024, 1, 15)), Some("A")); // day 14
    }

    // ── Weekday sets ────────────────────────────────────────────────────

    #[test]
    fn test_weekday_weekend_uses_weekday_sets() {
        let mut p = plan(Pattern::WeekdayWeekend);
        p.parent1_weekdays = vec![0, 1, 2, 3, 4];
        p.parent2_weekdays = vec![5, 6];
        assert_eq!(holder(&p, date(2024, 1, 3)), Some("A")); // Wednesday
        assert_eq!(holder(&p, date(2024, 1, 6)), Some("B")); // Saturday
        assert_eq!(holder(&p, date(2024, 1, 7)), Some("B")); // Sunday
    }

    #[test]
    fn test_weekday_sets_gap_is_unassigned() {
        let mut p = plan(Pattern::Alternating);
        p.parent1_weekdays = vec![0];
        assert_eq!(holder(&p, date(2024, 1, 1)), Some("A"));
        assert_eq!(holder(&p, date(2024, 1, 2)), None);
        assert_eq!(resolve(&p, date(2024, 1, 2)).source, Source::Unassigned);
    }

    #[test]
    fn test_fourteen_zero_through_weekday_sets() {
        let mut p = plan(Pattern::FourteenZero);
        p.parent1_weekdays = (0..7).collect();
        for day in 1..=14 {
            assert_eq!(holder(&p, date(2024, 1, day)), Some("A"));
        }
    }

    // ── Custom ──────────────────────────────────────────────────────────

    #[test]
    fn test_custom_weekly_schedule() {
        let mut p = plan(Pattern::Custom);
        let with = |p1: bool, p2: bool| DaySchedule {
            parent1: DayCustody { has_custody: p1 },
            parent2: DayCustody { has_custody: p2 },
        };
        p.weekly_schedule = Some(vec![
            with(true, false),
            with(false, true),
            with(true, true),
            with(false, false),
        ]);
        p.parent2_weekdays = vec![3];

        assert_eq!(holder(&p, date(2024, 1, 1)), Some("A")); // Mon
        assert_eq!(holder(&p, date(2024, 1, 2)), Some("B")); // Tue
        assert_eq!(holder(&p, date(2024, 1, 3)), Some("A")); // Wed, parent1 wins
        assert_eq!(holder(&p, date(2024, 1, 4)), Some("B")); // Thu, falls through to weekday set
        assert_eq!(holder(&p, date(2024, 1, 5)), None); // Fri, no row
    }

    #[test]
    fn test_custom_weekly_schedule_before_week_assignments() {
        let mut p = plan(Pattern::Custom);
        let with = |p1: bool, p2: bool| DaySchedule {
            parent1: DayCustody { has_custody: p1 },
            parent2: DayCustody { has_custody: p2 },
        };
        p.weekly_schedule = Some(vec![with(true, false), with(false, false)]);
        p.custom_week_config = Some(CustomWeekConfig {
            even_week_assignments: vec![Some("A".into()); 7],
            odd_week_assignments: vec![Some("B".into()); 7],
            ..Default::default()
        });

        // ISO week 1 (odd) assigns B everywhere
        assert_eq!(holder(&p, date(2024, 1, 1)), Some("A")); // Mon, schedule row wins
        assert_eq!(holder(&p, date(2024, 1, 2)), Some("B")); // Tue, empty row
        assert_eq!(holder(&p, date(2024, 1, 3)), Some("B")); // Wed, no row
        // ISO week 2 (even) assigns A
        assert_eq!(holder(&p, date(2024, 1, 9)), Some("A"));
        assert_eq!(resolve(&p, date(2024, 1, 2)).source, Source::Pattern);
    }

    #[test]
    fn test_custom_week_parity() {
        let mut p = plan(Pattern::Custom);
        p.custom_week_config = Some(CustomWeekConfig {
            even_week_assignments: vec![
                Some("A".into()),
                Some("A".into()),
                Some("A".into()),
                Some("A".into()),
                Some("A".into()),
                Some("B".into()),
                Some("B".into()),
            ],
            odd_week_assignments: vec![Some("B".into()); 7],
            ..Default::default()
        });
        // 2024-01-01 is in ISO week 1 (odd), 2024-01-08 in week 2 (even)
        assert_eq!(holder(&p, date(2024, 1, 1)), Some("B"));
        assert_eq!(holder(&p, date(2024, 1, 8)), Some("A"));
        assert_eq!(holder(&p, date(2024, 1, 13)), Some("B")); // Saturday of week 2
    }

    #[test]
    fn test_custom_week_uses_iso_week_across_year_boundary() {
        let mut p = plan(Pattern::Custom);
        p.custom_week_config = Some(CustomWeekConfig {
            even_week_assignments: vec![Some("A".into()); 7],
            odd_week_assignments: vec![Some("B".into()); 7],
            ..Default::default()
        });
        // 2021-01-01 (Friday) belongs to ISO week 53 of 2020: odd
        assert_eq!(holder(&p, date(2021, 1, 1)), Some("B"));
        // 2024-12-30 (Monday) belongs to ISO week 1 of 2025: odd
        assert_eq!(holder(&p, date(2024, 12, 30)), Some("B"));
        // 2024-12-23 is ISO week 52: even
        assert_eq!(holder(&p, date(2024, 12, 23)), Some("A"));
    }

    #[test]
    fn test_custom_week_empty_slot_falls_back_to_weekday_sets() {
        let mut p = plan(Pattern::Custom);
        p.custom_week_config = Some(CustomWeekConfig {
            odd_week_assignments: vec![Some("".into()), None],
            ..Default::default()
        });
        p.parent1_weekdays = vec![0];
        p.parent2_weekdays = vec![1];
        assert_eq!(holder(&p, date(2024, 1, 1)), Some("A"));
        assert_eq!(holder(&p, date(2024, 1, 2)), Some("B"));
        // Short array: Wednesday has no slot and no weekday set
        assert_eq!(holder(&p, date(2024, 1, 3)), None);
    }

    #[test]
    fn test_custom_without_configuration_is_unassigned() {
        let p = plan(Pattern::Custom);
        for d in custody_days(&p, date(2024, 1, 1), date(2024, 3, 31)) {
            assert_eq!(d.holder, None, "{}", d.date);
        }
    }

    // ── Precedence ──────────────────────────────────────────────────────

    #[test]
    fn test_holiday_beats_pattern() {
        let mut p = plan(Pattern::SevenSeven);
        assert_eq!(holder(&p, date(2024, 1, 3)), Some("A"));
        p.holidays
            .push(holiday("winter", date(2024, 1, 2), date(2024, 1, 4), "B"));
        assert_eq!(holder(&p, date(2024, 1, 3)), Some("B"));
        assert_eq!(resolve(&p, date(2024, 1, 3)).source, Source::Holiday);
    }

    #[test]
    fn test_holiday_range_is_inclusive() {
        let mut p = plan(Pattern::SevenSeven);
        p.holidays
            .push(holiday("winter", date(2024, 1, 2), date(2024, 1, 4), "B"));
        assert!(!is_holiday(&p, date(2024, 1, 1)));
        assert!(is_holiday(&p, date(2024, 1, 2)));
        assert!(is_holiday(&p, date(2024, 1, 4)));
        assert!(!is_holiday(&p, date(2024, 1, 5)));
    }

    #[test]
    fn test_overlapping_holidays_first_match_wins() {
        let mut p = plan(Pattern::SevenSeven);
        p.holidays = vec![
            holiday("first", date(2024, 7, 1), date(2024, 7, 10), "B"),
            holiday("second", date(2024, 7, 5), date(2024, 7, 15), "A"),
        ];
        assert_eq!(holiday_on(&p, date(2024, 7, 6)).unwrap().id, "first");
        assert_eq!(holder(&p, date(2024, 7, 6)), Some("B"));
        assert_eq!(holder(&p, date(2024, 7, 12)), Some("A"));
    }

    #[test]
    fn test_custom_schedule_beats_holiday() {
        let mut p = plan(Pattern::SevenSeven);
        p.holidays
            .push(holiday("winter", date(2024, 1, 2), date(2024, 1, 4), "B"));
        p.custom_schedule.push(ScheduleOverride {
            date: date(2024, 1, 3),
            parent_id: "A".into(),
        });
        assert_eq!(holder(&p, date(2024, 1, 3)), Some("A"));
        assert_eq!(resolve(&p, date(2024, 1, 3)).source, Source::Override);
        // Neighbouring holiday days are unaffected
        assert_eq!(holder(&p, date(2024, 1, 4)), Some("B"));
    }

    #[test]
    fn test_override_may_name_a_third_party() {
        let mut p = plan(Pattern::TenFour);
        p.custom_schedule.push(ScheduleOverride {
            date: date(2024, 1, 5),
            parent_id: "grandma".into(),
        });
        assert_eq!(holder(&p, date(2024, 1, 5)), Some("grandma"));
    }

    // ── Calendar views ──────────────────────────────────────────────────

    #[test]
    fn test_custody_days_covers_inclusive_range() {
        let p = plan(Pattern::SevenSeven);
        let days: Vec<_> = custody_days(&p, date(2024, 1, 6), date(2024, 1, 9)).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0].date, date(2024, 1, 6));
        assert_eq!(days[3].date, date(2024, 1, 9));
        assert_eq!(days[1].holder.map(ParentId::as_str), Some("A"));
        assert_eq!(days[2].holder.map(ParentId::as_str), Some("B"));
    }

    #[test]
    fn test_custody_days_empty_when_reversed() {
        let p = plan(Pattern::SevenSeven);
        assert_eq!(custody_days(&p, date(2024, 1, 9), date(2024, 1, 1)).count(), 0);
    }

    #[test]
    fn test_custody_days_is_restartable() {
        let p = plan(Pattern::TenFour);
        let mut days = custody_days(&p, date(2024, 1, 1), date(2024, 1, 31));
        days.next();
        let snapshot = days.clone();
        assert_eq!(days.count(), 30);
        assert_eq!(snapshot.count(), 30);
    }

    #[test]
    fn test_custody_share_ten_four() {
        let mut p = plan(Pattern::TenFour);
        p.custom_schedule.push(ScheduleOverride {
            date: date(2024, 1, 2),
            parent_id: "grandma".into(),
        });
        let share = custody_share(&p, date(2024, 1, 1), date(2024, 1, 28));
        assert_eq!(share.parent1_days, 19);
        assert_eq!(share.parent2_days, 8);
        assert_eq!(share.other_days, 1);
        assert_eq!(share.unassigned_days, 0);
        assert_eq!(share.total_days(), 28);
    }

    #[test]
    fn test_custody_share_percent() {
        let p = plan(Pattern::SevenSeven);
        let share = custody_share(&p, date(2024, 1, 1), date(2024, 1, 14));
        assert!((share.parent1_percent() - 50.0).abs() < f64::EPSILON);
        assert_eq!(CustodyShare::default().parent1_percent(), 0.0);
    }
}
