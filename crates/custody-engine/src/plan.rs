//! The custody plan: the single input every resolver operation reads.
//!
//! A [`CustodyPlan`] is produced by a configuration screen and stored by the
//! REST layer; this crate only reads it. The JSON shape is camelCase, matching
//! the DTOs the web client already exchanges.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CustodyError;
use crate::parse::opt_clock_time;
use crate::weekday::{self, WeekdayIndex};

/// Handover time used when neither the custom week config nor the plan
/// specifies one: 16:00.
pub fn default_handover_time() -> NaiveTime {
    NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default()
}

// ── Identifiers ─────────────────────────────────────────────────────────────

/// Opaque identifier of a parent or guardian.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentId(String);

impl ParentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty ids show up in assignment arrays for "nobody configured".
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ParentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── Pattern ─────────────────────────────────────────────────────────────────

/// The recurring rule that assigns custody absent any override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// Alternating whole weeks (optionally asymmetric via week counts).
    #[serde(rename = "7-7", alias = "7/7")]
    SevenSeven,
    /// Ten days with parent 1, four with parent 2, on a 14-day cycle.
    #[serde(rename = "10-4", alias = "10/4")]
    TenFour,
    /// One parent all the time; resolved through the weekday sets.
    #[serde(rename = "14-0", alias = "14/0")]
    FourteenZero,
    #[serde(rename = "weekday-weekend")]
    WeekdayWeekend,
    #[serde(rename = "alternating")]
    Alternating,
    #[serde(rename = "custom")]
    Custom,
}

// ── Custom week configuration ───────────────────────────────────────────────

/// When a custom-pattern handover happens within the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HandoverContext {
    /// At `handoverTime`.
    #[default]
    FixedTime,
    /// After daycare/school pickup; no clock time of its own.
    AfterInstitution,
}

/// Per-weekday assignment for the `Custom` pattern, alternating on ISO week
/// parity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomWeekConfig {
    #[serde(default, alias = "handoverDays")]
    pub handover_weekdays: Vec<WeekdayIndex>,
    #[serde(default, with = "opt_clock_time", skip_serializing_if = "Option::is_none")]
    pub handover_time: Option<NaiveTime>,
    #[serde(default)]
    pub handover_context: HandoverContext,
    /// Index = weekday (0 = Monday). Used in even ISO weeks.
    #[serde(default)]
    pub even_week_assignments: Vec<Option<ParentId>>,
    /// Index = weekday (0 = Monday). Used in odd ISO weeks.
    #[serde(default)]
    pub odd_week_assignments: Vec<Option<ParentId>>,
}

impl CustomWeekConfig {
    /// The assignment array for an ISO week number.
    pub fn assignments_for_week(&self, iso_week: u32) -> &[Option<ParentId>] {
        if iso_week % 2 == 0 {
            &self.even_week_assignments
        } else {
            &self.odd_week_assignments
        }
    }
}

/// Custody flags for one parent on one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCustody {
    #[serde(default)]
    pub has_custody: bool,
}

/// One row of a weekly schedule (index = weekday, 0 = Monday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    #[serde(default)]
    pub parent1: DayCustody,
    #[serde(default)]
    pub parent2: DayCustody,
}

// ── Overrides ───────────────────────────────────────────────────────────────

/// A date range where the regular pattern is suspended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub parent_id: ParentId,
}

impl Holiday {
    /// Whether `date` lies in `[start_date, end_date]`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Whether the two inclusive ranges share at least one day.
    pub fn overlaps(&self, other: &Holiday) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }
}

/// An explicit assignment for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOverride {
    pub date: NaiveDate,
    pub parent_id: ParentId,
}

// ── CustodyPlan ─────────────────────────────────────────────────────────────

/// A complete custody plan between two parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodyPlan {
    pub pattern: Pattern,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub swap_day_of_week: WeekdayIndex,
    #[serde(default, with = "opt_clock_time", skip_serializing_if = "Option::is_none")]
    pub swap_time: Option<NaiveTime>,
    #[serde(default = "default_week_count")]
    pub parent1_week_count: u32,
    #[serde(default = "default_week_count")]
    pub parent2_week_count: u32,
    #[serde(default)]
    pub parent1_weekdays: Vec<WeekdayIndex>,
    #[serde(default)]
    pub parent2_weekdays: Vec<WeekdayIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_schedule: Option<Vec<DaySchedule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_week_config: Option<CustomWeekConfig>,
    #[serde(default)]
    pub custom_schedule: Vec<ScheduleOverride>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    pub parent1_id: ParentId,
    pub parent2_id: ParentId,
}

fn default_week_count() -> u32 {
    1
}

impl CustodyPlan {
    /// A plan with the given pattern and no overrides, weekday sets, or
    /// custom configuration. Handover on Mondays.
    pub fn new(
        pattern: Pattern,
        start_date: NaiveDate,
        parent1_id: impl Into<ParentId>,
        parent2_id: impl Into<ParentId>,
    ) -> Self {
        Self {
            pattern,
            start_date,
            swap_day_of_week: weekday::MONDAY,
            swap_time: None,
            parent1_week_count: 1,
            parent2_week_count: 1,
            parent1_weekdays: Vec::new(),
            parent2_weekdays: Vec::new(),
            weekly_schedule: None,
            custom_week_config: None,
            custom_schedule: Vec::new(),
            holidays: Vec::new(),
            parent1_id: parent1_id.into(),
            parent2_id: parent2_id.into(),
        }
    }

    /// Parse a plan from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::InvalidPlan`] if the JSON is malformed or a
    /// date/time field does not parse. Structural checks are left to
    /// [`CustodyPlan::validate`].
    pub fn from_json(json: &str) -> Result<Self, CustodyError> {
        let plan: CustodyPlan =
            serde_json::from_str(json).map_err(|e| CustodyError::InvalidPlan(e.to_string()))?;
        debug!(
            pattern = ?plan.pattern,
            start_date = %plan.start_date,
            holidays = plan.holidays.len(),
            overrides = plan.custom_schedule.len(),
            "loaded custody plan"
        );
        Ok(plan)
    }

    /// Serialize the plan back to JSON.
    pub fn to_json(&self) -> Result<String, CustodyError> {
        serde_json::to_string(self).map_err(|e| CustodyError::InvalidPlan(e.to_string()))
    }

    /// Check the structural invariants the resolver relies on.
    ///
    /// Overlapping holidays are allowed (first match wins at query time) but
    /// are logged; see [`CustodyPlan::overlapping_holidays`].
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::InvalidPlan`] describing the first violation.
    pub fn validate(&self) -> Result<(), CustodyError> {
        check_weekday("swapDayOfWeek", self.swap_day_of_week)?;
        check_weekdays("parent1Weekdays", &self.parent1_weekdays)?;
        check_weekdays("parent2Weekdays", &self.parent2_weekdays)?;

        if let Some(schedule) = &self.weekly_schedule {
            if schedule.len() > 7 {
                return Err(CustodyError::InvalidPlan(format!(
                    "weeklySchedule has {} entries, expected at most 7",
                    schedule.len()
                )));
            }
        }

        if let Some(config) = &self.custom_week_config {
            check_weekdays("customWeekConfig.handoverWeekdays", &config.handover_weekdays)?;
            for (field, assignments) in [
                ("evenWeekAssignments", &config.even_week_assignments),
                ("oddWeekAssignments", &config.odd_week_assignments),
            ] {
                if assignments.len() > 7 {
                    return Err(CustodyError::InvalidPlan(format!(
                        "customWeekConfig.{field} has {} entries, expected at most 7",
                        assignments.len()
                    )));
                }
            }
        }

        for holiday in &self.holidays {
            if holiday.start_date > holiday.end_date {
                return Err(CustodyError::InvalidPlan(format!(
                    "holiday '{}' ends ({}) before it starts ({})",
                    holiday_label(holiday),
                    holiday.end_date,
                    holiday.start_date
                )));
            }
        }

        for (a, b) in self.overlapping_holidays() {
            warn!(
                first = holiday_label(a),
                second = holiday_label(b),
                "overlapping holidays; the first listed wins"
            );
        }

        debug!(pattern = ?self.pattern, "custody plan validated");
        Ok(())
    }

    /// Every pair of holidays whose ranges share a day, in list order.
    pub fn overlapping_holidays(&self) -> Vec<(&Holiday, &Holiday)> {
        let mut pairs = Vec::new();
        for (i, a) in self.holidays.iter().enumerate() {
            for b in &self.holidays[i + 1..] {
                if a.overlaps(b) {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    /// `(parent1, parent2)` week counts for the 7/7 pattern, at least 1 each.
    pub fn week_counts(&self) -> (i64, i64) {
        (
            i64::from(self.parent1_week_count.max(1)),
            i64::from(self.parent2_week_count.max(1)),
        )
    }

    /// Clock time of a custom-pattern handover.
    ///
    /// `handoverTime` when the config has a fixed time, else `swapTime`,
    /// else [`default_handover_time`].
    pub fn handover_time(&self) -> NaiveTime {
        self.custom_week_config
            .as_ref()
            .filter(|c| c.handover_context == HandoverContext::FixedTime)
            .and_then(|c| c.handover_time)
            .or(self.swap_time)
            .unwrap_or_else(default_handover_time)
    }

    /// Weekdays on which a handover may happen.
    ///
    /// The custom config's handover weekdays for a `Custom` plan that lists
    /// any, otherwise just `swapDayOfWeek`.
    pub fn handover_weekdays(&self) -> Vec<WeekdayIndex> {
        match (&self.pattern, &self.custom_week_config) {
            (Pattern::Custom, Some(config)) if !config.handover_weekdays.is_empty() => {
                config.handover_weekdays.clone()
            }
            _ => vec![self.swap_day_of_week],
        }
    }
}

fn holiday_label(holiday: &Holiday) -> &str {
    if holiday.name.is_empty() {
        &holiday.id
    } else {
        &holiday.name
    }
}

fn check_weekday(field: &str, index: WeekdayIndex) -> Result<(), CustodyError> {
    if weekday::is_valid(index) {
        Ok(())
    } else {
        Err(CustodyError::InvalidPlan(format!(
            "{field}: weekday index {index} out of range 0-6"
        )))
    }
}

fn check_weekdays(field: &str, indices: &[WeekdayIndex]) -> Result<(), CustodyError> {
    indices.iter().try_for_each(|&i| check_weekday(field, i))
}
