//! # custody-engine
//!
//! Deterministic custody-schedule resolution for co-parenting calendars.
//!
//! Given a [`CustodyPlan`] (a recurring pattern, holiday ranges, and
//! per-date overrides) the engine answers which parent has the children on
//! a given day, when the next handover happens, and which days of a visible
//! range carry a handover. Every function is pure: the plan and the date
//! are explicit arguments, nothing reads a clock or shared state.
//!
//! ## Modules
//!
//! - [`plan`] — The plan data model, JSON loading, and validation
//! - [`resolver`] — Custody holder on a date, holiday lookup, calendar views
//! - [`handover`] — Next handover moment and handover listing over a range
//! - [`weekday`] — Monday-first weekday indices and conversions
//! - [`parse`] — String → date/time parsing at the crate boundary
//! - [`error`] — Error types

pub mod error;
pub mod handover;
pub mod parse;
pub mod plan;
pub mod resolver;
pub mod weekday;

pub use error::CustodyError;
pub use handover::{
    handover_candidates, list_transfer_dates_in_range, next_handover_date, HandoverCandidates,
    Transfer, TransferDates,
};
pub use parse::{parse_date, parse_datetime, parse_time};
pub use plan::{
    default_handover_time, CustodyPlan, CustomWeekConfig, DayCustody, DaySchedule,
    HandoverContext, Holiday, ParentId, Pattern, ScheduleOverride,
};
pub use resolver::{
    custody_days, custody_share, holiday_on, is_holiday, resolve, resolve_custody_holder,
    CustodyDay, CustodyDays, CustodyShare, Resolution, Source,
};
