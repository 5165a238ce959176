//! One function per subcommand. Each returns the JSON document to print.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use custody_engine::{
    custody_days, custody_share, holiday_on, list_transfer_dates_in_range, next_handover_date,
    parse_date, parse_datetime, resolve, CustodyPlan,
};
use serde_json::{json, Value};

/// A command's JSON output and whether the process should exit successfully.
pub struct Outcome {
    pub output: Value,
    pub success: bool,
}

impl From<Value> for Outcome {
    fn from(output: Value) -> Self {
        Self {
            output,
            success: true,
        }
    }
}

pub fn holder(plan: &CustodyPlan, date: Option<&str>, tz: &str) -> Result<Outcome> {
    let date = match date {
        Some(s) => parse_date(s)?,
        None => now_in(tz)?.date(),
    };
    let resolution = resolve(plan, date);
    let holiday = holiday_on(plan, date).map(|h| h.name.as_str());

    Ok(json!({
        "date": date,
        "holder": resolution.holder,
        "source": resolution.source,
        "holiday": holiday,
    })
    .into())
}

pub fn next_handover(plan: &CustodyPlan, from: Option<&str>, tz: &str) -> Result<Outcome> {
    let from = match from {
        Some(s) => parse_datetime(s)?,
        None => now_in(tz)?,
    };
    let next = next_handover_date(plan, from);
    let holder_after = resolve(plan, next.date()).holder;

    Ok(json!({
        "from": from,
        "next": next,
        "holderAfter": holder_after,
    })
    .into())
}

pub fn transfers(plan: &CustodyPlan, start: &str, end: &str) -> Result<Outcome> {
    let (start, end) = parse_range(start, end)?;
    let transfers: Vec<_> = list_transfer_dates_in_range(plan, start, end).collect();
    Ok(serde_json::to_value(transfers)?.into())
}

pub fn calendar(plan: &CustodyPlan, start: &str, end: &str) -> Result<Outcome> {
    let (start, end) = parse_range(start, end)?;
    let days: Vec<_> = custody_days(plan, start, end).collect();
    Ok(serde_json::to_value(days)?.into())
}

pub fn share(plan: &CustodyPlan, start: &str, end: &str) -> Result<Outcome> {
    let (start, end) = parse_range(start, end)?;
    let share = custody_share(plan, start, end);
    let mut output = serde_json::to_value(share)?;
    if let Value::Object(map) = &mut output {
        map.insert("totalDays".into(), json!(share.total_days()));
        map.insert(
            "parent1Percent".into(),
            json!((share.parent1_percent() * 10.0).round() / 10.0),
        );
    }
    Ok(output.into())
}

pub fn validate(plan: &CustodyPlan) -> Outcome {
    let overlaps: Vec<Value> = plan
        .overlapping_holidays()
        .into_iter()
        .map(|(a, b)| json!([a.id, b.id]))
        .collect();

    match plan.validate() {
        Ok(()) => json!({
            "valid": true,
            "overlappingHolidays": overlaps,
        })
        .into(),
        Err(e) => Outcome {
            output: json!({
                "valid": false,
                "error": e.to_string(),
                "overlappingHolidays": overlaps,
            }),
            success: false,
        },
    }
}

fn parse_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate)> {
    let start = parse_date(start).context("--start")?;
    let end = parse_date(end).context("--end")?;
    if end < start {
        return Err(anyhow!("--end ({end}) is before --start ({start})"));
    }
    Ok((start, end))
}

/// Wall-clock "now" in `tz`, the only place the CLI reads the system clock.
fn now_in(tz: &str) -> Result<NaiveDateTime> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow!("invalid timezone: '{tz}'"))?;
    Ok(Utc::now().with_timezone(&tz).naive_local())
}
