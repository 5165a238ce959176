//! WASM bindings for custody-engine.
//!
//! The web client passes the plan as the same JSON document it stores, and
//! gets JSON strings back. Errors surface as thrown JS strings.
//!
//! Each export is a thin wrapper over a plain-Rust function returning
//! `Result<_, String>` (`resolve_custody_holder`, `next_handover`,
//! `list_transfers`, `holiday`) so the logic is testable without a JS host.

use custody_engine::{
    is_holiday, list_transfer_dates_in_range, next_handover_date, parse_date, parse_datetime,
    resolve, CustodyPlan,
};
use serde_json::json;
use wasm_bindgen::prelude::*;

/// `{"holder": "<id>" | null, "source": "..."}` for `date` (YYYY-MM-DD).
#[wasm_bindgen(js_name = "resolveCustodyHolder")]
pub fn resolve_custody_holder_js(plan_json: &str, date: &str) -> Result<String, JsValue> {
    resolve_custody_holder(plan_json, date).map_err(|e| JsValue::from_str(&e))
}

/// The next handover after `from` as `YYYY-MM-DDTHH:MM:SS`.
#[wasm_bindgen(js_name = "nextHandoverDate")]
pub fn next_handover_date_js(plan_json: &str, from: &str) -> Result<String, JsValue> {
    next_handover(plan_json, from).map_err(|e| JsValue::from_str(&e))
}

/// JSON array of `{date, from, to}` handovers in `[start, end]`.
#[wasm_bindgen(js_name = "listTransferDatesInRange")]
pub fn list_transfer_dates_in_range_js(
    plan_json: &str,
    start: &str,
    end: &str,
) -> Result<String, JsValue> {
    list_transfers(plan_json, start, end).map_err(|e| JsValue::from_str(&e))
}

/// Whether a holiday override covers `date`.
#[wasm_bindgen(js_name = "isHoliday")]
pub fn is_holiday_js(plan_json: &str, date: &str) -> Result<bool, JsValue> {
    holiday(plan_json, date).map_err(|e| JsValue::from_str(&e))
}

pub fn resolve_custody_holder(plan_json: &str, date: &str) -> Result<String, String> {
    let plan = load(plan_json)?;
    let date = parse_date(date).map_err(|e| e.to_string())?;
    let resolution = resolve(&plan, date);
    Ok(json!({
        "holder": resolution.holder,
        "source": resolution.source,
    })
    .to_string())
}

pub fn next_handover(plan_json: &str, from: &str) -> Result<String, String> {
    let plan = load(plan_json)?;
    let from = parse_datetime(from).map_err(|e| e.to_string())?;
    Ok(next_handover_date(&plan, from)
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string())
}

pub fn list_transfers(plan_json: &str, start: &str, end: &str) -> Result<String, String> {
    let plan = load(plan_json)?;
    let start = parse_date(start).map_err(|e| e.to_string())?;
    let end = parse_date(end).map_err(|e| e.to_string())?;
    let transfers: Vec<_> = list_transfer_dates_in_range(&plan, start, end).collect();
    serde_json::to_string(&transfers).map_err(|e| e.to_string())
}

pub fn holiday(plan_json: &str, date: &str) -> Result<bool, String> {
    let plan = load(plan_json)?;
    let date = parse_date(date).map_err(|e| e.to_string())?;
    Ok(is_holiday(&plan, date))
}

fn load(plan_json: &str) -> Result<CustodyPlan, String> {
    CustodyPlan::from_json(plan_json).map_err(|e| e.to_string())
}
