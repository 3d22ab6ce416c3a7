use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use std::str::FromStr;

use dpa_core::assistance::DpaRecord;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_money(field: &str, raw: &str) -> NapiResult<Decimal> {
    Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|e| to_napi_error(format!("{field}: {e}")))
}

fn parse_record(record_json: &str) -> NapiResult<DpaRecord> {
    serde_json::from_str(record_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Single program
// ---------------------------------------------------------------------------

/// Amounts cross the boundary as decimal strings so no precision is lost to
/// JavaScript numbers.
#[napi]
pub fn calculate_total_dpa(
    record_json: String,
    sales_price: String,
    loan_amount: String,
) -> NapiResult<String> {
    let record = parse_record(&record_json)?;
    let sp = parse_money("sales_price", &sales_price)?;
    let la = parse_money("loan_amount", &loan_amount)?;
    Ok(dpa_core::assistance::compute_principal(&record, sp, la).to_string())
}

#[napi]
pub fn calculate_dpa_payment(
    record_json: String,
    sales_price: String,
    loan_amount: String,
) -> NapiResult<String> {
    let record = parse_record(&record_json)?;
    let sp = parse_money("sales_price", &sales_price)?;
    let la = parse_money("loan_amount", &loan_amount)?;
    Ok(dpa_core::assistance::compute_payment(&record, sp, la).to_string())
}

#[napi]
pub fn qualifier_dpa_payment(
    record_json: String,
    sales_price: String,
    loan_amount: String,
) -> NapiResult<String> {
    let record = parse_record(&record_json)?;
    let sp = parse_money("sales_price", &sales_price)?;
    let la = parse_money("loan_amount", &loan_amount)?;
    Ok(dpa_core::assistance::compute_qualifying_payment(&record, sp, la).to_string())
}

#[napi]
pub fn dpa_figures(input_json: String) -> NapiResult<String> {
    let input: dpa_core::assistance::analysis::DpaCalculationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = dpa_core::assistance::analysis::calculate_figures(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan option
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_assistance(input_json: String) -> NapiResult<String> {
    let input: dpa_core::assistance::analysis::AssistanceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        dpa_core::assistance::analysis::analyze_assistance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn dpa_schedule(input_json: String) -> NapiResult<String> {
    let input: dpa_core::assistance::schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = dpa_core::assistance::schedule::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Borrowers
// ---------------------------------------------------------------------------

#[napi]
pub fn borrower_profile_summary(input_json: String) -> NapiResult<String> {
    let input: dpa_core::borrower::BorrowerProfile =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = dpa_core::borrower::summary::analyze_profile(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn is_valid_email(email: String) -> bool {
    dpa_core::borrower::is_valid_email(&email)
}

#[napi]
pub fn is_valid_phone(phone: String) -> bool {
    dpa_core::borrower::is_valid_phone(&phone)
}

#[napi]
pub fn format_phone_number(value: String) -> String {
    dpa_core::borrower::format_phone_number(&value)
}
