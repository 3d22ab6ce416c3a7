//! Repayment schedule for a single DPA program.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::analysis::saturating_total;
use super::calculator::{compute_payment, compute_principal};
use super::record::{DpaRecord, Repayment};
use crate::error::DpaError;
use crate::time_value::{amortization_schedule, interest_only_schedule, monthly_rate, AmortizationRow};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::DpaResult;

/// Longest repayment term a schedule is built for (50 years).
pub const MAX_SCHEDULE_TERM_MONTHS: u32 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub record: DpaRecord,
    pub sales_price: Money,
    pub loan_amount: Money,
    /// Date of the first payment; rows are undated when absent.
    #[serde(default)]
    pub first_payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub principal: Money,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    pub rows: Vec<AmortizationRow>,
}

/// Build the month-by-month repayment of an interest-only or amortizing
/// program. Other repayment kinds have no schedule and are rejected.
pub fn build_schedule(input: &ScheduleInput) -> DpaResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    input.record.validate()?;
    check_term(&input.record.repayment)?;

    let principal = compute_principal(&input.record, input.sales_price, input.loan_amount);
    let monthly_payment = compute_payment(&input.record, input.sales_price, input.loan_amount);
    let mut warnings = Vec::new();

    let (rows, methodology) = match &input.record.repayment {
        Repayment::Amortizing {
            annual_interest_rate_percent,
            term_months,
        } => (
            amortization_schedule(
                monthly_rate(*annual_interest_rate_percent),
                *term_months,
                principal,
                input.first_payment_date,
            ),
            "Level-Payment Amortization Schedule",
        ),
        Repayment::InterestOnly {
            annual_interest_rate_percent,
            term_months,
        } => {
            warnings.push(
                "Interest-only assistance: principal is due in full with the final payment"
                    .to_string(),
            );
            (
                interest_only_schedule(
                    monthly_rate(*annual_interest_rate_percent),
                    *term_months,
                    principal,
                    input.first_payment_date,
                ),
                "Interest-Only Schedule with Balloon",
            )
        }
        other => {
            return Err(DpaError::UnsupportedRepayment(format!(
                "'{}' repayment has no schedule",
                other.kind()
            )))
        }
    };

    if principal.is_zero() {
        warnings.push("Assistance principal is zero".to_string());
    }

    let total_interest = saturating_total(rows.iter().map(|r| r.interest));
    let total_paid = saturating_total(rows.iter().map(|r| r.payment));

    debug!(periods = rows.len(), %principal, %total_interest, "schedule built");

    let output = ScheduleOutput {
        principal,
        monthly_payment,
        total_interest,
        total_paid,
        rows,
    };

    let assumptions = serde_json::json!({
        "sales_price": input.sales_price.to_string(),
        "loan_amount": input.loan_amount.to_string(),
        "repayment": &input.record.repayment,
        "interest_rounding": "per period, 2dp",
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, &assumptions, warnings, elapsed, output))
}

fn check_term(repayment: &Repayment) -> DpaResult<()> {
    match repayment {
        Repayment::Amortizing { term_months, .. } | Repayment::InterestOnly { term_months, .. }
            if *term_months > MAX_SCHEDULE_TERM_MONTHS =>
        {
            Err(DpaError::InvalidInput {
                field: "repayment.term_months".into(),
                reason: format!(
                    "Schedules are limited to {MAX_SCHEDULE_TERM_MONTHS} months, got {term_months}"
                ),
            })
        }
        _ => Ok(()),
    }
}

impl ScheduleOutput {
    /// Balance outstanding after `period` payments.
    pub fn balance_after(&self, period: u32) -> Money {
        if period == 0 {
            return self.principal;
        }
        self.rows
            .iter()
            .find(|r| r.period == period)
            .map(|r| r.balance)
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amortizing_input() -> ScheduleInput {
        ScheduleInput {
            record: DpaRecord::fixed_amount(dec!(15_000)).with_repayment(Repayment::Amortizing {
                annual_interest_rate_percent: dec!(3),
                term_months: 60,
            }),
            sales_price: dec!(250_000),
            loan_amount: dec!(241_250),
            first_payment_date: NaiveDate::from_ymd_opt(2025, 3, 1),
        }
    }

    #[test]
    fn test_amortizing_schedule_matches_payment() {
        let out = build_schedule(&amortizing_input()).unwrap();
        let s = &out.result;
        assert_eq!(s.monthly_payment, dec!(269.53));
        assert_eq!(s.rows.len(), 60);
        assert_eq!(s.rows[0].payment, s.monthly_payment);
        assert_eq!(s.balance_after(0), dec!(15_000));
        assert_eq!(s.balance_after(60), Decimal::ZERO);
        assert_eq!(s.total_paid - s.total_interest, dec!(15_000));
        assert_eq!(s.rows[59].date, NaiveDate::from_ymd_opt(2030, 2, 1));
    }

    #[test]
    fn test_interest_only_schedule_warns_balloon() {
        let mut input = amortizing_input();
        input.record.repayment = Repayment::InterestOnly {
            annual_interest_rate_percent: dec!(6),
            term_months: 12,
        };
        let out = build_schedule(&input).unwrap();
        assert_eq!(out.result.monthly_payment, dec!(75));
        assert_eq!(out.result.total_interest, dec!(900));
        assert!(out.warnings.iter().any(|w| w.contains("final payment")));
    }

    #[test]
    fn test_term_above_cap_is_rejected() {
        let mut input = amortizing_input();
        input.record.repayment = Repayment::Amortizing {
            annual_interest_rate_percent: dec!(3),
            term_months: u32::MAX,
        };
        let err = build_schedule(&input).unwrap_err();
        match err {
            DpaError::InvalidInput { field, .. } => assert_eq!(field, "repayment.term_months"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_term_at_cap_is_built() {
        let mut input = amortizing_input();
        input.record.repayment = Repayment::InterestOnly {
            annual_interest_rate_percent: dec!(3),
            term_months: MAX_SCHEDULE_TERM_MONTHS,
        };
        let out = build_schedule(&input).unwrap();
        assert_eq!(out.result.rows.len(), MAX_SCHEDULE_TERM_MONTHS as usize);
    }

    #[test]
    fn test_forgivable_program_has_no_schedule() {
        let mut input = amortizing_input();
        input.record.repayment = Repayment::None;
        let err = build_schedule(&input).unwrap_err();
        assert!(matches!(err, DpaError::UnsupportedRepayment(_)));
    }
}
