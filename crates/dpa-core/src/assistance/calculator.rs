//! The three DPA figures a loan option needs: principal, scheduled payment,
//! and the payment counted toward qualifying ratios.
//!
//! All three are pure and infallible. Unrecognized basis or repayment tags
//! contribute zero rather than failing, so a half-edited program never blocks
//! the rest of the loan from pricing. Products that exceed the `Decimal`
//! range saturate at `Decimal::MAX` / `Decimal::MIN` instead of panicking.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::record::{BasisType, DpaRecord, Repayment};
use crate::time_value::{level_payment, monthly_rate, round_money};
use crate::types::{Money, Percent};

/// Percent-to-fraction and annual-to-monthly in one step.
const MONTHLY_PERCENT_DIVISOR: Decimal = dec!(1200);

const PERCENT: Decimal = dec!(100);

/// Assistance principal in currency. Not rounded.
pub fn compute_principal(record: &DpaRecord, sales_price: Money, loan_amount: Money) -> Money {
    match &record.basis_type {
        BasisType::SalesPricePercent => (record.basis_value / PERCENT).saturating_mul(sales_price),
        BasisType::LoanAmountPercent => (record.basis_value / PERCENT).saturating_mul(loan_amount),
        BasisType::FixedAmount => record.basis_value,
        BasisType::Unrecognized(_) => Decimal::ZERO,
    }
}

/// Contractual monthly payment on the assistance.
///
/// Fixed payments are returned verbatim and interest-only payments are left
/// unrounded; only the amortizing branch is rounded to cents.
pub fn compute_payment(record: &DpaRecord, sales_price: Money, loan_amount: Money) -> Money {
    let principal = compute_principal(record, sales_price, loan_amount);

    match &record.repayment {
        Repayment::None => Decimal::ZERO,
        Repayment::Fixed { amount } => *amount,
        Repayment::InterestOnly {
            annual_interest_rate_percent,
            ..
        } => principal.saturating_mul(*annual_interest_rate_percent) / MONTHLY_PERCENT_DIVISOR,
        Repayment::Amortizing {
            annual_interest_rate_percent,
            term_months,
        } => amortized_payment(principal, *annual_interest_rate_percent, *term_months),
        Repayment::Unrecognized => Decimal::ZERO,
    }
}

/// Monthly payment counted against the borrower's debt ratios.
///
/// Interest-only assistance is underwritten as if it amortized over its term,
/// which is larger than what the borrower actually pays. Every other repayment
/// kind qualifies at zero here; callers fold fixed and amortizing payments in
/// elsewhere.
pub fn compute_qualifying_payment(
    record: &DpaRecord,
    sales_price: Money,
    loan_amount: Money,
) -> Money {
    match &record.repayment {
        Repayment::InterestOnly {
            annual_interest_rate_percent,
            term_months,
        } => {
            let principal = compute_principal(record, sales_price, loan_amount);
            amortized_payment(principal, *annual_interest_rate_percent, *term_months)
        }
        Repayment::None
        | Repayment::Fixed { .. }
        | Repayment::Amortizing { .. }
        | Repayment::Unrecognized => Decimal::ZERO,
    }
}

fn amortized_payment(principal: Money, annual_rate: Percent, term_months: u32) -> Money {
    round_money(level_payment(monthly_rate(annual_rate), term_months, principal))
}
