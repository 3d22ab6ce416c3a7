use chrono::{Months, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Monthly periodic rate from an annual percentage (6 -> 0.005).
pub fn monthly_rate(annual_percent: Percent) -> Rate {
    annual_percent / MONTHS_PER_YEAR / PERCENT
}

/// Round to whole cents, midpoint away from zero.
pub fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Level payment that retires `principal` over `nper` periods at `rate`.
///
/// `rate * P * (1+rate)^n / ((1+rate)^n - 1)`, unrounded. A zero rate
/// degenerates to straight-line `P / n`, and zero periods yield zero. If the
/// compounding factor overflows the payment converges on the perpetuity
/// `rate * P`, which is returned instead. The perpetuity itself saturates at
/// the `Decimal` bounds.
pub fn level_payment(rate: Rate, nper: u32, principal: Money) -> Money {
    if nper == 0 {
        return Decimal::ZERO;
    }
    let periods = Decimal::from(nper);

    if rate.is_zero() {
        return principal / periods;
    }

    let perpetuity = rate.saturating_mul(principal);
    let Some(factor) = Decimal::ONE
        .checked_add(rate)
        .and_then(|base| base.checked_powi(i64::from(nper)))
    else {
        return perpetuity;
    };

    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return principal / periods;
    }

    perpetuity
        .checked_mul(factor)
        .and_then(|numerator| numerator.checked_div(denominator))
        .unwrap_or(perpetuity)
}

/// One period of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
}

/// Cent-rounded amortization schedule for a level-payment loan.
///
/// Interest is rounded each period; the final period absorbs the rounding
/// residue so the closing balance is exactly zero.
pub fn amortization_schedule(
    rate: Rate,
    nper: u32,
    principal: Money,
    first_payment: Option<NaiveDate>,
) -> Vec<AmortizationRow> {
    let payment = round_money(level_payment(rate, nper, principal));
    let mut balance = principal;
    let mut rows = Vec::with_capacity(nper as usize);

    for period in 1..=nper {
        let interest = round_money(balance.saturating_mul(rate));
        let principal_paid = if period == nper {
            balance
        } else {
            payment.saturating_sub(interest).min(balance)
        };
        balance = balance.saturating_sub(principal_paid);

        rows.push(AmortizationRow {
            period,
            date: payment_date(first_payment, period),
            payment: interest.saturating_add(principal_paid),
            interest,
            principal: principal_paid,
            balance,
        });
    }

    rows
}

/// Interest-only schedule: constant interest, balance untouched until the
/// balloon in the final period.
pub fn interest_only_schedule(
    rate: Rate,
    nper: u32,
    principal: Money,
    first_payment: Option<NaiveDate>,
) -> Vec<AmortizationRow> {
    let interest = principal.saturating_mul(rate);
    (1..=nper)
        .map(|period| {
            let balloon = if period == nper { principal } else { Decimal::ZERO };
            AmortizationRow {
                period,
                date: payment_date(first_payment, period),
                payment: interest.saturating_add(balloon),
                interest,
                principal: balloon,
                balance: principal - balloon,
            }
        })
        .collect()
}

fn payment_date(first_payment: Option<NaiveDate>, period: u32) -> Option<NaiveDate> {
    first_payment.and_then(|d| d.checked_add_months(Months::new(period - 1)))
}
