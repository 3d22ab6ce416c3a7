//! Assistance analysis: price every DPA program on a loan option and roll the
//! results up into the figures the loan screen and underwriting consume.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::calculator::{compute_payment, compute_principal, compute_qualifying_payment};
use super::record::{BasisType, DpaRecord, Repayment};
use crate::error::DpaError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::DpaResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A single DPA program priced against one transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DpaCalculationInput {
    pub record: DpaRecord,
    pub sales_price: Money,
    pub loan_amount: Money,
}

/// Every DPA program attached to a loan option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistanceInput {
    pub records: Vec<DpaRecord>,
    pub sales_price: Money,
    pub loan_amount: Money,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// The three figures for a single program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpaFigures {
    pub principal: Money,
    pub payment: Money,
    pub qualifying_payment: Money,
}

/// Per-program line of an assistance analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistanceLine {
    pub name: String,
    pub basis_type: BasisType,
    pub repayment_type: String,
    pub principal: Money,
    pub payment: Money,
    pub qualifying_payment: Money,
    pub fee: Money,
}

/// Rolled-up assistance for a loan option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistanceOutput {
    pub lines: Vec<AssistanceLine>,
    pub total_principal: Money,
    pub total_payment: Money,
    pub total_qualifying_payment: Money,
    pub total_fees: Money,
    /// Assistance principal as a percent of the sales price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistance_to_price_percent: Option<Percent>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// All three figures for one program. Infallible, like the functions it wraps.
pub fn calculate_figures(input: &DpaCalculationInput) -> DpaFigures {
    DpaFigures {
        principal: compute_principal(&input.record, input.sales_price, input.loan_amount),
        payment: compute_payment(&input.record, input.sales_price, input.loan_amount),
        qualifying_payment: compute_qualifying_payment(
            &input.record,
            input.sales_price,
            input.loan_amount,
        ),
    }
}

/// Price every program on a loan option and total them.
pub fn analyze_assistance(
    input: &AssistanceInput,
) -> DpaResult<ComputationOutput<AssistanceOutput>> {
    let start = Instant::now();
    validate_input(input)?;

    let mut warnings: Vec<String> = Vec::new();
    let mut lines = Vec::with_capacity(input.records.len());

    for (idx, record) in input.records.iter().enumerate() {
        let label = line_label(record, idx);
        let figures = calculate_figures(&DpaCalculationInput {
            record: record.clone(),
            sales_price: input.sales_price,
            loan_amount: input.loan_amount,
        });

        collect_warnings(record, &label, &figures, input.sales_price, &mut warnings);

        lines.push(AssistanceLine {
            name: label,
            basis_type: record.basis_type.clone(),
            repayment_type: record.repayment.kind().to_string(),
            principal: figures.principal,
            payment: figures.payment,
            qualifying_payment: figures.qualifying_payment,
            fee: record.fee,
        });
    }

    let total_principal = saturating_total(lines.iter().map(|l| l.principal));
    let total_payment = saturating_total(lines.iter().map(|l| l.payment));
    let total_qualifying_payment = saturating_total(lines.iter().map(|l| l.qualifying_payment));
    let total_fees = saturating_total(lines.iter().map(|l| l.fee));

    let assistance_to_price_percent = if input.sales_price > Decimal::ZERO {
        total_principal
            .checked_div(input.sales_price)
            .and_then(|share| share.checked_mul(dec!(100)))
    } else {
        None
    };

    if input.sales_price > Decimal::ZERO && total_principal > input.sales_price {
        warnings.push(format!(
            "Total assistance {total_principal} exceeds the sales price {}",
            input.sales_price
        ));
    }

    debug!(
        programs = lines.len(),
        %total_principal,
        %total_payment,
        %total_qualifying_payment,
        "assistance analysed"
    );

    let output = AssistanceOutput {
        lines,
        total_principal,
        total_payment,
        total_qualifying_payment,
        total_fees,
        assistance_to_price_percent,
    };

    let assumptions = serde_json::json!({
        "sales_price": input.sales_price.to_string(),
        "loan_amount": input.loan_amount.to_string(),
        "programs": input.records.len(),
        "amortizing_rounding": "2dp, midpoint away from zero",
        "qualifying_rule": "interest-only assistance qualifies at its amortizing payment; all other kinds at zero",
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Down Payment Assistance Analysis",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn saturating_total(amounts: impl Iterator<Item = Money>) -> Money {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

fn validate_input(input: &AssistanceInput) -> DpaResult<()> {
    if input.records.is_empty() {
        return Err(DpaError::InvalidInput {
            field: "records".into(),
            reason: "At least one assistance program is required".into(),
        });
    }
    if input.sales_price < Decimal::ZERO {
        return Err(DpaError::InvalidInput {
            field: "sales_price".into(),
            reason: "Sales price must be non-negative".into(),
        });
    }
    if input.loan_amount < Decimal::ZERO {
        return Err(DpaError::InvalidInput {
            field: "loan_amount".into(),
            reason: "Loan amount must be non-negative".into(),
        });
    }
    for record in &input.records {
        record.validate()?;
    }
    Ok(())
}

fn line_label(record: &DpaRecord, idx: usize) -> String {
    if record.name.trim().is_empty() {
        format!("DPA {}", idx + 1)
    } else {
        record.name.clone()
    }
}

fn collect_warnings(
    record: &DpaRecord,
    label: &str,
    figures: &DpaFigures,
    sales_price: Money,
    warnings: &mut Vec<String>,
) {
    if let BasisType::Unrecognized(raw) = &record.basis_type {
        warn!(program = label, basis = %raw, "unrecognized assistance basis");
        warnings.push(format!(
            "{label}: unrecognized basis type '{raw}', principal counted as 0"
        ));
    }

    if record.basis_type.is_percent() && record.basis_value > dec!(100) {
        warnings.push(format!(
            "{label}: basis of {}% exceeds 100%",
            record.basis_value
        ));
    }

    match &record.repayment {
        Repayment::Unrecognized => {
            warn!(program = label, "unrecognized repayment type");
            warnings.push(format!(
                "{label}: unrecognized repayment type, payment counted as 0"
            ));
        }
        Repayment::Fixed { amount } => {
            if figures.principal.is_zero() && !amount.is_zero() {
                warnings.push(format!(
                    "{label}: fixed payment of {amount} with zero assistance principal"
                ));
            }
            if !amount.is_zero() {
                warnings.push(format!(
                    "{label}: fixed payment is not included in the qualifying payment"
                ));
            }
        }
        Repayment::Amortizing { .. } => {
            warnings.push(format!(
                "{label}: amortizing payment of {} is not included in the qualifying payment",
                figures.payment
            ));
        }
        Repayment::None | Repayment::InterestOnly { .. } => {}
    }

    if sales_price.is_zero() && record.basis_type == BasisType::SalesPricePercent {
        warnings.push(format!(
            "{label}: sales price is zero, percent-of-price assistance is 0"
        ));
    }
}
