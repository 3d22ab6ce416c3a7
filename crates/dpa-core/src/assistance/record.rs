//! The DPA record: how the assistance principal is derived and how it is repaid.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::DpaError;
use crate::types::{Money, Percent};
use crate::DpaResult;

// ---------------------------------------------------------------------------
// Basis
// ---------------------------------------------------------------------------

/// How the assistance principal is derived.
///
/// Unknown wire values are retained as `Unrecognized` instead of failing
/// deserialization; the calculator treats them as contributing nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BasisType {
    /// `basis_value` percent of the sales price.
    #[default]
    SalesPricePercent,
    /// `basis_value` percent of the loan amount.
    LoanAmountPercent,
    /// `basis_value` is the principal itself.
    FixedAmount,
    Unrecognized(String),
}

impl BasisType {
    pub fn as_str(&self) -> &str {
        match self {
            BasisType::SalesPricePercent => "salesPrice",
            BasisType::LoanAmountPercent => "loanAmount",
            BasisType::FixedAmount => "fixed",
            BasisType::Unrecognized(raw) => raw,
        }
    }

    pub fn is_percent(&self) -> bool {
        matches!(
            self,
            BasisType::SalesPricePercent | BasisType::LoanAmountPercent
        )
    }
}

impl From<String> for BasisType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "salesPrice" | "salesPricePercent" | "sales_price" | "sales_price_percent" => {
                BasisType::SalesPricePercent
            }
            "loanAmount" | "loanAmountPercent" | "loan_amount" | "loan_amount_percent" => {
                BasisType::LoanAmountPercent
            }
            "fixed" | "fixedAmount" | "fixed_amount" => BasisType::FixedAmount,
            _ => BasisType::Unrecognized(raw),
        }
    }
}

impl From<BasisType> for String {
    fn from(basis: BasisType) -> Self {
        match basis {
            BasisType::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BasisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Repayment
// ---------------------------------------------------------------------------

/// Repayment terms attached to the assistance.
///
/// Serialized with a `payment_type` tag. Deserialization also accepts the
/// loan screen's `paymentType` key and its short tags (`I/O`, `loan`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "payment_type",
    rename_all = "snake_case",
    try_from = "RepaymentFields"
)]
pub enum Repayment {
    /// Forgivable or deferred: no scheduled payment.
    None,
    /// Flat recurring payment, independent of the principal.
    Fixed { amount: Money },
    /// Monthly interest on the full principal; no amortization.
    InterestOnly {
        annual_interest_rate_percent: Percent,
        term_months: u32,
    },
    /// Standard level-payment second lien.
    Amortizing {
        annual_interest_rate_percent: Percent,
        term_months: u32,
    },
    Unrecognized,
}

/// Flat wire form of [`Repayment`]; the tag is an ordinary field here.
#[derive(Deserialize)]
struct RepaymentFields {
    #[serde(alias = "paymentType")]
    payment_type: String,
    amount: Option<Money>,
    #[serde(alias = "interest", alias = "annualInterestRatePercent")]
    annual_interest_rate_percent: Option<Percent>,
    #[serde(alias = "term", alias = "termMonths")]
    term_months: Option<u32>,
}

impl TryFrom<RepaymentFields> for Repayment {
    type Error = String;

    fn try_from(fields: RepaymentFields) -> Result<Self, Self::Error> {
        let missing = |field: &str| {
            format!(
                "missing field `{field}` for '{}' repayment",
                fields.payment_type
            )
        };

        let repayment = match fields.payment_type.as_str() {
            "none" => Repayment::None,
            "fixed" => Repayment::Fixed {
                amount: fields.amount.ok_or_else(|| missing("amount"))?,
            },
            "interest_only" | "interestOnly" | "I/O" => Repayment::InterestOnly {
                annual_interest_rate_percent: fields
                    .annual_interest_rate_percent
                    .ok_or_else(|| missing("annual_interest_rate_percent"))?,
                term_months: fields.term_months.ok_or_else(|| missing("term_months"))?,
            },
            "amortizing" | "loan" => Repayment::Amortizing {
                annual_interest_rate_percent: fields
                    .annual_interest_rate_percent
                    .ok_or_else(|| missing("annual_interest_rate_percent"))?,
                term_months: fields.term_months.ok_or_else(|| missing("term_months"))?,
            },
            _ => Repayment::Unrecognized,
        };
        Ok(repayment)
    }
}

impl Repayment {
    pub fn kind(&self) -> &'static str {
        match self {
            Repayment::None => "none",
            Repayment::Fixed { .. } => "fixed",
            Repayment::InterestOnly { .. } => "interest_only",
            Repayment::Amortizing { .. } => "amortizing",
            Repayment::Unrecognized => "unrecognized",
        }
    }
}

impl Default for Repayment {
    fn default() -> Self {
        Repayment::Fixed {
            amount: Decimal::ZERO,
        }
    }
}

/// An explicit `null` means no scheduled payment.
fn nullable_repayment<'de, D>(deserializer: D) -> Result<Repayment, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Repayment>::deserialize(deserializer)?.unwrap_or(Repayment::None))
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One down payment assistance arrangement attached to a loan option.
///
/// Missing fields fall back to the defaults a freshly attached program has in
/// the loan screen: percent of sales price, zero value, zero fee and a zero
/// fixed payment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpaRecord {
    pub name: String,
    #[serde(alias = "type", alias = "basisType")]
    pub basis_type: BasisType,
    #[serde(alias = "value", alias = "basisValue")]
    pub basis_value: Decimal,
    /// Informational only; reported but never used in a payment.
    pub fee: Money,
    #[serde(alias = "payment", deserialize_with = "nullable_repayment")]
    pub repayment: Repayment,
}

impl DpaRecord {
    pub fn fixed_amount(amount: Money) -> Self {
        Self {
            basis_type: BasisType::FixedAmount,
            basis_value: amount,
            ..Self::default()
        }
    }

    pub fn percent_of_sales_price(percent: Percent) -> Self {
        Self {
            basis_type: BasisType::SalesPricePercent,
            basis_value: percent,
            ..Self::default()
        }
    }

    pub fn percent_of_loan_amount(percent: Percent) -> Self {
        Self {
            basis_type: BasisType::LoanAmountPercent,
            basis_value: percent,
            ..Self::default()
        }
    }

    pub fn with_repayment(mut self, repayment: Repayment) -> Self {
        self.repayment = repayment;
        self
    }

    pub fn with_fee(mut self, fee: Money) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check the record's invariants. The calculator never calls this; it is
    /// for callers that want to reject malformed input up front.
    pub fn validate(&self) -> DpaResult<()> {
        if self.basis_value < Decimal::ZERO {
            return Err(DpaError::InvalidInput {
                field: "basis_value".into(),
                reason: "Assistance basis must be non-negative".into(),
            });
        }
        if self.fee < Decimal::ZERO {
            return Err(DpaError::InvalidInput {
                field: "fee".into(),
                reason: "Fee must be non-negative".into(),
            });
        }

        match &self.repayment {
            Repayment::Fixed { amount } if *amount < Decimal::ZERO => {
                Err(DpaError::InvalidInput {
                    field: "repayment.amount".into(),
                    reason: "Fixed payment must be non-negative".into(),
                })
            }
            Repayment::InterestOnly {
                annual_interest_rate_percent,
                term_months,
            }
            | Repayment::Amortizing {
                annual_interest_rate_percent,
                term_months,
            } => {
                if *annual_interest_rate_percent < Decimal::ZERO {
                    return Err(DpaError::InvalidInput {
                        field: "repayment.annual_interest_rate_percent".into(),
                        reason: "Interest rate must be non-negative".into(),
                    });
                }
                if *term_months == 0 {
                    return Err(DpaError::InvalidInput {
                        field: "repayment.term_months".into(),
                        reason: "Term must be at least one month".into(),
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
