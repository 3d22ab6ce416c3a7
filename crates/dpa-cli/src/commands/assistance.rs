use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use dpa_core::assistance::analysis::{self, AssistanceInput, DpaCalculationInput};
use dpa_core::assistance::schedule::{self, ScheduleInput};
use dpa_core::assistance::{
    compute_payment, compute_principal, compute_qualifying_payment, BasisType, DpaRecord,
    Repayment,
};
use dpa_core::types::{with_metadata, Money};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BasisArg {
    SalesPrice,
    LoanAmount,
    Fixed,
}

impl From<BasisArg> for BasisType {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::SalesPrice => BasisType::SalesPricePercent,
            BasisArg::LoanAmount => BasisType::LoanAmountPercent,
            BasisArg::Fixed => BasisType::FixedAmount,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RepaymentArg {
    None,
    Fixed,
    InterestOnly,
    Amortizing,
}

/// Arguments shared by the single-program calculations
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CalcArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// How the assistance principal is derived
    #[arg(long, value_enum)]
    pub basis_type: Option<BasisArg>,

    /// Percent (0-100) for percent bases, dollars for a fixed basis
    #[arg(long)]
    pub basis_value: Option<Decimal>,

    /// Sales price of the property
    #[arg(long, default_value = "0")]
    pub sales_price: Decimal,

    /// Base loan amount
    #[arg(long, default_value = "0")]
    pub loan_amount: Decimal,

    /// Repayment terms of the assistance
    #[arg(long, value_enum, default_value = "none")]
    pub repayment: RepaymentArg,

    /// Monthly amount for fixed repayment
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 6 for 6%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// Program fee (reported only)
    #[arg(long)]
    pub fee: Option<Decimal>,

    /// Program name
    #[arg(long)]
    pub name: Option<String>,
}

/// Arguments for a multi-program analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON/YAML input file with `records`, `sales_price`, `loan_amount`
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a repayment schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file with `record`, `sales_price`, `loan_amount`
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Serialize)]
struct PrincipalResult {
    principal: Money,
}

#[derive(Serialize)]
struct PaymentResult {
    payment: Money,
    principal: Money,
    repayment_type: &'static str,
}

#[derive(Serialize)]
struct QualifyingResult {
    qualifying_payment: Money,
    principal: Money,
    repayment_type: &'static str,
}

pub fn run_principal(args: CalcArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let calc = calculation_input(args)?;
    let principal = compute_principal(&calc.record, calc.sales_price, calc.loan_amount);
    let out = with_metadata(
        "DPA Principal",
        &calc,
        vec![],
        start.elapsed().as_micros() as u64,
        PrincipalResult { principal },
    );
    Ok(serde_json::to_value(out)?)
}

pub fn run_payment(args: CalcArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let calc = calculation_input(args)?;
    let result = PaymentResult {
        payment: compute_payment(&calc.record, calc.sales_price, calc.loan_amount),
        principal: compute_principal(&calc.record, calc.sales_price, calc.loan_amount),
        repayment_type: calc.record.repayment.kind(),
    };
    let out = with_metadata(
        "DPA Monthly Payment",
        &calc,
        vec![],
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(out)?)
}

pub fn run_qualifying_payment(args: CalcArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let calc = calculation_input(args)?;
    let mut warnings = Vec::new();
    if matches!(
        calc.record.repayment,
        Repayment::Fixed { .. } | Repayment::Amortizing { .. }
    ) {
        warnings.push(format!(
            "{} repayment qualifies at 0; count its payment with other liabilities",
            calc.record.repayment.kind()
        ));
    }
    let result = QualifyingResult {
        qualifying_payment: compute_qualifying_payment(
            &calc.record,
            calc.sales_price,
            calc.loan_amount,
        ),
        principal: compute_principal(&calc.record, calc.sales_price, calc.loan_amount),
        repayment_type: calc.record.repayment.kind(),
    };
    let out = with_metadata(
        "DPA Qualifying Payment",
        &calc,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(out)?)
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assistance: AssistanceInput =
        input::load(args.input.as_deref(), "assistance analysis")?;
    let result = analysis::analyze_assistance(&assistance)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = input::load(args.input.as_deref(), "repayment schedule")?;
    let result = schedule::build_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

fn calculation_input(args: CalcArgs) -> Result<DpaCalculationInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_input(path);
    }
    if args.basis_type.is_none() {
        if let Some(data) = input::stdin::read_stdin()? {
            return Ok(serde_json::from_value(data)?);
        }
    }
    from_flags(args)
}

fn from_flags(args: CalcArgs) -> Result<DpaCalculationInput, Box<dyn std::error::Error>> {
    let basis_type = args
        .basis_type
        .ok_or("--basis-type is required (or provide --input)")?;
    let basis_value = args
        .basis_value
        .ok_or("--basis-value is required (or provide --input)")?;
    let repayment = match args.repayment {
        RepaymentArg::None => Repayment::None,
        RepaymentArg::Fixed => Repayment::Fixed {
            amount: args
                .amount
                .ok_or("--amount is required for fixed repayment")?,
        },
        RepaymentArg::InterestOnly => Repayment::InterestOnly {
            annual_interest_rate_percent: args
                .rate
                .ok_or("--rate is required for interest-only repayment")?,
            term_months: args
                .term
                .ok_or("--term is required for interest-only repayment")?,
        },
        RepaymentArg::Amortizing => Repayment::Amortizing {
            annual_interest_rate_percent: args
                .rate
                .ok_or("--rate is required for amortizing repayment")?,
            term_months: args
                .term
                .ok_or("--term is required for amortizing repayment")?,
        },
    };

    let record = DpaRecord {
        name: args.name.unwrap_or_default(),
        basis_type: basis_type.into(),
        basis_value,
        fee: args.fee.unwrap_or(Decimal::ZERO),
        repayment,
    };
    record.validate()?;

    Ok(DpaCalculationInput {
        record,
        sales_price: args.sales_price,
        loan_amount: args.loan_amount,
    })
}
