use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::contact::{is_valid_email, is_valid_phone};
use super::profile::{BorrowerProfile, MAX_BORROWERS};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::DpaResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowerLine {
    pub page: usize,
    pub slug: String,
    pub name: String,
    pub income: Money,
    pub total_payments: Money,
    pub email_valid: bool,
    pub phone_valid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileOutput {
    pub borrower_count: usize,
    pub can_add_borrower: bool,
    pub borrowers: Vec<BorrowerLine>,
    pub combined_income: Money,
    pub combined_payments: Money,
}

/// Per-borrower and combined figures for a profile. Bad contact details are
/// reported as warnings, not errors; the panel lets the officer save them.
pub fn analyze_profile(profile: &BorrowerProfile) -> DpaResult<ComputationOutput<ProfileOutput>> {
    let start = Instant::now();
    profile.validate()?;

    let mut warnings = Vec::new();
    let borrowers: Vec<BorrowerLine> = profile
        .borrowers()
        .enumerate()
        .map(|(idx, b)| {
            let page = idx + 1;
            let label = if b.name.is_empty() {
                format!("Borrower {page}")
            } else {
                b.name.clone()
            };
            let email_valid = is_valid_email(&b.email);
            let phone_valid = is_valid_phone(&b.phone);
            if !email_valid {
                warnings.push(format!("{label}: invalid email address '{}'", b.email));
            }
            if !phone_valid {
                warnings.push(format!("{label}: phone number must have 10 digits"));
            }
            BorrowerLine {
                page,
                slug: b.slug.clone(),
                name: b.name.clone(),
                income: b.income,
                total_payments: b.total_payments(),
                email_valid,
                phone_valid,
            }
        })
        .collect();

    let output = ProfileOutput {
        borrower_count: profile.borrower_count(),
        can_add_borrower: !profile.is_full(),
        borrowers,
        combined_income: profile.total_income(),
        combined_payments: profile.total_monthly_payments(),
    };

    debug!(
        borrowers = output.borrower_count,
        combined_income = %output.combined_income,
        combined_payments = %output.combined_payments,
        "profile analysed"
    );

    let assumptions = serde_json::json!({
        "max_borrowers": MAX_BORROWERS,
        "payments": ["car_payments", "credit_card_payments", "student_loan_payments", "rent_loss"],
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Borrower Profile Summary",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}
