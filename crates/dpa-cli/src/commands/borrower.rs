use clap::Args;
use serde_json::Value;

use dpa_core::borrower::summary;
use dpa_core::borrower::BorrowerProfile;

use crate::input;

/// Arguments for a borrower profile summary
#[derive(Args)]
pub struct ProfileArgs {
    /// Path to JSON/YAML input file with `primary` and `additional_borrowers`
    #[arg(long)]
    pub input: Option<String>,

    /// Only print the borrower on this page (1 = primary)
    #[arg(long)]
    pub page: Option<usize>,
}

pub fn run_profile(args: ProfileArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile: BorrowerProfile = input::load(args.input.as_deref(), "borrower profile")?;
    let result = summary::analyze_profile(&profile)?;

    match args.page {
        None => Ok(serde_json::to_value(result)?),
        Some(page) => {
            let line = result
                .result
                .borrowers
                .into_iter()
                .find(|b| b.page == page)
                .ok_or_else(|| {
                    format!(
                        "Page {page} does not exist; profile has {} borrower(s)",
                        result.result.borrower_count
                    )
                })?;
            Ok(serde_json::json!({
                "result": line,
                "methodology": result.methodology,
                "warnings": result.warnings,
            }))
        }
    }
}
