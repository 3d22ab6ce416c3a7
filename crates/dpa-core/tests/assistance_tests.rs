use dpa_core::assistance::analysis::{self, AssistanceInput, DpaCalculationInput};
use dpa_core::assistance::schedule::{self, ScheduleInput};
use dpa_core::assistance::{
    compute_payment, compute_principal, compute_qualifying_payment, BasisType, DpaRecord,
    Repayment,
};
use dpa_core::time_value::round_money;
use dpa_core::DpaError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Reference scenarios
// ===========================================================================

fn state_hfa_io() -> DpaRecord {
    DpaRecord::percent_of_sales_price(dec!(3)).with_repayment(Repayment::InterestOnly {
        annual_interest_rate_percent: dec!(6),
        term_months: 360,
    })
}

#[test]
fn test_interest_only_payment_and_qualifier_diverge() {
    // 3% of 300k = 9,000; I/O at 6% = 45.00; qualified as a 30yr amortizing loan
    let record = state_hfa_io();
    let sp = dec!(300_000);
    let la = dec!(291_000);

    assert_eq!(compute_principal(&record, sp, la), dec!(9000));
    assert_eq!(compute_payment(&record, sp, la), dec!(45));
    assert_eq!(compute_qualifying_payment(&record, sp, la), dec!(53.96));
}

#[test]
fn test_amortizing_payment_and_zero_qualifier() {
    let record = DpaRecord::percent_of_sales_price(dec!(3)).with_repayment(Repayment::Amortizing {
        annual_interest_rate_percent: dec!(6),
        term_months: 360,
    });
    let sp = dec!(300_000);
    let la = dec!(291_000);

    assert_eq!(compute_payment(&record, sp, la), dec!(53.96));
    assert_eq!(compute_qualifying_payment(&record, sp, la), Decimal::ZERO);
}

#[test]
fn test_fixed_250_regardless_of_principal() {
    for basis in [dec!(0), dec!(3), dec!(10)] {
        let record = DpaRecord::percent_of_loan_amount(basis)
            .with_repayment(Repayment::Fixed { amount: dec!(250) });
        assert_eq!(
            compute_payment(&record, dec!(450_000), dec!(434_250)),
            dec!(250)
        );
    }
}

#[test]
fn test_zero_percent_of_sales_price_is_zero() {
    let record = DpaRecord::percent_of_sales_price(Decimal::ZERO);
    assert_eq!(
        compute_principal(&record, dec!(525_000), dec!(506_625)),
        Decimal::ZERO
    );
}

#[test]
fn test_loan_screen_json_prices_like_typed_record() {
    let input: DpaCalculationInput = serde_json::from_value(serde_json::json!({
        "record": {
            "type": "salesPrice",
            "value": 3,
            "payment": { "paymentType": "loan", "interest": 6, "term": 360 }
        },
        "sales_price": 300000,
        "loan_amount": 291000
    }))
    .unwrap();

    let figures = analysis::calculate_figures(&input);
    assert_eq!(figures.principal, dec!(9000));
    assert_eq!(figures.payment, dec!(53.96));
    assert_eq!(figures.qualifying_payment, Decimal::ZERO);
}

#[test]
fn test_unrecognized_tags_degrade_to_zero() {
    let input: DpaCalculationInput = serde_json::from_value(serde_json::json!({
        "record": {
            "basis_type": "appraisedValue",
            "basis_value": 5,
            "repayment": { "payment_type": "graduated" }
        },
        "sales_price": 300000,
        "loan_amount": 291000
    }))
    .unwrap();

    assert_eq!(
        input.record.basis_type,
        BasisType::Unrecognized("appraisedValue".into())
    );
    let figures = analysis::calculate_figures(&input);
    assert_eq!(figures.principal, Decimal::ZERO);
    assert_eq!(figures.payment, Decimal::ZERO);
    assert_eq!(figures.qualifying_payment, Decimal::ZERO);
}

// ===========================================================================
// Analysis envelope
// ===========================================================================

#[test]
fn test_analysis_stacks_programs() {
    let input = AssistanceInput {
        records: vec![
            state_hfa_io().with_name("HFA second").with_fee(dec!(395)),
            DpaRecord::fixed_amount(dec!(10_000))
                .with_name("City grant")
                .with_repayment(Repayment::None),
            DpaRecord::percent_of_loan_amount(dec!(2))
                .with_name("Employer assistance")
                .with_repayment(Repayment::Fixed { amount: dec!(75) }),
        ],
        sales_price: dec!(300_000),
        loan_amount: dec!(291_000),
    };

    let out = analysis::analyze_assistance(&input).unwrap();
    let r = &out.result;

    // 9,000 + 10,000 + 5,820
    assert_eq!(r.total_principal, dec!(24_820));
    assert_eq!(r.total_payment, dec!(120));
    assert_eq!(r.total_qualifying_payment, dec!(53.96));
    assert_eq!(r.total_fees, dec!(395));
    assert_eq!(r.lines[2].repayment_type, "fixed");
    assert!(out
        .warnings
        .iter()
        .any(|w| w.starts_with("Employer assistance")));
}

#[test]
fn test_analysis_rejects_invalid_record() {
    let input = AssistanceInput {
        records: vec![DpaRecord::fixed_amount(dec!(5000)).with_repayment(
            Repayment::InterestOnly {
                annual_interest_rate_percent: dec!(-1),
                term_months: 60,
            },
        )],
        sales_price: dec!(300_000),
        loan_amount: dec!(291_000),
    };

    match analysis::analyze_assistance(&input).unwrap_err() {
        DpaError::InvalidInput { field, .. } => {
            assert_eq!(field, "repayment.annual_interest_rate_percent")
        }
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_schedule_for_percent_of_loan_program() {
    let input = ScheduleInput {
        record: DpaRecord::percent_of_loan_amount(dec!(5)).with_repayment(
            Repayment::Amortizing {
                annual_interest_rate_percent: dec!(4),
                term_months: 120,
            },
        ),
        sales_price: dec!(210_000),
        loan_amount: dec!(200_000),
        first_payment_date: None,
    };

    let out = schedule::build_schedule(&input).unwrap();
    let s = &out.result;
    assert_eq!(s.principal, dec!(10_000));
    assert_eq!(s.monthly_payment, dec!(101.25));
    assert_eq!(s.rows.len(), 120);
    assert_eq!(s.rows.last().unwrap().balance, Decimal::ZERO);
}

// ===========================================================================
// Laws
// ===========================================================================

fn money() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000, 0u32..=2).prop_map(|(m, s)| Decimal::new(m, s))
}

fn percent() -> impl Strategy<Value = Decimal> {
    (0i64..=2_000, 0u32..=2).prop_map(|(m, s)| Decimal::new(m, s))
}

fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..=2_500).prop_map(|bps| Decimal::new(bps, 2))
}

proptest! {
    #[test]
    fn fixed_basis_ignores_transaction(amount in money(), sp in money(), la in money()) {
        let record = DpaRecord::fixed_amount(amount);
        prop_assert_eq!(compute_principal(&record, sp, la), amount);
    }

    #[test]
    fn no_repayment_means_no_payment(basis in percent(), sp in money(), la in money()) {
        let record = DpaRecord::percent_of_sales_price(basis).with_repayment(Repayment::None);
        prop_assert_eq!(compute_payment(&record, sp, la), Decimal::ZERO);
        prop_assert_eq!(compute_qualifying_payment(&record, sp, la), Decimal::ZERO);
    }

    #[test]
    fn amortizing_payment_has_at_most_two_decimals(
        principal in money(),
        rate in positive_rate(),
        term in 1u32..=480,
    ) {
        let record = DpaRecord::fixed_amount(principal).with_repayment(Repayment::Amortizing {
            annual_interest_rate_percent: rate,
            term_months: term,
        });
        let pmt = compute_payment(&record, Decimal::ZERO, Decimal::ZERO);
        prop_assert!(pmt.normalize().scale() <= 2, "payment {} has more than 2dp", pmt);
        prop_assert!(pmt >= Decimal::ZERO);
    }

    #[test]
    fn interest_only_qualifies_at_or_above_its_payment(
        principal in money(),
        rate in positive_rate(),
        term in 1u32..=480,
    ) {
        let record = DpaRecord::fixed_amount(principal).with_repayment(Repayment::InterestOnly {
            annual_interest_rate_percent: rate,
            term_months: term,
        });
        let paid = compute_payment(&record, Decimal::ZERO, Decimal::ZERO);
        let qualified = compute_qualifying_payment(&record, Decimal::ZERO, Decimal::ZERO);
        prop_assert!(qualified >= round_money(paid));
    }

    #[test]
    fn calculations_are_idempotent(
        basis in percent(),
        sp in money(),
        la in money(),
        rate in positive_rate(),
        term in 1u32..=480,
    ) {
        let record = DpaRecord::percent_of_loan_amount(basis).with_repayment(Repayment::InterestOnly {
            annual_interest_rate_percent: rate,
            term_months: term,
        });
        prop_assert_eq!(compute_principal(&record, sp, la), compute_principal(&record, sp, la));
        prop_assert_eq!(compute_payment(&record, sp, la), compute_payment(&record, sp, la));
        prop_assert_eq!(
            compute_qualifying_payment(&record, sp, la),
            compute_qualifying_payment(&record, sp, la)
        );
    }
}
