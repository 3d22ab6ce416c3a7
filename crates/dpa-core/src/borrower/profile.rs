use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DpaError;
use crate::types::Money;
use crate::DpaResult;

/// A loan carries the primary borrower plus at most three co-borrowers.
pub const MAX_BORROWERS: usize = 4;

/// One borrower on the loan, with the monthly liabilities the loan officer
/// keys in from the credit report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Borrower {
    pub slug: String,
    pub name: String,
    pub email: String,
    /// Stored as bare digits.
    pub phone: String,
    /// Gross monthly income.
    pub income: Money,
    pub car_payments: Money,
    pub credit_card_payments: Money,
    pub student_loan_payments: Money,
    pub rent_loss: Money,
}

impl Borrower {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..Self::default()
        }
    }

    /// Monthly credit obligations counted against this borrower.
    pub fn total_payments(&self) -> Money {
        self.car_payments + self.credit_card_payments + self.student_loan_payments + self.rent_loss
    }

    fn monthly_amounts(&self) -> [(&'static str, Money); 5] {
        [
            ("income", self.income),
            ("car_payments", self.car_payments),
            ("credit_card_payments", self.credit_card_payments),
            ("student_loan_payments", self.student_loan_payments),
            ("rent_loss", self.rent_loss),
        ]
    }
}

/// The borrowers on a loan profile. Pages are 1-based: page 1 is the primary
/// borrower, pages 2..=4 the additional borrowers in the order added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorrowerProfile {
    pub primary: Borrower,
    pub additional_borrowers: Vec<Borrower>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realtor_contact_slug: Option<String>,
}

impl BorrowerProfile {
    pub fn new(primary: Borrower) -> Self {
        Self {
            primary,
            ..Self::default()
        }
    }

    pub fn borrower_count(&self) -> usize {
        1 + self.additional_borrowers.len()
    }

    pub fn is_full(&self) -> bool {
        self.borrower_count() >= MAX_BORROWERS
    }

    /// Append an empty co-borrower and return its page.
    pub fn add_borrower(&mut self) -> DpaResult<usize> {
        if self.is_full() {
            return Err(DpaError::LimitExceeded {
                what: "borrowers per loan".into(),
                limit: MAX_BORROWERS,
            });
        }
        let page = self.borrower_count() + 1;
        let slug = self.unused_slug(page);
        self.additional_borrowers.push(Borrower::new(slug));
        Ok(page)
    }

    fn unused_slug(&self, mut n: usize) -> String {
        loop {
            let slug = format!("borrower-{n}");
            if self.borrowers().all(|b| b.slug != slug) {
                return slug;
            }
            n += 1;
        }
    }

    /// Remove a co-borrower. The primary borrower (page 1) cannot be removed.
    pub fn remove_borrower(&mut self, page: usize) -> DpaResult<Borrower> {
        if page < 2 || page > self.borrower_count() {
            return Err(DpaError::InvalidInput {
                field: "page".into(),
                reason: format!(
                    "Co-borrower page must be between 2 and {}",
                    self.borrower_count()
                ),
            });
        }
        Ok(self.additional_borrowers.remove(page - 2))
    }

    pub fn borrower(&self, page: usize) -> Option<&Borrower> {
        match page {
            0 => None,
            1 => Some(&self.primary),
            n => self.additional_borrowers.get(n - 2),
        }
    }

    pub fn borrower_mut(&mut self, page: usize) -> Option<&mut Borrower> {
        match page {
            0 => None,
            1 => Some(&mut self.primary),
            n => self.additional_borrowers.get_mut(n - 2),
        }
    }

    pub fn borrowers(&self) -> impl Iterator<Item = &Borrower> {
        std::iter::once(&self.primary).chain(self.additional_borrowers.iter())
    }

    /// Combined gross monthly income.
    pub fn total_income(&self) -> Money {
        self.borrowers().map(|b| b.income).sum()
    }

    /// Combined monthly credit payments across all borrowers.
    pub fn total_monthly_payments(&self) -> Money {
        self.borrowers().map(Borrower::total_payments).sum()
    }

    pub fn validate(&self) -> DpaResult<()> {
        if self.borrower_count() > MAX_BORROWERS {
            return Err(DpaError::LimitExceeded {
                what: "borrowers per loan".into(),
                limit: MAX_BORROWERS,
            });
        }
        for (idx, borrower) in self.borrowers().enumerate() {
            for (field, amount) in borrower.monthly_amounts() {
                if amount < Decimal::ZERO {
                    return Err(DpaError::InvalidInput {
                        field: format!("borrowers[{idx}].{field}"),
                        reason: "Monthly amounts must be non-negative".into(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn primary() -> Borrower {
        Borrower {
            slug: "primary".into(),
            name: "Dana Reyes".into(),
            income: dec!(6500),
            car_payments: dec!(425),
            credit_card_payments: dec!(90),
            student_loan_payments: dec!(210),
            rent_loss: Decimal::ZERO,
            ..Borrower::default()
        }
    }

    #[test]
    fn test_total_payments_sums_liabilities() {
        assert_eq!(primary().total_payments(), dec!(725));
    }

    #[test]
    fn test_add_borrower_caps_at_four() {
        let mut profile = BorrowerProfile::new(primary());
        assert_eq!(profile.add_borrower().unwrap(), 2);
        assert_eq!(profile.add_borrower().unwrap(), 3);
        assert_eq!(profile.add_borrower().unwrap(), 4);
        assert!(profile.is_full());

        match profile.add_borrower().unwrap_err() {
            DpaError::LimitExceeded { limit, .. } => assert_eq!(limit, MAX_BORROWERS),
            other => panic!("Expected LimitExceeded, got {other:?}"),
        }
        assert_eq!(profile.borrower_count(), 4);
    }

    #[test]
    fn test_pages_are_one_based() {
        let mut profile = BorrowerProfile::new(primary());
        profile.add_borrower().unwrap();

        assert!(profile.borrower(0).is_none());
        assert_eq!(profile.borrower(1).unwrap().slug, "primary");
        assert_eq!(profile.borrower(2).unwrap().slug, "borrower-2");
        assert!(profile.borrower(3).is_none());
    }

    #[test]
    fn test_combined_totals() {
        let mut profile = BorrowerProfile::new(primary());
        let page = profile.add_borrower().unwrap();
        let co = profile.borrower_mut(page).unwrap();
        co.income = dec!(3200);
        co.credit_card_payments = dec!(60);

        assert_eq!(profile.total_income(), dec!(9700));
        assert_eq!(profile.total_monthly_payments(), dec!(785));
    }

    #[test]
    fn test_primary_cannot_be_removed() {
        let mut profile = BorrowerProfile::new(primary());
        profile.add_borrower().unwrap();
        assert!(profile.remove_borrower(1).is_err());
        assert_eq!(profile.remove_borrower(2).unwrap().slug, "borrower-2");
        assert_eq!(profile.borrower_count(), 1);
    }

    #[test]
    fn test_slugs_stay_unique_after_removal() {
        let mut profile = BorrowerProfile::new(primary());
        profile.add_borrower().unwrap();
        profile.add_borrower().unwrap();
        profile.remove_borrower(2).unwrap();
        let page = profile.add_borrower().unwrap();
        assert_eq!(page, 3);
        assert_eq!(profile.borrower(3).unwrap().slug, "borrower-4");
    }

    #[test]
    fn test_validate_rejects_negative_amounts() {
        let mut profile = BorrowerProfile::new(primary());
        profile.primary.rent_loss = dec!(-1);
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("borrowers[0].rent_loss"));
    }
}
