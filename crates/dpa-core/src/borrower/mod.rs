//! Borrower profile for a loan: up to four borrowers, their monthly
//! liabilities, and the contact rules the borrower panel enforces.

pub mod contact;
pub mod profile;
pub mod summary;

pub use contact::{format_phone_number, is_valid_email, is_valid_phone, normalize_phone};
pub use profile::{Borrower, BorrowerProfile, MAX_BORROWERS};
