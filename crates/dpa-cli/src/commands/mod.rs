pub mod assistance;
pub mod borrower;
