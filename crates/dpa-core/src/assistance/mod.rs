//! Down payment assistance: the record model, the three pure calculations,
//! and the analysis envelopes built on top of them.

pub mod analysis;
pub mod calculator;
pub mod record;
pub mod schedule;

pub use calculator::{compute_payment, compute_principal, compute_qualifying_payment};
pub use record::{BasisType, DpaRecord, Repayment};
