pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "assistance")]
pub mod assistance;

#[cfg(feature = "borrower")]
pub mod borrower;

pub use error::DpaError;
pub use types::*;

/// Standard result type for all dpa-core operations
pub type DpaResult<T> = Result<T, DpaError>;
