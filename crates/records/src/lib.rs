//! # Nested Records Crate
//!
//! The holdings ledger. `Records` is the single source of truth for what each
//! portfolio owns and until when it is locked. The reserve holds the actual
//! tokens; `Records` says whose they are.
//!
//! ## Invariants
//!
//! - At most one holding per (portfolio, asset), and the asset list keeps
//!   first-insertion order without duplicates.
//! - An asset leaves the list when its quantity reaches zero.
//! - Only the factory can mutate the records.

pub mod error;
pub mod records;

pub use error::RecordsError;
pub use records::{PortfolioRecord, Records, RemovalGuard};
