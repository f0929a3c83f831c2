//! # Nested Ownership Crate
//!
//! The registry of portfolio ownership tokens. Each portfolio is represented by a
//! unique, non-fungible `PortfolioId`; whoever owns the id controls the portfolio.
//! Only the factory may mint and burn ids, and ids are never reused.

pub mod error;
pub mod registry;

pub use error::OwnershipError;
pub use registry::{NftRegistry, PortfolioRegistry};
