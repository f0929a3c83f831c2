//! # Nested Operators Crate
//!
//! Pluggable execution back-ends. An operator receives the opaque payload of one
//! order and performs the exchange by moving assets through the host ledger. The
//! factory never trusts what an operator reports; it measures its own balances
//! before and after the call.
//!
//! ## Public API
//!
//! - `Operator`: the calling convention every operator implements.
//! - `OperatorContext`: what an operator may touch during a call.
//! - `OperatorResolver`: the name to handle registry the factory dispatches through.
//! - `RouterOperator`: a reference operator trading against a router account.
//! - `OperatorError`: the specific error types that can be returned from this crate.

pub mod error;
pub mod operator;
pub mod resolver;
pub mod router;

pub use error::OperatorError;
pub use operator::{Operator, OperatorContext};
pub use resolver::OperatorResolver;
pub use router::{RouterCall, RouterOperator};
