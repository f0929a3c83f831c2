//! # Nested Assets Crate
//!
//! Fungible asset balances and the custody account that holds every portfolio's
//! assets.
//!
//! - `AssetLedger`: the trait through which the factory and the operators move
//!   value. Anything that can report a balance and perform a checked transfer can
//!   back the factory.
//! - `InMemoryLedger`: a cloneable, map-backed ledger used by the simulator and the
//!   tests. Cloning it is how the factory stages an operation before committing it.
//! - `Reserve`: the custody account. Only the factory may withdraw from it.

pub mod error;
pub mod ledger;
pub mod reserve;

pub use error::AssetError;
pub use ledger::{AssetLedger, InMemoryLedger};
pub use reserve::Reserve;
