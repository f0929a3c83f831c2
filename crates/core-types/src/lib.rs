//! # Nested Core Types
//!
//! The shared vocabulary of the workspace: identifiers, orders, holdings and the
//! operator payload header. As a leaf crate it depends on nothing else in the
//! workspace, so every other crate can speak in these types.

pub mod enums;
pub mod error;
pub mod payload;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{LeftoverPolicy, OperationKind};
pub use error::CoreError;
pub use payload::PayloadHeader;
pub use structs::{Address, AssetAmount, CallContext, Holding, OperatorName, Order, PortfolioId};
