use core_types::{Address, PortfolioId};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordsError {
    #[error("{0} is not the factory and cannot modify portfolio records")]
    OnlyFactory(Address),

    #[error("Insufficient amount of {asset} in portfolio {id}. Required: {required}, Available: {available}")]
    InsufficientAmount {
        id: PortfolioId,
        asset: Address,
        required: Decimal,
        available: Decimal,
    },

    #[error("Cannot remove {asset}, the last asset of portfolio {id}")]
    LastAssetProtected { id: PortfolioId, asset: Address },

    #[error("Lock timestamp of portfolio {id} must increase. Current: {current}, Requested: {requested}")]
    TimestampMustIncrease {
        id: PortfolioId,
        current: u64,
        requested: u64,
    },

    #[error("Holding of {asset} in portfolio {id} would overflow")]
    Overflow { id: PortfolioId, asset: Address },

    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),
}
