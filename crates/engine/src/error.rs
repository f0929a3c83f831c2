use assets::AssetError;
use core_types::{Address, OperatorName, PortfolioId};
use operators::OperatorError;
use ownership::OwnershipError;
use records::RecordsError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactoryError {
    #[error("Missing orders")]
    MissingOrders,

    #[error("Not the token owner: {caller} does not own portfolio {id}")]
    NotTokenOwner { id: PortfolioId, caller: Address },

    #[error("Portfolio {0} does not exist")]
    UnknownPortfolio(PortfolioId),

    #[error("Input lengths mismatch: {orders} orders for {amounts} sell amounts")]
    InputLengthMismatch { orders: usize, amounts: usize },

    #[error("Insufficient amount of {asset} in portfolio {id}. Required: {required}, Available: {available}")]
    InsufficientAmount {
        id: PortfolioId,
        asset: Address,
        required: Decimal,
        available: Decimal,
    },

    #[error("Portfolio {id} does not hold {asset}")]
    AssetNotHeld { id: PortfolioId, asset: Address },

    #[error("Missing sell args: orders must sell every holding of portfolio {0} exactly once")]
    MissingSellArgs(PortfolioId),

    #[error("No operator is registered under '{0}'")]
    UnknownOperator(OperatorName),

    #[error("Wrong output token in calldata. Expected: {expected}, Found: {found}")]
    WrongOutputAsset { expected: Address, found: Address },

    #[error("Operator call failed: {operator}: {reason}")]
    OperatorCallFailed { operator: OperatorName, reason: String },

    #[error("Orders overspent {asset}. Supplied: {supplied}, Required: {required}")]
    OverSpent {
        asset: Address,
        supplied: Decimal,
        required: Decimal,
    },

    #[error("Amount cannot be negative: {0}")]
    InvalidAmount(Decimal),

    #[error("Arithmetic on {0} overflowed")]
    AmountOverflow(Decimal),

    #[error("Insufficient native value attached. Supplied: {supplied}, Required: {required}")]
    InsufficientValue { supplied: Decimal, required: Decimal },

    #[error("Native coin input is not supported: no wrapped native asset is configured")]
    NativeNotSupported,

    #[error("Portfolio {id} is locked until {unlock_at}")]
    PortfolioLocked { id: PortfolioId, unlock_at: u64 },

    #[error("Cannot remove {asset}, the last asset of portfolio {id}")]
    LastAssetProtected { id: PortfolioId, asset: Address },

    #[error("Lock timestamp of portfolio {id} must increase. Current: {current}, Requested: {requested}")]
    TimestampMustIncrease {
        id: PortfolioId,
        current: u64,
        requested: u64,
    },

    #[error("No reserve has been set")]
    ReserveNotSet,

    #[error("{0} is not the factory owner")]
    Unauthorized(Address),

    #[error("The reserve is already set and cannot be changed")]
    ReserveImmutable,

    #[error("The zero address is not a valid destination")]
    InvalidAddress,

    #[error("VIP fee of {0} bps is not a discount on the standard rate")]
    DiscountTooHigh(u32),

    #[error("Asset transfer failed: {0}")]
    Asset(#[from] AssetError),

    #[error("Records error: {0}")]
    Records(RecordsError),

    #[error("Ownership error: {0}")]
    Ownership(OwnershipError),

    #[error("Operator registry error: {0}")]
    Operator(OperatorError),
}

impl From<RecordsError> for FactoryError {
    fn from(err: RecordsError) -> Self {
        match err {
            RecordsError::InsufficientAmount {
                id,
                asset,
                required,
                available,
            } => FactoryError::InsufficientAmount {
                id,
                asset,
                required,
                available,
            },
            RecordsError::LastAssetProtected { id, asset } => FactoryError::LastAssetProtected { id, asset },
            RecordsError::TimestampMustIncrease {
                id,
                current,
                requested,
            } => FactoryError::TimestampMustIncrease {
                id,
                current,
                requested,
            },
            RecordsError::NegativeAmount(amount) => FactoryError::InvalidAmount(amount),
            other => FactoryError::Records(other),
        }
    }
}

impl From<OwnershipError> for FactoryError {
    fn from(err: OwnershipError) -> Self {
        match err {
            OwnershipError::UnknownPortfolio(id) => FactoryError::UnknownPortfolio(id),
            other => FactoryError::Ownership(other),
        }
    }
}

impl From<OperatorError> for FactoryError {
    fn from(err: OperatorError) -> Self {
        match err {
            OperatorError::UnknownOperator(name) => FactoryError::UnknownOperator(name),
            OperatorError::Unauthorized(caller) => FactoryError::Unauthorized(caller),
            other => FactoryError::Operator(other),
        }
    }
}
