use core_types::Address;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("Insufficient balance of {asset} held by {account}. Required: {required}, Available: {available}")]
    InsufficientBalance {
        account: Address,
        asset: Address,
        required: Decimal,
        available: Decimal,
    },

    #[error("Transfer amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Balance of {asset} held by {account} would overflow")]
    Overflow { account: Address, asset: Address },

    #[error("{caller} is not allowed to move funds out of {account}")]
    Unauthorized { caller: Address, account: Address },
}
