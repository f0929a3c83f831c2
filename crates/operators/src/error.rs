use assets::AssetError;
use core_types::{Address, CoreError, OperatorName};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperatorError {
    #[error("No operator is registered under '{0}'")]
    UnknownOperator(OperatorName),

    #[error("{0} is not allowed to register operators")]
    Unauthorized(Address),

    #[error("Invalid payload: {0}")]
    Payload(#[from] CoreError),

    #[error("Invalid operator call data: {0}")]
    InvalidCallData(String),

    #[error("Operator sold nothing")]
    NothingSold,

    #[error("Operator bought nothing")]
    NothingBought,

    #[error("Asset transfer failed: {0}")]
    Asset(#[from] AssetError),
}
