use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid address '{0}': expected 0x followed by 40 hex characters")]
    InvalidAddress(String),

    #[error("Payload of {len} bytes is too short for the {required}-byte asset header")]
    MalformedPayload { len: usize, required: usize },

    #[error("Operator name cannot be empty")]
    EmptyOperatorName,
}
