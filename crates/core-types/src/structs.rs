use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 20-byte account or asset identifier.
///
/// Accounts (users, the factory, the reserve, the fee sink, routers) and assets
/// share one address space, exactly like token contracts and wallets on the host chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);
    /// Stands for the host chain's native coin wherever an asset is expected
    /// (`0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE`).
    pub const NATIVE: Address = Address([0xee; 20]);
    pub const LEN: usize = 20;

    /// Builds a deterministic address from a short human label (e.g. "DAI").
    ///
    /// The label bytes fill the address from the left and are truncated at 20 bytes.
    /// Used by the demo and the test harnesses to get readable, stable identities.
    pub fn from_label(label: &str) -> Self {
        let mut bytes = [0u8; 20];
        for (slot, byte) in bytes.iter_mut().zip(label.as_bytes()) {
            *slot = *byte;
        }
        Address(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; 20] = bytes.try_into().ok()?;
        Some(Address(array))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidAddress(s.to_string());
        let digits = s.strip_prefix("0x").ok_or_else(invalid)?;
        let bytes = hex::decode(digits).map_err(|_| invalid())?;
        Address::from_slice(&bytes).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Identifier of a portfolio, as minted by the ownership registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortfolioId(pub u64);

impl fmt::Display for PortfolioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The name under which an operator is registered with the resolver (e.g. "ZeroEx").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperatorName(String);

impl OperatorName {
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::EmptyOperatorName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OperatorName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A single caller-supplied swap instruction.
///
/// Orders are transient: they are evaluated once inside one operation and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Name of the operator that will execute the payload.
    pub operator: OperatorName,
    /// The asset the caller expects this order to produce.
    pub output: Address,
    /// Opaque operator call data. Starts with the input/output asset header.
    pub payload: Vec<u8>,
    /// Selects the operator's commit entry point (`true`) or its revert entry point.
    pub commit: bool,
}

/// An `(asset, amount)` pair recorded for one portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub asset: Address,
    pub amount: Decimal,
}

/// A quantity of one asset, used in receipts and events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    pub asset: Address,
    pub amount: Decimal,
}

impl AssetAmount {
    pub fn new(asset: Address, amount: Decimal) -> Self {
        Self { asset, amount }
    }
}

/// Who is calling and when. Supplied with every state-changing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    /// Host time in unix seconds, used for lock checks.
    pub now: u64,
    /// Native coin attached to the call. Only a buy paid in [`Address::NATIVE`] uses it.
    pub value: Decimal,
}

impl CallContext {
    pub fn new(caller: Address, now: u64) -> Self {
        Self {
            caller,
            now,
            value: Decimal::ZERO,
        }
    }

    /// Attaches `value` of the native coin to the call.
    pub fn with_value(self, value: Decimal) -> Self {
        Self { value, ..self }
    }
}
