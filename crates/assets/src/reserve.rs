use crate::error::AssetError;
use crate::ledger::AssetLedger;
use core_types::Address;
use rust_decimal::Decimal;

/// The custody account holding every portfolio's assets.
///
/// Anyone may deposit into the reserve address; withdrawals go through
/// [`Reserve::transfer_to`], which only the factory may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reserve {
    address: Address,
    factory: Address,
}

impl Reserve {
    pub fn new(address: Address, factory: Address) -> Self {
        Self { address, factory }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    /// Moves `amount` of `asset` out of custody to `to`.
    pub fn transfer_to(
        &self,
        caller: Address,
        ledger: &mut dyn AssetLedger,
        to: Address,
        asset: Address,
        amount: Decimal,
    ) -> Result<(), AssetError> {
        if caller != self.factory {
            return Err(AssetError::Unauthorized {
                caller,
                account: self.address,
            });
        }
        ledger.transfer(self.address, to, asset, amount)
    }
}
