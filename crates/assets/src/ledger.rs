use crate::error::AssetError;
use core_types::Address;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

/// A set of fungible asset balances that can only change through checked transfers.
///
/// Minting is deliberately not part of the trait: the factory and the operators can
/// only move value that already exists, so total supply is conserved by every call
/// that goes through it.
pub trait AssetLedger: Send + Sync {
    /// Returns the balance of `asset` held by `account`. Unknown pairs hold zero.
    fn balance_of(&self, account: Address, asset: Address) -> Decimal;

    /// Moves `amount` of `asset` from `from` to `to`.
    ///
    /// Fails without changing anything if `amount` is negative, `from` holds less
    /// than `amount` or `to`'s balance would overflow. A zero transfer is a no-op
    /// that always succeeds.
    fn transfer(
        &mut self,
        from: Address,
        to: Address,
        asset: Address,
        amount: Decimal,
    ) -> Result<(), AssetError>;

    /// Converts `amount` of the native coin held by `account` into as much of
    /// `wrapped`. The coin stays locked in the `wrapped` asset's own account, so
    /// the wrapped supply is always fully backed.
    fn wrap_native(
        &mut self,
        account: Address,
        wrapped: Address,
        amount: Decimal,
    ) -> Result<(), AssetError>;
}

/// An in-memory ledger keyed by `(asset, account)`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: HashMap<(Address, Address), Decimal>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `amount` of `asset` out of thin air and credits it to `account`.
    ///
    /// Only the host environment (simulator, tests) mints; nothing in the factory does.
    pub fn mint(
        &mut self,
        account: Address,
        asset: Address,
        amount: Decimal,
    ) -> Result<(), AssetError> {
        if amount.is_sign_negative() {
            return Err(AssetError::NegativeAmount(amount));
        }
        let balance = self.balances.entry((asset, account)).or_insert(Decimal::ZERO);
        *balance = balance
            .checked_add(amount)
            .ok_or(AssetError::Overflow { account, asset })?;
        Ok(())
    }

    /// The sum of every account's balance of `asset`.
    pub fn total_supply(&self, asset: Address) -> Decimal {
        self.balances
            .iter()
            .filter(|((a, _), _)| *a == asset)
            .map(|(_, amount)| *amount)
            .sum()
    }
}

impl AssetLedger for InMemoryLedger {
    fn balance_of(&self, account: Address, asset: Address) -> Decimal {
        self.balances
            .get(&(asset, account))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn transfer(
        &mut self,
        from: Address,
        to: Address,
        asset: Address,
        amount: Decimal,
    ) -> Result<(), AssetError> {
        if amount.is_sign_negative() {
            return Err(AssetError::NegativeAmount(amount));
        }
        if amount.is_zero() {
            return Ok(());
        }

        let available = self.balance_of(from, asset);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                account: from,
                asset,
                required: amount,
                available,
            });
        }

        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to, asset)
            .checked_add(amount)
            .ok_or(AssetError::Overflow { account: to, asset })?;

        self.balances.insert((asset, from), available - amount);
        self.balances.insert((asset, to), credited);
        debug!(%asset, %from, %to, %amount, "Transferred");
        Ok(())
    }

    fn wrap_native(
        &mut self,
        account: Address,
        wrapped: Address,
        amount: Decimal,
    ) -> Result<(), AssetError> {
        if amount.is_sign_negative() {
            return Err(AssetError::NegativeAmount(amount));
        }
        let credited = self
            .balance_of(account, wrapped)
            .checked_add(amount)
            .ok_or(AssetError::Overflow { account, asset: wrapped })?;

        self.transfer(account, wrapped, Address::NATIVE, amount)?;
        self.balances.insert((wrapped, account), credited);
        debug!(%account, %wrapped, %amount, "Wrapped native coin");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_ledger() -> (InMemoryLedger, Address, Address, Address) {
        let dai = Address::from_label("DAI");
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        let mut ledger = InMemoryLedger::new();
        ledger.mint(alice, dai, dec!(100)).unwrap();
        (ledger, dai, alice, bob)
    }

    #[test]
    fn transfer_moves_balance_and_conserves_supply() {
        let (mut ledger, dai, alice, bob) = make_ledger();
        ledger.transfer(alice, bob, dai, dec!(40)).unwrap();

        assert_eq!(ledger.balance_of(alice, dai), dec!(60));
        assert_eq!(ledger.balance_of(bob, dai), dec!(40));
        assert_eq!(ledger.total_supply(dai), dec!(100));
    }

    #[test]
    fn overdraft_is_rejected_without_side_effects() {
        let (mut ledger, dai, alice, bob) = make_ledger();
        let err = ledger.transfer(alice, bob, dai, dec!(100.01)).unwrap_err();

        assert!(matches!(err, AssetError::InsufficientBalance { .. }));
        assert_eq!(ledger.balance_of(alice, dai), dec!(100));
        assert_eq!(ledger.balance_of(bob, dai), Decimal::ZERO);
    }

    #[test]
    fn overflowing_credit_is_rejected_without_side_effects() {
        let (mut ledger, dai, alice, bob) = make_ledger();
        ledger.mint(bob, dai, Decimal::MAX).unwrap();

        assert_eq!(
            ledger.transfer(alice, bob, dai, dec!(1)),
            Err(AssetError::Overflow { account: bob, asset: dai })
        );
        assert_eq!(ledger.balance_of(alice, dai), dec!(100));
        assert_eq!(ledger.balance_of(bob, dai), Decimal::MAX);
        assert!(ledger.mint(bob, dai, dec!(1)).is_err());
    }

    #[test]
    fn wrapping_locks_the_coin_and_credits_the_wrapped_asset() {
        let (mut ledger, _, alice, _) = make_ledger();
        let weth = Address::from_label("WETH");
        ledger.mint(alice, Address::NATIVE, dec!(3)).unwrap();

        ledger.wrap_native(alice, weth, dec!(2)).unwrap();
        assert_eq!(ledger.balance_of(alice, Address::NATIVE), dec!(1));
        assert_eq!(ledger.balance_of(alice, weth), dec!(2));
        assert_eq!(ledger.balance_of(weth, Address::NATIVE), dec!(2));
        assert_eq!(ledger.total_supply(weth), dec!(2));

        assert!(matches!(
            ledger.wrap_native(alice, weth, dec!(5)),
            Err(AssetError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.balance_of(alice, weth), dec!(2));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let (mut ledger, dai, alice, bob) = make_ledger();
        assert_eq!(
            ledger.transfer(alice, bob, dai, dec!(-1)),
            Err(AssetError::NegativeAmount(dec!(-1)))
        );
        assert!(ledger.mint(alice, dai, dec!(-1)).is_err());
    }

    #[test]
    fn zero_transfer_from_empty_account_succeeds() {
        let (mut ledger, dai, _, bob) = make_ledger();
        let carol = Address::from_label("carol");
        assert!(ledger.transfer(carol, bob, dai, Decimal::ZERO).is_ok());
    }
}
