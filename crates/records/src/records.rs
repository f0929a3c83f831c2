use crate::error::RecordsError;
use core_types::{Address, Holding, PortfolioId};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// How a debit that empties a holding is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalGuard {
    /// Refuse to remove the portfolio's last remaining holding.
    ProtectLastAsset,
    /// The portfolio may be left with no holdings.
    AllowEmpty,
}

/// Everything recorded for one portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioRecord {
    /// Assets in first-insertion order.
    pub assets: Vec<Address>,
    pub holdings: HashMap<Address, Decimal>,
    /// Unix seconds before which value cannot leave the portfolio. 0 means unlocked.
    pub unlock_at: u64,
}

/// Per-portfolio holdings and lock timestamps, mutable only by the factory.
#[derive(Debug, Clone)]
pub struct Records {
    factory: Address,
    portfolios: HashMap<PortfolioId, PortfolioRecord>,
}

impl Records {
    pub fn new(factory: Address) -> Self {
        Self {
            factory,
            portfolios: HashMap::new(),
        }
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    // --- Mutations ---

    /// Adds `amount` of `asset` to portfolio `id`, appending the asset if it is new.
    /// Crediting zero is a no-op.
    pub fn credit(
        &mut self,
        caller: Address,
        id: PortfolioId,
        asset: Address,
        amount: Decimal,
    ) -> Result<(), RecordsError> {
        self.ensure_factory(caller)?;
        if amount.is_sign_negative() {
            return Err(RecordsError::NegativeAmount(amount));
        }
        if amount.is_zero() {
            return Ok(());
        }

        let total = self
            .amount_of(id, asset)
            .checked_add(amount)
            .ok_or(RecordsError::Overflow { id, asset })?;

        let record = self.portfolios.entry(id).or_default();
        if !record.holdings.contains_key(&asset) {
            record.assets.push(asset);
        }
        record.holdings.insert(asset, total);
        debug!(%id, %asset, %amount, %total, "Credited holding");
        Ok(())
    }

    /// Removes `amount` of `asset` from portfolio `id`. The asset leaves the list
    /// once its quantity reaches zero, subject to `guard`.
    pub fn debit(
        &mut self,
        caller: Address,
        id: PortfolioId,
        asset: Address,
        amount: Decimal,
        guard: RemovalGuard,
    ) -> Result<(), RecordsError> {
        self.ensure_factory(caller)?;
        if amount.is_sign_negative() {
            return Err(RecordsError::NegativeAmount(amount));
        }
        if amount.is_zero() {
            return Ok(());
        }

        let available = self.amount_of(id, asset);
        if amount > available {
            return Err(RecordsError::InsufficientAmount {
                id,
                asset,
                required: amount,
                available,
            });
        }

        let remaining = available - amount;
        let record = self
            .portfolios
            .get_mut(&id)
            .ok_or(RecordsError::InsufficientAmount {
                id,
                asset,
                required: amount,
                available,
            })?;

        if remaining.is_zero() {
            if guard == RemovalGuard::ProtectLastAsset && record.assets.len() == 1 {
                return Err(RecordsError::LastAssetProtected { id, asset });
            }
            record.holdings.remove(&asset);
            record.assets.retain(|a| *a != asset);
            debug!(%id, %asset, "Removed emptied holding");
        } else {
            record.holdings.insert(asset, remaining);
            debug!(%id, %asset, %amount, total = %remaining, "Debited holding");
        }
        Ok(())
    }

    /// Moves the unlock timestamp of portfolio `id` forward to `timestamp`.
    pub fn set_unlock(
        &mut self,
        caller: Address,
        id: PortfolioId,
        timestamp: u64,
    ) -> Result<(), RecordsError> {
        self.ensure_factory(caller)?;
        let record = self.portfolios.entry(id).or_default();
        if timestamp <= record.unlock_at {
            return Err(RecordsError::TimestampMustIncrease {
                id,
                current: record.unlock_at,
                requested: timestamp,
            });
        }
        record.unlock_at = timestamp;
        debug!(%id, unlock_at = timestamp, "Updated lock");
        Ok(())
    }

    /// Drops everything recorded for portfolio `id`.
    pub fn remove_portfolio(
        &mut self,
        caller: Address,
        id: PortfolioId,
    ) -> Result<(), RecordsError> {
        self.ensure_factory(caller)?;
        self.portfolios.remove(&id);
        Ok(())
    }

    // --- Reads ---

    pub fn holding(&self, id: PortfolioId, asset: Address) -> Option<Holding> {
        self.portfolios
            .get(&id)
            .and_then(|record| record.holdings.get(&asset))
            .map(|amount| Holding { asset, amount: *amount })
    }

    /// Recorded quantity of `asset` in portfolio `id`, zero when absent.
    pub fn amount_of(&self, id: PortfolioId, asset: Address) -> Decimal {
        self.holding(id, asset)
            .map(|h| h.amount)
            .unwrap_or(Decimal::ZERO)
    }

    /// Assets of portfolio `id` in first-insertion order.
    pub fn assets(&self, id: PortfolioId) -> Vec<Address> {
        self.portfolios
            .get(&id)
            .map(|record| record.assets.clone())
            .unwrap_or_default()
    }

    /// Holdings of portfolio `id` in first-insertion order.
    pub fn holdings(&self, id: PortfolioId) -> Vec<Holding> {
        let Some(record) = self.portfolios.get(&id) else {
            return Vec::new();
        };
        record
            .assets
            .iter()
            .map(|asset| Holding {
                asset: *asset,
                amount: record.holdings.get(asset).copied().unwrap_or(Decimal::ZERO),
            })
            .collect()
    }

    pub fn unlock_at(&self, id: PortfolioId) -> u64 {
        self.portfolios.get(&id).map(|r| r.unlock_at).unwrap_or(0)
    }

    pub fn is_unlocked(&self, id: PortfolioId, now: u64) -> bool {
        now >= self.unlock_at(id)
    }

    pub fn contains(&self, id: PortfolioId) -> bool {
        self.portfolios.contains_key(&id)
    }

    /// Sum of `asset` across every portfolio.
    pub fn total_of(&self, asset: Address) -> Decimal {
        self.portfolios
            .values()
            .filter_map(|record| record.holdings.get(&asset))
            .copied()
            .sum()
    }

    /// Read-only view of one portfolio's record.
    pub fn record(&self, id: PortfolioId) -> Option<&PortfolioRecord> {
        self.portfolios.get(&id)
    }

    fn ensure_factory(&self, caller: Address) -> Result<(), RecordsError> {
        if caller != self.factory {
            return Err(RecordsError::OnlyFactory(caller));
        }
        Ok(())
    }
}
