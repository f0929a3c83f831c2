use crate::error::OwnershipError;
use core_types::{Address, PortfolioId};
use std::collections::HashMap;
use tracing::debug;

/// The interface the factory uses to mint, burn and query portfolio ownership.
pub trait PortfolioRegistry: Send + Sync {
    /// Returns the current owner of `id`.
    fn owner_of(&self, id: PortfolioId) -> Result<Address, OwnershipError>;

    /// Mints a fresh id to `owner`. `original` records the portfolio this one was
    /// copied from, if any. Only the factory (`minter`) may mint.
    fn mint(
        &mut self,
        minter: Address,
        owner: Address,
        original: Option<PortfolioId>,
    ) -> Result<PortfolioId, OwnershipError>;

    /// Burns `id`. The id is never minted again.
    fn burn(&mut self, minter: Address, id: PortfolioId) -> Result<(), OwnershipError>;
}

/// An in-memory ownership registry with sequential ids starting at 1.
#[derive(Debug, Clone)]
pub struct NftRegistry {
    factory: Address,
    next_id: u64,
    owners: HashMap<PortfolioId, Address>,
    originals: HashMap<PortfolioId, PortfolioId>,
}

impl NftRegistry {
    pub fn new(factory: Address) -> Self {
        Self {
            factory,
            next_id: 1,
            owners: HashMap::new(),
            originals: HashMap::new(),
        }
    }

    /// The portfolio `id` was replicated from, if it was created as a copy.
    pub fn original_of(&self, id: PortfolioId) -> Option<PortfolioId> {
        self.originals.get(&id).copied()
    }

    /// Number of live (minted and not burnt) portfolios.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    fn ensure_factory(&self, minter: Address) -> Result<(), OwnershipError> {
        if minter != self.factory {
            return Err(OwnershipError::OnlyFactory(minter));
        }
        Ok(())
    }
}

impl PortfolioRegistry for NftRegistry {
    fn owner_of(&self, id: PortfolioId) -> Result<Address, OwnershipError> {
        self.owners
            .get(&id)
            .copied()
            .ok_or(OwnershipError::UnknownPortfolio(id))
    }

    fn mint(
        &mut self,
        minter: Address,
        owner: Address,
        original: Option<PortfolioId>,
    ) -> Result<PortfolioId, OwnershipError> {
        self.ensure_factory(minter)?;
        if owner.is_zero() {
            return Err(OwnershipError::ZeroOwner);
        }

        let id = PortfolioId(self.next_id);
        self.next_id += 1;
        self.owners.insert(id, owner);
        if let Some(original) = original {
            self.originals.insert(id, original);
        }
        debug!(%id, %owner, "Minted portfolio");
        Ok(id)
    }

    fn burn(&mut self, minter: Address, id: PortfolioId) -> Result<(), OwnershipError> {
        self.ensure_factory(minter)?;
        self.owners
            .remove(&id)
            .ok_or(OwnershipError::UnknownPortfolio(id))?;
        self.originals.remove(&id);
        debug!(%id, "Burned portfolio");
        Ok(())
    }
}
