//! # Nested Engine Crate
//!
//! The portfolio factory. `Factory` is the only component allowed to move assets
//! in and out of custody and to change the holdings ledger. Every portfolio
//! operation funnels through one order-execution primitive that delegates each
//! order to an operator and trusts nothing but its own balance deltas.
//!
//! ## Architectural Principles
//!
//! - **Staged execution:** an operation runs against a copy of the ledger, the
//!   ownership registry and the records. The copy replaces the live state only
//!   when the whole operation succeeds, so a failing order anywhere in a batch
//!   leaves no trace.
//! - **No re-entrancy:** operators receive the asset ledger, never the factory.
//!   Every entry point takes `&mut self`, which serializes calls.
//!
//! ## Public API
//!
//! - `Factory`: the engine itself, generic over the asset ledger and the registry.
//! - `FactorySettings`: identity, custody and fee parameters.
//! - `Receipt` / `FactoryEvent`: what a committed operation reports.
//! - `FactoryError`: the specific error types that can be returned from this crate.

pub mod admin;
pub mod error;
pub mod event;
pub mod fees;
pub mod operations;
mod orders;

pub use error::FactoryError;
pub use event::{FactoryEvent, Receipt};
pub use fees::{FeeSchedule, fee_for};

use assets::{AssetLedger, Reserve};
use configuration::Config;
use core_types::{Address, CallContext, LeftoverPolicy, OperatorName, PortfolioId};
use operators::OperatorResolver;
use ownership::PortfolioRegistry;
use records::Records;
use tracing::{info, warn};

/// Identity, custody and fee parameters of a factory.
#[derive(Debug, Clone)]
pub struct FactorySettings {
    /// The factory's own account. Operators trade from it.
    pub address: Address,
    /// The administrator allowed to register operators and change settings.
    pub owner: Address,
    pub reserve: Option<Reserve>,
    pub fee_sink: Address,
    pub fees: FeeSchedule,
    pub leftover_policy: LeftoverPolicy,
    /// The asset native coin is wrapped into when a buy is paid in [`Address::NATIVE`].
    pub wrapped_native: Option<Address>,
}

impl FactorySettings {
    /// Builds settings from the loaded configuration. The reserve is set later
    /// through [`Factory::set_reserve`].
    pub fn from_config(
        address: Address,
        owner: Address,
        fee_sink: Address,
        config: &Config,
    ) -> Self {
        Self {
            address,
            owner,
            reserve: None,
            fee_sink,
            fees: FeeSchedule::from(&config.fees),
            leftover_policy: config.settlement.leftover_policy,
            wrapped_native: config.settlement.wrapped_native,
        }
    }
}

/// The mutable world an operation is staged against.
#[derive(Debug, Clone)]
pub(crate) struct FactoryState<L, R> {
    pub(crate) assets: L,
    pub(crate) registry: R,
    pub(crate) records: Records,
}

/// The staging area of one in-flight operation.
pub(crate) struct Transaction<'a, L, R> {
    pub(crate) ctx: CallContext,
    pub(crate) settings: &'a FactorySettings,
    pub(crate) resolver: &'a OperatorResolver,
    pub(crate) state: &'a mut FactoryState<L, R>,
}

/// The portfolio factory.
#[derive(Debug)]
pub struct Factory<L, R> {
    settings: FactorySettings,
    resolver: OperatorResolver,
    state: FactoryState<L, R>,
    events: Vec<FactoryEvent>,
}

impl<L, R> Factory<L, R>
where
    L: AssetLedger + Clone,
    R: PortfolioRegistry + Clone,
{
    /// Creates a factory over an existing asset ledger and ownership registry.
    /// The registry must accept `settings.address` as its minter.
    pub fn new(settings: FactorySettings, assets: L, registry: R) -> Self {
        let records = Records::new(settings.address);
        let resolver = OperatorResolver::new(settings.owner);
        Self {
            settings,
            resolver,
            state: FactoryState {
                assets,
                registry,
                records,
            },
            events: Vec::new(),
        }
    }

    // --- Queries ---

    pub fn settings(&self) -> &FactorySettings {
        &self.settings
    }

    pub fn address(&self) -> Address {
        self.settings.address
    }

    pub fn reserve(&self) -> Option<Reserve> {
        self.settings.reserve
    }

    pub fn fee_sink(&self) -> Address {
        self.settings.fee_sink
    }

    pub fn records(&self) -> &Records {
        &self.state.records
    }

    pub fn assets(&self) -> &L {
        &self.state.assets
    }

    /// Mutable access to the host ledger, for funding accounts outside any operation.
    pub fn assets_mut(&mut self) -> &mut L {
        &mut self.state.assets
    }

    pub fn registry(&self) -> &R {
        &self.state.registry
    }

    pub fn required_operators(&self) -> &[OperatorName] {
        self.resolver.required_operators()
    }

    pub fn are_operators_imported(&self, names: &[OperatorName]) -> bool {
        self.resolver.are_operators_imported(names)
    }

    /// The fee rate, in basis points, portfolio `id` currently pays.
    pub fn fee_rate_bps(&self, id: PortfolioId) -> u32 {
        self.settings.fees.rate_bps(&self.state.records, Some(id))
    }

    /// Drains the events of every operation committed since the last call.
    pub fn take_events(&mut self) -> Vec<FactoryEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Staging ---

    /// Runs `operation` against a staged copy of the state and commits the copy,
    /// together with the produced event, only if it succeeds.
    pub(crate) fn atomically<F>(
        &mut self,
        name: &str,
        ctx: &CallContext,
        operation: F,
    ) -> Result<Receipt, FactoryError>
    where
        F: FnOnce(&mut Transaction<'_, L, R>) -> Result<Receipt, FactoryError>,
    {
        let mut staged = self.state.clone();
        let result = {
            let mut tx = Transaction {
                ctx: *ctx,
                settings: &self.settings,
                resolver: &self.resolver,
                state: &mut staged,
            };
            operation(&mut tx)
        };

        match result {
            Ok(receipt) => {
                self.state = staged;
                info!(
                    operation = name,
                    id = %receipt.id,
                    caller = %ctx.caller,
                    credited = receipt.credited.len(),
                    paid_out = receipt.paid_out.len(),
                    fees = receipt.fees.len(),
                    "Operation committed"
                );
                self.emit(FactoryEvent::Portfolio(receipt.clone()));
                Ok(receipt)
            }
            Err(err) => {
                warn!(operation = name, caller = %ctx.caller, error = %err, "Operation rolled back");
                Err(err)
            }
        }
    }

    pub(crate) fn emit(&mut self, event: FactoryEvent) {
        info!(?event, "Factory event");
        self.events.push(event);
    }
}
