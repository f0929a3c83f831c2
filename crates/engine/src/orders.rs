use crate::Transaction;
use crate::error::FactoryError;
use crate::event::Receipt;
use crate::fees::fee_for;
use assets::{AssetLedger, Reserve};
use core_types::{Address, Order, PayloadHeader, PortfolioId};
use operators::{Operator, OperatorContext};
use ownership::PortfolioRegistry;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// An order whose operator resolved and whose payload header checked out.
pub(crate) struct ValidatedOrder<'o> {
    pub(crate) order: &'o Order,
    pub(crate) operator: Arc<dyn Operator>,
    pub(crate) header: PayloadHeader,
}

/// What one order did to the factory's balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OrderOutcome {
    pub(crate) bought: Decimal,
    pub(crate) spent: Decimal,
}

pub(crate) fn ensure_non_negative(amount: Decimal) -> Result<(), FactoryError> {
    if amount.is_sign_negative() {
        return Err(FactoryError::InvalidAmount(amount));
    }
    Ok(())
}

impl<'a, L, R> Transaction<'a, L, R>
where
    L: AssetLedger,
    R: PortfolioRegistry,
{
    /// Resolves every operator and checks every payload header before anything moves.
    pub(crate) fn validate_orders<'o>(
        &self,
        orders: &'o [Order],
    ) -> Result<Vec<ValidatedOrder<'o>>, FactoryError> {
        if orders.is_empty() {
            return Err(FactoryError::MissingOrders);
        }

        orders
            .iter()
            .map(|order| {
                let operator = self.resolver.resolve(&order.operator)?;
                let (header, _) =
                    PayloadHeader::decode(&order.payload).map_err(|e| FactoryError::OperatorCallFailed {
                        operator: order.operator.clone(),
                        reason: e.to_string(),
                    })?;
                if header.output != order.output {
                    return Err(FactoryError::WrongOutputAsset {
                        expected: order.output,
                        found: header.output,
                    });
                }
                Ok(ValidatedOrder {
                    order,
                    operator,
                    header,
                })
            })
            .collect()
    }

    /// Delegates one order to its operator and measures the factory's balance
    /// movement in the order's output asset and in `input`.
    pub(crate) fn execute_order(
        &mut self,
        validated: &ValidatedOrder<'_>,
        input: Address,
    ) -> Result<OrderOutcome, FactoryError> {
        let executor = self.settings.address;
        let output = validated.order.output;

        let output_before = self.state.assets.balance_of(executor, output);
        let input_before = self.state.assets.balance_of(executor, input);

        let mut op_ctx = OperatorContext::new(executor, &mut self.state.assets);
        let result = if validated.order.commit {
            validated
                .operator
                .commit_and_execute(&mut op_ctx, &validated.order.payload)
        } else {
            validated
                .operator
                .revert_and_execute(&mut op_ctx, &validated.order.payload)
        };
        result.map_err(|e| FactoryError::OperatorCallFailed {
            operator: validated.order.operator.clone(),
            reason: e.to_string(),
        })?;

        let output_after = self.state.assets.balance_of(executor, output);
        let input_after = self.state.assets.balance_of(executor, input);
        let outcome = OrderOutcome {
            bought: (output_after - output_before).max(Decimal::ZERO),
            spent: (input_before - input_after).max(Decimal::ZERO),
        };

        debug!(
            operator = %validated.order.operator,
            %input,
            %output,
            bought = %outcome.bought,
            spent = %outcome.spent,
            "Order executed"
        );
        Ok(outcome)
    }

    // --- Guards ---

    pub(crate) fn ensure_owner(&self, id: PortfolioId) -> Result<(), FactoryError> {
        let owner = self.state.registry.owner_of(id)?;
        if owner != self.ctx.caller {
            return Err(FactoryError::NotTokenOwner {
                id,
                caller: self.ctx.caller,
            });
        }
        Ok(())
    }

    pub(crate) fn ensure_unlocked(&self, id: PortfolioId) -> Result<(), FactoryError> {
        if !self.state.records.is_unlocked(id, self.ctx.now) {
            return Err(FactoryError::PortfolioLocked {
                id,
                unlock_at: self.state.records.unlock_at(id),
            });
        }
        Ok(())
    }

    pub(crate) fn ensure_holding(
        &self,
        id: PortfolioId,
        asset: Address,
        required: Decimal,
    ) -> Result<(), FactoryError> {
        let available = self.state.records.amount_of(id, asset);
        if required > available {
            return Err(FactoryError::InsufficientAmount {
                id,
                asset,
                required,
                available,
            });
        }
        Ok(())
    }

    pub(crate) fn reserve(&self) -> Result<Reserve, FactoryError> {
        self.settings.reserve.ok_or(FactoryError::ReserveNotSet)
    }

    /// The fee rate of `id`, read before the operation changes any holding.
    pub(crate) fn fee_rate(&self, id: Option<PortfolioId>) -> u32 {
        self.settings.fees.rate_bps(&self.state.records, id)
    }

    // --- Settlement ---

    /// Pulls `amount` of `asset` from the caller's wallet into the factory and
    /// returns the asset the factory now holds.
    ///
    /// The native coin must be attached to the call (`CallContext::value`) and
    /// arrives wrapped, so orders and fees work in the wrapped asset.
    pub(crate) fn pull_from_caller(
        &mut self,
        asset: Address,
        amount: Decimal,
    ) -> Result<Address, FactoryError> {
        let factory = self.settings.address;
        if !asset.is_native() {
            self.state
                .assets
                .transfer(self.ctx.caller, factory, asset, amount)?;
            return Ok(asset);
        }

        let wrapped = self
            .settings
            .wrapped_native
            .ok_or(FactoryError::NativeNotSupported)?;
        if self.ctx.value < amount {
            return Err(FactoryError::InsufficientValue {
                supplied: self.ctx.value,
                required: amount,
            });
        }
        self.state
            .assets
            .transfer(self.ctx.caller, factory, asset, amount)?;
        self.state.assets.wrap_native(factory, wrapped, amount)?;
        debug!(%wrapped, %amount, "Wrapped native input");
        Ok(wrapped)
    }

    /// Releases `amount` of `asset` from custody to the factory.
    pub(crate) fn release(&mut self, asset: Address, amount: Decimal) -> Result<(), FactoryError> {
        let reserve = self.reserve()?;
        reserve.transfer_to(
            self.settings.address,
            &mut self.state.assets,
            self.settings.address,
            asset,
            amount,
        )?;
        Ok(())
    }

    /// Moves `amount` of `asset` from the factory into custody.
    pub(crate) fn deposit(&mut self, asset: Address, amount: Decimal) -> Result<(), FactoryError> {
        let reserve = self.reserve()?;
        self.state
            .assets
            .transfer(self.settings.address, reserve.address(), asset, amount)?;
        Ok(())
    }

    /// Deposits `amount` of `asset` into custody and credits it to portfolio `id`.
    pub(crate) fn store(
        &mut self,
        id: PortfolioId,
        asset: Address,
        amount: Decimal,
        receipt: &mut Receipt,
    ) -> Result<(), FactoryError> {
        self.deposit(asset, amount)?;
        self.state
            .records
            .credit(self.settings.address, id, asset, amount)?;
        receipt.record_credit(asset, amount);
        Ok(())
    }

    pub(crate) fn pay_caller(
        &mut self,
        asset: Address,
        amount: Decimal,
    ) -> Result<(), FactoryError> {
        self.state
            .assets
            .transfer(self.settings.address, self.ctx.caller, asset, amount)?;
        Ok(())
    }

    pub(crate) fn pay_fee_sink(
        &mut self,
        asset: Address,
        amount: Decimal,
        receipt: &mut Receipt,
    ) -> Result<(), FactoryError> {
        self.state
            .assets
            .transfer(self.settings.address, self.settings.fee_sink, asset, amount)?;
        receipt.record_fee(asset, amount);
        Ok(())
    }

    /// Charges the fee on `amount` and returns what is left after it.
    pub(crate) fn take_fee(
        &mut self,
        asset: Address,
        amount: Decimal,
        rate_bps: u32,
        receipt: &mut Receipt,
    ) -> Result<Decimal, FactoryError> {
        let fee = fee_for(amount, rate_bps)?;
        self.pay_fee_sink(asset, fee, receipt)?;
        Ok(amount - fee)
    }
}
