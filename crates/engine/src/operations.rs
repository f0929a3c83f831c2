//! The portfolio operations. Each one validates its inputs, stages its effects
//! through the shared order primitive and commits atomically.

use crate::error::FactoryError;
use crate::event::{FactoryEvent, Receipt};
use crate::fees::fee_for;
use crate::orders::{ValidatedOrder, ensure_non_negative};
use crate::{Factory, Transaction};
use assets::AssetLedger;
use core_types::{Address, CallContext, LeftoverPolicy, OperationKind, Order, PortfolioId};
use ownership::PortfolioRegistry;
use records::RemovalGuard;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Where the output of a sell goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SellTarget {
    Portfolio,
    Wallet,
}

impl<L, R> Factory<L, R>
where
    L: AssetLedger + Clone,
    R: PortfolioRegistry + Clone,
{
    /// Creates a portfolio owned by the caller and fills it by spending `amount`
    /// of `input` from the caller's wallet across `orders`.
    ///
    /// `original` names the portfolio this one replicates, if any. An `input` of
    /// [`Address::NATIVE`] spends the native coin attached to `ctx`, wrapped first.
    pub fn create(
        &mut self,
        ctx: &CallContext,
        original: Option<PortfolioId>,
        input: Address,
        amount: Decimal,
        orders: &[Order],
    ) -> Result<Receipt, FactoryError> {
        self.atomically("create", ctx, |tx| {
            ensure_non_negative(amount)?;
            let validated = tx.validate_orders(orders)?;
            tx.reserve()?;
            let rate = tx.fee_rate(None);

            let id = tx
                .state
                .registry
                .mint(tx.settings.address, tx.ctx.caller, original)?;
            let mut receipt = Receipt::new(id, OperationKind::Create);
            receipt.original = original;

            let input = tx.pull_from_caller(input, amount)?;
            tx.buy_from_wallet(id, input, amount, &validated, rate, &mut receipt)?;
            Ok(receipt)
        })
    }

    /// Tops up an existing portfolio, spending `amount` of `input` from the
    /// caller's wallet across `orders`. Native input works as in [`Factory::create`].
    pub fn add_tokens(
        &mut self,
        ctx: &CallContext,
        id: PortfolioId,
        input: Address,
        amount: Decimal,
        orders: &[Order],
    ) -> Result<Receipt, FactoryError> {
        self.atomically("add_tokens", ctx, |tx| {
            ensure_non_negative(amount)?;
            let validated = tx.validate_orders(orders)?;
            tx.ensure_owner(id)?;
            tx.reserve()?;
            let rate = tx.fee_rate(Some(id));

            let mut receipt = Receipt::new(id, OperationKind::AddTokens);
            let input = tx.pull_from_caller(input, amount)?;
            tx.buy_from_wallet(id, input, amount, &validated, rate, &mut receipt)?;
            Ok(receipt)
        })
    }

    /// Rebalances inside a portfolio: spends up to `amount` of its `input` holding
    /// across `orders` and credits what they buy. Unspent input stays in the
    /// portfolio, less the fee on it.
    pub fn swap_token_for_tokens(
        &mut self,
        ctx: &CallContext,
        id: PortfolioId,
        input: Address,
        amount: Decimal,
        orders: &[Order],
    ) -> Result<Receipt, FactoryError> {
        self.atomically("swap_token_for_tokens", ctx, |tx| {
            ensure_non_negative(amount)?;
            let validated = tx.validate_orders(orders)?;
            tx.ensure_owner(id)?;
            tx.ensure_unlocked(id)?;
            tx.ensure_holding(id, input, amount)?;
            tx.reserve()?;
            let rate = tx.fee_rate(Some(id));

            let mut receipt = Receipt::new(id, OperationKind::SwapTokenForTokens);
            tx.release(input, amount)?;

            let leftover = tx.buy(id, input, amount, &validated, rate, &mut receipt)?;
            let net_leftover = tx.return_leftover(input, leftover, rate, &mut receipt)?;
            tx.state.records.debit(
                tx.settings.address,
                id,
                input,
                amount - net_leftover,
                RemovalGuard::AllowEmpty,
            )?;
            Ok(receipt)
        })
    }

    /// Sells `sell_amounts[i]` of the asset named in `orders[i]`'s payload for
    /// `buy`, and credits the proceeds (less the fee) back to the portfolio.
    pub fn sell_tokens_to_nft(
        &mut self,
        ctx: &CallContext,
        id: PortfolioId,
        buy: Address,
        sell_amounts: &[Decimal],
        orders: &[Order],
    ) -> Result<Receipt, FactoryError> {
        self.atomically("sell_tokens_to_nft", ctx, |tx| {
            tx.sell(id, buy, sell_amounts, orders, SellTarget::Portfolio)
        })
    }

    /// Like [`Factory::sell_tokens_to_nft`], but the proceeds go to the caller's
    /// wallet. The portfolio's last holding cannot be sold off this way.
    pub fn sell_tokens_to_wallet(
        &mut self,
        ctx: &CallContext,
        id: PortfolioId,
        buy: Address,
        sell_amounts: &[Decimal],
        orders: &[Order],
    ) -> Result<Receipt, FactoryError> {
        self.atomically("sell_tokens_to_wallet", ctx, |tx| {
            tx.sell(id, buy, sell_amounts, orders, SellTarget::Wallet)
        })
    }

    /// Liquidates every holding into `buy`, pays the proceeds to the caller and
    /// burns the portfolio. `orders` must sell each holding exactly once.
    pub fn destroy(
        &mut self,
        ctx: &CallContext,
        id: PortfolioId,
        buy: Address,
        orders: &[Order],
    ) -> Result<Receipt, FactoryError> {
        self.atomically("destroy", ctx, |tx| {
            let validated = tx.validate_orders(orders)?;
            ensure_outputs(&validated, buy)?;
            tx.ensure_owner(id)?;
            tx.ensure_unlocked(id)?;

            let held: HashSet<Address> = tx.state.records.assets(id).into_iter().collect();
            let sold: HashSet<Address> = validated.iter().map(|v| v.header.input).collect();
            if validated.len() != held.len() || sold != held {
                return Err(FactoryError::MissingSellArgs(id));
            }
            tx.reserve()?;
            let rate = tx.fee_rate(Some(id));

            let mut receipt = Receipt::new(id, OperationKind::Destroy);
            let mut bought = Decimal::ZERO;
            for order in &validated {
                let asset = order.header.input;
                let amount = tx.state.records.amount_of(id, asset);
                tx.release(asset, amount)?;

                let outcome = tx.execute_order(order, asset)?;
                bought += outcome.bought;
                if outcome.spent > amount {
                    return Err(FactoryError::OverSpent {
                        asset,
                        supplied: amount,
                        required: outcome.spent,
                    });
                }

                let net_leftover = tx.take_fee(asset, amount - outcome.spent, rate, &mut receipt)?;
                tx.pay_caller(asset, net_leftover)?;
                receipt.record_refund(asset, net_leftover);
            }

            let net = tx.take_fee(buy, bought, rate, &mut receipt)?;
            tx.pay_caller(buy, net)?;
            receipt.record_payout(buy, net);

            tx.state.records.remove_portfolio(tx.settings.address, id)?;
            tx.state.registry.burn(tx.settings.address, id)?;
            Ok(receipt)
        })
    }

    /// Sends the whole holding of `asset`, less the fee, to the caller.
    /// The portfolio's last holding cannot be withdrawn.
    pub fn withdraw(
        &mut self,
        ctx: &CallContext,
        id: PortfolioId,
        asset: Address,
    ) -> Result<Receipt, FactoryError> {
        self.atomically("withdraw", ctx, |tx| {
            tx.ensure_owner(id)?;
            tx.ensure_unlocked(id)?;
            let amount = tx.state.records.amount_of(id, asset);
            if amount.is_zero() {
                return Err(FactoryError::AssetNotHeld { id, asset });
            }
            tx.reserve()?;
            let rate = tx.fee_rate(Some(id));

            let mut receipt = Receipt::new(id, OperationKind::Withdraw);
            tx.state.records.debit(
                tx.settings.address,
                id,
                asset,
                amount,
                RemovalGuard::ProtectLastAsset,
            )?;
            tx.release(asset, amount)?;
            let net = tx.take_fee(asset, amount, rate, &mut receipt)?;
            tx.pay_caller(asset, net)?;
            receipt.record_payout(asset, net);
            Ok(receipt)
        })
    }

    /// Locks portfolio `id` until `timestamp`. The lock can only be extended.
    pub fn update_lock_timestamp(
        &mut self,
        ctx: &CallContext,
        id: PortfolioId,
        timestamp: u64,
    ) -> Result<(), FactoryError> {
        let owner = self.state.registry.owner_of(id)?;
        if owner != ctx.caller {
            return Err(FactoryError::NotTokenOwner { id, caller: ctx.caller });
        }
        self.state
            .records
            .set_unlock(self.settings.address, id, timestamp)?;

        self.emit(FactoryEvent::LockUpdated { id, unlock_at: timestamp });
        Ok(())
    }
}

/// Every order of a sell must produce the operation's output asset.
fn ensure_outputs(validated: &[ValidatedOrder<'_>], buy: Address) -> Result<(), FactoryError> {
    match validated.iter().find(|v| v.order.output != buy) {
        Some(v) => Err(FactoryError::WrongOutputAsset {
            expected: buy,
            found: v.order.output,
        }),
        None => Ok(()),
    }
}

impl<'a, L, R> Transaction<'a, L, R>
where
    L: AssetLedger,
    R: PortfolioRegistry,
{
    /// Runs buy orders funded with `supplied` of `input`, credits what they buy to
    /// portfolio `id` and pays the fee on the input they spent. Returns the input
    /// left over.
    fn buy(
        &mut self,
        id: PortfolioId,
        input: Address,
        supplied: Decimal,
        validated: &[ValidatedOrder<'_>],
        rate: u32,
        receipt: &mut Receipt,
    ) -> Result<Decimal, FactoryError> {
        let mut spent = Decimal::ZERO;
        for order in validated {
            let outcome = self.execute_order(order, input)?;
            spent += outcome.spent;
            self.store(id, order.order.output, outcome.bought, receipt)?;
        }

        let fee = fee_for(spent, rate)?;
        let required = spent
            .checked_add(fee)
            .ok_or(FactoryError::AmountOverflow(spent))?;
        if required > supplied {
            return Err(FactoryError::OverSpent {
                asset: input,
                supplied,
                required,
            });
        }
        self.pay_fee_sink(input, fee, receipt)?;
        Ok(supplied - required)
    }

    /// Runs the orders of a wallet-funded buy (create, add_tokens) and settles the
    /// supplied input: the fee on what was spent, then the leftover per policy.
    fn buy_from_wallet(
        &mut self,
        id: PortfolioId,
        input: Address,
        amount: Decimal,
        validated: &[ValidatedOrder<'_>],
        rate: u32,
        receipt: &mut Receipt,
    ) -> Result<(), FactoryError> {
        let leftover = self.buy(id, input, amount, validated, rate, receipt)?;
        match self.settings.leftover_policy {
            LeftoverPolicy::FeeSink => self.pay_fee_sink(input, leftover, receipt)?,
            LeftoverPolicy::Refund => {
                let net = self.take_fee(input, leftover, rate, receipt)?;
                self.pay_caller(input, net)?;
                receipt.record_refund(input, net);
            }
        }
        Ok(())
    }

    /// Charges the fee on an unspent portfolio input and puts the rest back into
    /// custody. Returns the amount returned.
    fn return_leftover(
        &mut self,
        asset: Address,
        leftover: Decimal,
        rate: u32,
        receipt: &mut Receipt,
    ) -> Result<Decimal, FactoryError> {
        let net = self.take_fee(asset, leftover, rate, receipt)?;
        self.deposit(asset, net)?;
        receipt.record_refund(asset, net);
        Ok(net)
    }

    fn sell(
        &mut self,
        id: PortfolioId,
        buy: Address,
        sell_amounts: &[Decimal],
        orders: &[Order],
        target: SellTarget,
    ) -> Result<Receipt, FactoryError> {
        let validated = self.validate_orders(orders)?;
        if sell_amounts.len() != validated.len() {
            return Err(FactoryError::InputLengthMismatch {
                orders: validated.len(),
                amounts: sell_amounts.len(),
            });
        }
        for amount in sell_amounts {
            ensure_non_negative(*amount)?;
        }
        ensure_outputs(&validated, buy)?;
        self.ensure_owner(id)?;
        self.ensure_unlocked(id)?;

        let mut per_asset: HashMap<Address, Decimal> = HashMap::new();
        for (order, amount) in validated.iter().zip(sell_amounts) {
            let total = per_asset.entry(order.header.input).or_insert(Decimal::ZERO);
            *total = total
                .checked_add(*amount)
                .ok_or(FactoryError::AmountOverflow(*amount))?;
        }
        for (asset, required) in &per_asset {
            self.ensure_holding(id, *asset, *required)?;
        }
        self.reserve()?;
        let rate = self.fee_rate(Some(id));

        let (kind, guard) = match target {
            SellTarget::Portfolio => (OperationKind::SellTokensToNft, RemovalGuard::AllowEmpty),
            SellTarget::Wallet => (OperationKind::SellTokensToWallet, RemovalGuard::ProtectLastAsset),
        };
        let mut receipt = Receipt::new(id, kind);

        let mut bought = Decimal::ZERO;
        for (order, amount) in validated.iter().zip(sell_amounts) {
            let asset = order.header.input;
            self.release(asset, *amount)?;

            let outcome = self.execute_order(order, asset)?;
            bought += outcome.bought;
            if outcome.spent > *amount {
                return Err(FactoryError::OverSpent {
                    asset,
                    supplied: *amount,
                    required: outcome.spent,
                });
            }

            let net_leftover = self.return_leftover(asset, *amount - outcome.spent, rate, &mut receipt)?;
            self.state
                .records
                .debit(self.settings.address, id, asset, *amount - net_leftover, guard)?;
        }

        let net = self.take_fee(buy, bought, rate, &mut receipt)?;
        match target {
            SellTarget::Portfolio => self.store(id, buy, net, &mut receipt)?,
            SellTarget::Wallet => {
                self.pay_caller(buy, net)?;
                receipt.record_payout(buy, net);
            }
        }
        Ok(receipt)
    }
}
