use core_types::{Address, AssetAmount, OperationKind, OperatorName, PortfolioId};
use rust_decimal::Decimal;
use serde::Serialize;

/// The observable outcome of one committed portfolio operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub id: PortfolioId,
    pub kind: OperationKind,
    /// The portfolio this one was replicated from. Only set by `create`.
    pub original: Option<PortfolioId>,
    /// Amounts added to the portfolio's holdings.
    pub credited: Vec<AssetAmount>,
    /// Amounts sent to the caller's wallet.
    pub paid_out: Vec<AssetAmount>,
    /// Unspent input returned to its source (the caller or the portfolio).
    pub refunded: Vec<AssetAmount>,
    /// Everything forwarded to the fee sink.
    pub fees: Vec<AssetAmount>,
}

impl Receipt {
    pub fn new(id: PortfolioId, kind: OperationKind) -> Self {
        Self {
            id,
            kind,
            original: None,
            credited: Vec::new(),
            paid_out: Vec::new(),
            refunded: Vec::new(),
            fees: Vec::new(),
        }
    }

    /// Total of `asset` forwarded to the fee sink.
    pub fn fee_in(&self, asset: Address) -> Decimal {
        total(&self.fees, asset)
    }

    pub fn credited_in(&self, asset: Address) -> Decimal {
        total(&self.credited, asset)
    }

    pub fn paid_out_in(&self, asset: Address) -> Decimal {
        total(&self.paid_out, asset)
    }

    pub fn refunded_in(&self, asset: Address) -> Decimal {
        total(&self.refunded, asset)
    }

    pub(crate) fn record_credit(&mut self, asset: Address, amount: Decimal) {
        accumulate(&mut self.credited, asset, amount);
    }

    pub(crate) fn record_payout(&mut self, asset: Address, amount: Decimal) {
        accumulate(&mut self.paid_out, asset, amount);
    }

    pub(crate) fn record_refund(&mut self, asset: Address, amount: Decimal) {
        accumulate(&mut self.refunded, asset, amount);
    }

    pub(crate) fn record_fee(&mut self, asset: Address, amount: Decimal) {
        accumulate(&mut self.fees, asset, amount);
    }
}

fn accumulate(list: &mut Vec<AssetAmount>, asset: Address, amount: Decimal) {
    if amount.is_zero() {
        return;
    }
    match list.iter_mut().find(|entry| entry.asset == asset) {
        Some(entry) => entry.amount += amount,
        None => list.push(AssetAmount::new(asset, amount)),
    }
}

fn total(list: &[AssetAmount], asset: Address) -> Decimal {
    list.iter()
        .filter(|entry| entry.asset == asset)
        .map(|entry| entry.amount)
        .sum()
}

/// Everything the factory reports to off-chain observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FactoryEvent {
    Portfolio(Receipt),
    LockUpdated { id: PortfolioId, unlock_at: u64 },
    OperatorAdded { name: OperatorName },
    ReserveUpdated { reserve: Address },
    FeeSinkUpdated { fee_sink: Address },
    VipDiscountUpdated { vip_fee_bps: u32, vip_min_amount: Decimal },
    VipAssetUpdated { vip_asset: Address },
}
