use core_types::{Address, LeftoverPolicy};
use rust_decimal::Decimal;
use serde::Deserialize;

/// The protocol fee on every value-moving settlement: 100 basis points (1%).
pub const STANDARD_FEE_BPS: u32 = 100;

/// Basis points in one whole.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub fees: FeeSettings,
    #[serde(default)]
    pub settlement: Settlement,
    /// Operators the demo registers with the factory at startup.
    #[serde(default)]
    pub operators: Vec<OperatorSettings>,
    #[serde(default)]
    pub simulation: Simulation,
}

impl Config {
    /// Checks the cross-field rules `serde` cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.fees.vip_fee_bps >= STANDARD_FEE_BPS {
            return Err(format!(
                "fees.vip_fee_bps ({}) must be lower than the standard rate ({})",
                self.fees.vip_fee_bps, STANDARD_FEE_BPS
            ));
        }
        if self.fees.vip_min_amount.is_sign_negative() {
            return Err("fees.vip_min_amount cannot be negative".to_string());
        }
        if let Some(wrapped) = self.settlement.wrapped_native {
            if wrapped.is_zero() || wrapped.is_native() {
                return Err(format!("settlement.wrapped_native ({wrapped}) must be a token address"));
            }
        }
        for operator in &self.operators {
            if operator.name.trim().is_empty() {
                return Err("operators[].name cannot be empty".to_string());
            }
        }
        if self.simulation.starting_balance.is_sign_negative()
            || self.simulation.router_liquidity.is_sign_negative()
        {
            return Err("simulation balances cannot be negative".to_string());
        }
        Ok(())
    }
}

/// The single-tier VIP discount schedule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeeSettings {
    /// Fee charged to qualifying portfolios, in basis points. Must stay below 100.
    pub vip_fee_bps: u32,
    /// Minimum holding of `vip_asset` a portfolio needs to qualify.
    pub vip_min_amount: Decimal,
    /// The asset whose holding qualifies a portfolio. No asset, no discount.
    #[serde(default)]
    pub vip_asset: Option<Address>,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            vip_fee_bps: 50,
            vip_min_amount: Decimal::ZERO,
            vip_asset: None,
        }
    }
}

/// Settlement rules for over-supplied input.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settlement {
    #[serde(default)]
    pub leftover_policy: LeftoverPolicy,
    /// The wrapped form of the native coin (WETH). Without it, buys paid in the
    /// native coin are refused.
    #[serde(default)]
    pub wrapped_native: Option<Address>,
}

/// An operator to register under `name`, trading against the router account `router`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperatorSettings {
    pub name: String,
    /// Label of the router account that holds the venue's liquidity.
    pub router: String,
}

/// Parameters of the scripted lifecycle run by the `simulate` command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Simulation {
    /// Label of the simulated user account.
    pub user: String,
    /// Label of the asset the user spends.
    pub input_asset: String,
    /// Labels of the assets the portfolio is built from.
    pub assets: Vec<String>,
    /// Balance of `input_asset` the user starts with.
    pub starting_balance: Decimal,
    /// Inventory of every asset each router starts with.
    pub router_liquidity: Decimal,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            user: "alice".to_string(),
            input_asset: "DAI".to_string(),
            assets: vec!["UNI".to_string(), "KNC".to_string()],
            starting_balance: Decimal::from(1_000),
            router_liquidity: Decimal::from(100_000),
        }
    }
}
