use anyhow::{Context, bail};
use assets::{AssetLedger, InMemoryLedger};
use chrono::Utc;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{Config, load_config};
use core_types::{Address, CallContext, OperatorName, Order, PortfolioId};
use engine::{Factory, FactorySettings, Receipt};
use operators::{RouterCall, RouterOperator};
use ownership::NftRegistry;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

type SimFactory = Factory<InMemoryLedger, NftRegistry>;

/// The main entry point for the Nested portfolio factory.
fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_dir.as_deref())?;

    // Execute the appropriate command
    match cli.command {
        Commands::Simulate(args) => handle_simulate(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Build, rebalance and dissolve asset portfolios through pluggable swap operators.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Also write logs to a daily rolling file in this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a full portfolio lifecycle against in-memory collaborators.
    Simulate(SimulateArgs),
}

#[derive(Parser)]
struct SimulateArgs {
    /// Path to the configuration file, without extension.
    #[arg(long, default_value = "config")]
    config: String,
}

/// Console logging filtered by `RUST_LOG`, plus an optional daily log file.
fn init_tracing(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "nested.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    Ok(guard)
}

// ==============================================================================
// Simulate Command Logic
// ==============================================================================

/// The well-known accounts of the simulated deployment.
struct Deployment {
    factory: Address,
    owner: Address,
    reserve: Address,
    fee_sink: Address,
}

impl Deployment {
    fn new() -> Self {
        Self {
            factory: Address::from_label("nested-factory"),
            owner: Address::from_label("nested-owner"),
            reserve: Address::from_label("nested-reserve"),
            fee_sink: Address::from_label("fee-splitter"),
        }
    }
}

/// Handles the orchestration of the simulated lifecycle.
fn handle_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load configuration from '{}'", args.config))?;
    let sim = &config.simulation;
    if sim.assets.len() < 2 {
        bail!("simulation.assets needs at least two assets to demonstrate a rebalance");
    }
    let Some(operator) = config.operators.first() else {
        bail!("At least one [[operators]] entry is required");
    };

    let deployment = Deployment::new();
    let mut factory = build_factory(&config, &deployment)?;
    let operator = OperatorName::new(operator.name.clone())?;

    let input = Address::from_label(&sim.input_asset);
    let assets: Vec<Address> = sim.assets.iter().map(|a| Address::from_label(a)).collect();
    let user = Address::from_label(&sim.user);
    let now = u64::try_from(Utc::now().timestamp()).context("System clock is before 1970")?;
    let ctx = CallContext::new(user, now);

    info!(%user, %input, "Starting simulation");

    // 1. Create: 100 of the input spread evenly, with 1% on top for the fee.
    let per_asset = dec!(100) / Decimal::from(assets.len());
    let orders = assets
        .iter()
        .map(|asset| router_order(&operator, input, *asset, per_asset, per_asset))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let receipt = factory.create(&ctx, None, input, dec!(101), &orders)?;
    let id = receipt.id;
    report(&factory, "create", &receipt)?;

    // 2. Top up with more input than the orders consume.
    let orders = assets
        .iter()
        .map(|asset| router_order(&operator, input, *asset, dec!(10), dec!(10)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let supplied = dec!(10) * Decimal::from(assets.len()) * dec!(1.1);
    let receipt = factory.add_tokens(&ctx, id, input, supplied, &orders)?;
    report(&factory, "add_tokens", &receipt)?;

    // 3. Rebalance half of the first asset into the second.
    let half = factory.records().amount_of(id, assets[0]) / dec!(2);
    let spend = half * dec!(0.98);
    let orders = vec![router_order(&operator, assets[0], assets[1], spend, spend)?];
    let receipt = factory.swap_token_for_tokens(&ctx, id, assets[0], half, &orders)?;
    report(&factory, "swap_token_for_tokens", &receipt)?;

    // 4. Sell some of the second asset back into the input, kept in the portfolio.
    let orders = vec![router_order(&operator, assets[1], input, dec!(5), dec!(5))?];
    let receipt = factory.sell_tokens_to_nft(&ctx, id, input, &[dec!(5)], &orders)?;
    report(&factory, "sell_tokens_to_nft", &receipt)?;

    // 5. Sell some of the first asset straight to the wallet.
    let orders = vec![router_order(&operator, assets[0], input, dec!(5), dec!(5))?];
    let receipt = factory.sell_tokens_to_wallet(&ctx, id, input, &[dec!(5)], &orders)?;
    report(&factory, "sell_tokens_to_wallet", &receipt)?;

    // 6. Lock for an hour: withdrawing now fails, an hour later it succeeds.
    let unlock_at = now + 3600;
    factory.update_lock_timestamp(&ctx, id, unlock_at)?;
    if let Err(err) = factory.withdraw(&ctx, id, input) {
        warn!(error = %err, "Withdrawal refused while locked, as expected");
    }
    let later = CallContext::new(user, unlock_at);
    let receipt = factory.withdraw(&later, id, input)?;
    report(&factory, "withdraw", &receipt)?;

    // 7. Destroy: sell every remaining holding for the input.
    let orders = factory
        .records()
        .holdings(id)
        .into_iter()
        .map(|h| router_order(&operator, h.asset, input, h.amount, h.amount))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let receipt = factory.destroy(&later, id, input, &orders)?;
    report(&factory, "destroy", &receipt)?;

    print_summary(&factory, &deployment, user, input, id);
    info!(events = factory.take_events().len(), "Simulation complete");
    Ok(())
}

/// Wires the factory to an in-memory ledger, a fresh registry and the configured routers.
fn build_factory(config: &Config, deployment: &Deployment) -> anyhow::Result<SimFactory> {
    let sim = &config.simulation;
    let input = Address::from_label(&sim.input_asset);
    let user = Address::from_label(&sim.user);

    let mut ledger = InMemoryLedger::new();
    ledger.mint(user, input, sim.starting_balance)?;
    for operator in &config.operators {
        let router = Address::from_label(&operator.router);
        ledger.mint(router, input, sim.router_liquidity)?;
        for asset in &sim.assets {
            ledger.mint(router, Address::from_label(asset), sim.router_liquidity)?;
        }
    }

    let settings =
        FactorySettings::from_config(deployment.factory, deployment.owner, deployment.fee_sink, config);
    let mut factory = Factory::new(settings, ledger, NftRegistry::new(deployment.factory));

    let admin = CallContext::new(deployment.owner, 0);
    for operator in &config.operators {
        let router = RouterOperator::new(Address::from_label(&operator.router));
        factory.add_operator(&admin, OperatorName::new(operator.name.clone())?, Arc::new(router))?;
    }
    factory.set_reserve(&admin, deployment.reserve)?;
    Ok(factory)
}

fn router_order(
    operator: &OperatorName,
    input: Address,
    output: Address,
    sell: Decimal,
    buy: Decimal,
) -> anyhow::Result<Order> {
    Ok(Order {
        operator: operator.clone(),
        output,
        payload: RouterCall::new(sell, buy).to_payload(input, output)?,
        commit: true,
    })
}

/// Prints a receipt as JSON followed by the portfolio's holdings.
fn report(factory: &SimFactory, step: &str, receipt: &Receipt) -> anyhow::Result<()> {
    println!("\n=== {step} ===");
    println!("{}", serde_json::to_string_pretty(receipt)?);
    print_holdings(factory, receipt.id);
    Ok(())
}

fn print_holdings(factory: &SimFactory, id: PortfolioId) {
    let mut table = Table::new();
    table.set_header(vec!["Asset", "Amount"]);
    for holding in factory.records().holdings(id) {
        table.add_row(vec![holding.asset.to_string(), holding.amount.to_string()]);
    }
    println!("Portfolio {id} (unlock at {})", factory.records().unlock_at(id));
    println!("{table}");
}

fn print_summary(
    factory: &SimFactory,
    deployment: &Deployment,
    user: Address,
    input: Address,
    id: PortfolioId,
) {
    let mut table = Table::new();
    table.set_header(vec!["Account", "Balance"]);
    let rows = [
        ("user", factory.assets().balance_of(user, input)),
        ("fee sink", factory.assets().balance_of(deployment.fee_sink, input)),
        ("reserve", factory.assets().balance_of(deployment.reserve, input)),
        ("factory", factory.assets().balance_of(deployment.factory, input)),
    ];
    for (account, balance) in rows {
        table.add_row(vec![account.to_string(), balance.to_string()]);
    }
    println!(
        "\n=== summary: {input} balances after destroying {id} ({} live portfolios) ===",
        factory.registry().len()
    );
    println!("{table}");
}
