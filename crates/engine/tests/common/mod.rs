#![allow(dead_code)]

use assets::{AssetLedger, InMemoryLedger};
use core_types::{Address, CallContext, LeftoverPolicy, OperatorName, Order, PortfolioId};
use engine::{Factory, FactorySettings, FeeSchedule};
use operators::{RouterCall, RouterOperator};
use ownership::NftRegistry;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;

pub const ZEROEX: &str = "ZeroEx";

/// A factory wired to in-memory collaborators, a funded user and one router.
pub struct Harness {
    pub factory: Factory<InMemoryLedger, NftRegistry>,
    pub admin: CallContext,
    pub alice: CallContext,
    pub bob: CallContext,
    pub reserve: Address,
    pub fee_sink: Address,
    pub router: Address,
    pub dai: Address,
    pub uni: Address,
    pub knc: Address,
    pub weth: Address,
    pub nst: Address,
    supply: HashMap<Address, Decimal>,
}

pub fn harness() -> Harness {
    build(LeftoverPolicy::FeeSink, true)
}

pub fn harness_with_policy(policy: LeftoverPolicy) -> Harness {
    build(policy, true)
}

pub fn harness_without_reserve() -> Harness {
    build(LeftoverPolicy::FeeSink, false)
}

fn build(policy: LeftoverPolicy, with_reserve: bool) -> Harness {
    let address = Address::from_label("factory");
    let owner = Address::from_label("owner");
    let fee_sink = Address::from_label("fee-sink");
    let router = Address::from_label("router");
    let reserve = Address::from_label("reserve");
    let alice = Address::from_label("alice");
    let bob = Address::from_label("bob");

    let dai = Address::from_label("DAI");
    let uni = Address::from_label("UNI");
    let knc = Address::from_label("KNC");
    let weth = Address::from_label("WETH");
    let nst = Address::from_label("NST");

    let mut ledger = InMemoryLedger::new();
    for asset in [dai, uni, knc, weth, nst] {
        ledger.mint(router, asset, dec!(1000)).unwrap();
    }
    ledger.mint(alice, dai, dec!(1000)).unwrap();
    ledger.mint(bob, dai, dec!(1000)).unwrap();
    ledger.mint(alice, Address::NATIVE, dec!(100)).unwrap();

    let supply = [dai, uni, knc, weth, nst, Address::NATIVE]
        .into_iter()
        .map(|asset| (asset, ledger.total_supply(asset)))
        .collect();

    let settings = FactorySettings {
        address,
        owner,
        reserve: None,
        fee_sink,
        fees: FeeSchedule::new(50, Decimal::ZERO, None),
        leftover_policy: policy,
        wrapped_native: Some(weth),
    };
    let mut factory = Factory::new(settings, ledger, NftRegistry::new(address));

    let admin = CallContext::new(owner, 0);
    factory
        .add_operator(&admin, operator_name(), Arc::new(RouterOperator::new(router)))
        .unwrap();
    if with_reserve {
        factory.set_reserve(&admin, reserve).unwrap();
    }
    factory.take_events();

    Harness {
        factory,
        admin,
        alice: CallContext::new(alice, 0),
        bob: CallContext::new(bob, 0),
        reserve,
        fee_sink,
        router,
        dai,
        uni,
        knc,
        weth,
        nst,
        supply,
    }
}

pub fn operator_name() -> OperatorName {
    OperatorName::new(ZEROEX).unwrap()
}

/// An order that sells `sell` of `input` to the router for `buy` of `output`.
pub fn order(input: Address, output: Address, sell: Decimal, buy: Decimal) -> Order {
    Order {
        operator: operator_name(),
        output,
        payload: RouterCall::new(sell, buy).to_payload(input, output).unwrap(),
        commit: true,
    }
}

impl Harness {
    pub fn balance(&self, account: Address, asset: Address) -> Decimal {
        self.factory.assets().balance_of(account, asset)
    }

    /// Creates the reference portfolio: 10.1 DAI supplied for 6 UNI and 4 KNC.
    pub fn create_default(&mut self) -> PortfolioId {
        let orders = vec![
            order(self.dai, self.uni, dec!(6), dec!(6)),
            order(self.dai, self.knc, dec!(4), dec!(4)),
        ];
        let ctx = self.alice;
        let receipt = self
            .factory
            .create(&ctx, None, self.dai, dec!(10.1), &orders)
            .unwrap();
        receipt.id
    }

    /// Custody matches the records, the factory holds nothing and no asset was
    /// created or destroyed. Wrapping only mints what the locked native coin backs.
    pub fn assert_conserved(&self) {
        for (asset, supply) in &self.supply {
            let backing = self.balance(*asset, Address::NATIVE);
            assert_eq!(
                self.factory.assets().total_supply(*asset) - backing,
                *supply,
                "supply of {asset} changed"
            );
            assert_eq!(
                self.balance(self.factory.address(), *asset),
                Decimal::ZERO,
                "factory kept some {asset}"
            );
            assert_eq!(
                self.balance(self.reserve, *asset),
                self.factory.records().total_of(*asset),
                "reserve and records disagree on {asset}"
            );
        }
    }
}
