use crate::error::OperatorError;
use crate::operator::{Operator, OperatorContext};
use core_types::{Address, PayloadHeader};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body of a router order: how much of the input to sell and how much of the
/// output the router hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterCall {
    pub sell_amount: Decimal,
    pub buy_amount: Decimal,
}

impl RouterCall {
    pub fn new(sell_amount: Decimal, buy_amount: Decimal) -> Self {
        Self { sell_amount, buy_amount }
    }

    /// Builds a complete order payload selling `input` for `output`.
    pub fn to_payload(&self, input: Address, output: Address) -> Result<Vec<u8>, OperatorError> {
        let body = serde_json::to_vec(self).map_err(|e| OperatorError::InvalidCallData(e.to_string()))?;
        Ok(PayloadHeader::new(input, output).encode(&body))
    }
}

/// An aggregator-style operator that swaps against the inventory of a router account.
///
/// The executor pays `sell_amount` of the input asset to the router and receives
/// `buy_amount` of the output asset from it. The operator then checks its own
/// balance movement, so a call that sells or buys nothing is rejected.
#[derive(Debug, Clone)]
pub struct RouterOperator {
    router: Address,
}

impl RouterOperator {
    pub fn new(router: Address) -> Self {
        Self { router }
    }

    pub fn router(&self) -> Address {
        self.router
    }
}

impl Operator for RouterOperator {
    fn commit_and_execute(
        &self,
        ctx: &mut OperatorContext<'_>,
        payload: &[u8],
    ) -> Result<(), OperatorError> {
        let (header, body) = PayloadHeader::decode(payload)?;
        let call: RouterCall =
            serde_json::from_slice(body).map_err(|e| OperatorError::InvalidCallData(e.to_string()))?;

        let input_before = ctx.assets.balance_of(ctx.executor, header.input);
        let output_before = ctx.assets.balance_of(ctx.executor, header.output);

        ctx.assets
            .transfer(ctx.executor, self.router, header.input, call.sell_amount)?;
        ctx.assets
            .transfer(self.router, ctx.executor, header.output, call.buy_amount)?;

        let sold = input_before - ctx.assets.balance_of(ctx.executor, header.input);
        let bought = ctx.assets.balance_of(ctx.executor, header.output) - output_before;

        if sold <= Decimal::ZERO {
            return Err(OperatorError::NothingSold);
        }
        if bought <= Decimal::ZERO {
            return Err(OperatorError::NothingBought);
        }

        debug!(
            router = %self.router,
            input = %header.input,
            output = %header.output,
            %sold,
            %bought,
            "Router swap executed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assets::{AssetLedger, InMemoryLedger};
    use rust_decimal_macros::dec;

    struct Fixture {
        ledger: InMemoryLedger,
        executor: Address,
        router: Address,
        dai: Address,
        uni: Address,
    }

    fn make_fixture() -> Fixture {
        let executor = Address::from_label("factory");
        let router = Address::from_label("router");
        let dai = Address::from_label("DAI");
        let uni = Address::from_label("UNI");
        let mut ledger = InMemoryLedger::new();
        ledger.mint(executor, dai, dec!(10)).unwrap();
        ledger.mint(router, uni, dec!(100)).unwrap();
        Fixture { ledger, executor, router, dai, uni }
    }

    #[test]
    fn swaps_against_router_inventory() {
        let mut f = make_fixture();
        let operator = RouterOperator::new(f.router);
        let payload = RouterCall::new(dec!(6), dec!(3)).to_payload(f.dai, f.uni).unwrap();

        let mut ctx = OperatorContext::new(f.executor, &mut f.ledger);
        operator.commit_and_execute(&mut ctx, &payload).unwrap();

        assert_eq!(f.ledger.balance_of(f.executor, f.dai), dec!(4));
        assert_eq!(f.ledger.balance_of(f.executor, f.uni), dec!(3));
        assert_eq!(f.ledger.balance_of(f.router, f.dai), dec!(6));
    }

    #[test]
    fn revert_entry_point_behaves_like_commit() {
        let mut f = make_fixture();
        let operator = RouterOperator::new(f.router);
        let payload = RouterCall::new(dec!(1), dec!(1)).to_payload(f.dai, f.uni).unwrap();

        let mut ctx = OperatorContext::new(f.executor, &mut f.ledger);
        operator.revert_and_execute(&mut ctx, &payload).unwrap();
        assert_eq!(f.ledger.balance_of(f.executor, f.uni), dec!(1));
    }

    #[test]
    fn zero_legs_are_rejected() {
        let mut f = make_fixture();
        let operator = RouterOperator::new(f.router);

        let nothing_sold = RouterCall::new(dec!(0), dec!(1)).to_payload(f.dai, f.uni).unwrap();
        let mut ctx = OperatorContext::new(f.executor, &mut f.ledger);
        assert_eq!(
            operator.commit_and_execute(&mut ctx, &nothing_sold),
            Err(OperatorError::NothingSold)
        );

        let nothing_bought = RouterCall::new(dec!(1), dec!(0)).to_payload(f.dai, f.uni).unwrap();
        assert_eq!(
            operator.commit_and_execute(&mut ctx, &nothing_bought),
            Err(OperatorError::NothingBought)
        );
    }

    #[test]
    fn garbage_body_and_short_payload_fail() {
        let mut f = make_fixture();
        let operator = RouterOperator::new(f.router);
        let mut ctx = OperatorContext::new(f.executor, &mut f.ledger);

        let garbage = PayloadHeader::new(f.dai, f.uni).encode(b"not json");
        assert!(matches!(
            operator.commit_and_execute(&mut ctx, &garbage),
            Err(OperatorError::InvalidCallData(_))
        ));
        assert!(matches!(
            operator.commit_and_execute(&mut ctx, &[0u8; 12]),
            Err(OperatorError::Payload(_))
        ));
    }

    #[test]
    fn router_without_inventory_fails() {
        let mut f = make_fixture();
        let operator = RouterOperator::new(f.router);
        let payload = RouterCall::new(dec!(1), dec!(500)).to_payload(f.dai, f.uni).unwrap();

        let mut ctx = OperatorContext::new(f.executor, &mut f.ledger);
        assert!(matches!(
            operator.commit_and_execute(&mut ctx, &payload),
            Err(OperatorError::Asset(_))
        ));
    }
}
