use crate::Factory;
use crate::error::FactoryError;
use crate::event::FactoryEvent;
use assets::{AssetLedger, Reserve};
use configuration::STANDARD_FEE_BPS;
use core_types::{Address, CallContext, OperatorName};
use operators::Operator;
use ownership::PortfolioRegistry;
use rust_decimal::Decimal;
use std::sync::Arc;

impl<L, R> Factory<L, R>
where
    L: AssetLedger + Clone,
    R: PortfolioRegistry + Clone,
{
    fn ensure_admin(&self, ctx: &CallContext) -> Result<(), FactoryError> {
        if ctx.caller != self.settings.owner {
            return Err(FactoryError::Unauthorized(ctx.caller));
        }
        Ok(())
    }

    /// Registers (or replaces) the operator handle for `name`.
    pub fn add_operator(
        &mut self,
        ctx: &CallContext,
        name: OperatorName,
        operator: Arc<dyn Operator>,
    ) -> Result<(), FactoryError> {
        self.ensure_admin(ctx)?;
        self.resolver.add_operator(ctx.caller, name.clone(), operator)?;
        self.emit(FactoryEvent::OperatorAdded { name });
        Ok(())
    }

    /// Sets the custody account. It can be set only once.
    pub fn set_reserve(&mut self, ctx: &CallContext, reserve: Address) -> Result<(), FactoryError> {
        self.ensure_admin(ctx)?;
        if self.settings.reserve.is_some() {
            return Err(FactoryError::ReserveImmutable);
        }
        if reserve.is_zero() {
            return Err(FactoryError::InvalidAddress);
        }
        self.settings.reserve = Some(Reserve::new(reserve, self.settings.address));
        self.emit(FactoryEvent::ReserveUpdated { reserve });
        Ok(())
    }

    pub fn set_fee_sink(
        &mut self,
        ctx: &CallContext,
        fee_sink: Address,
    ) -> Result<(), FactoryError> {
        self.ensure_admin(ctx)?;
        if fee_sink.is_zero() {
            return Err(FactoryError::InvalidAddress);
        }
        self.settings.fee_sink = fee_sink;
        self.emit(FactoryEvent::FeeSinkUpdated { fee_sink });
        Ok(())
    }

    /// Changes the VIP rate and the holding needed to qualify for it.
    pub fn update_vip_discount(
        &mut self,
        ctx: &CallContext,
        vip_fee_bps: u32,
        vip_min_amount: Decimal,
    ) -> Result<(), FactoryError> {
        self.ensure_admin(ctx)?;
        if vip_fee_bps >= STANDARD_FEE_BPS {
            return Err(FactoryError::DiscountTooHigh(vip_fee_bps));
        }
        if vip_min_amount.is_sign_negative() {
            return Err(FactoryError::InvalidAmount(vip_min_amount));
        }
        self.settings.fees.vip_fee_bps = vip_fee_bps;
        self.settings.fees.vip_min_amount = vip_min_amount;
        self.emit(FactoryEvent::VipDiscountUpdated {
            vip_fee_bps,
            vip_min_amount,
        });
        Ok(())
    }

    /// Sets the asset whose holding qualifies a portfolio for the VIP rate.
    pub fn set_vip_asset(
        &mut self,
        ctx: &CallContext,
        vip_asset: Address,
    ) -> Result<(), FactoryError> {
        self.ensure_admin(ctx)?;
        if vip_asset.is_zero() {
            return Err(FactoryError::InvalidAddress);
        }
        self.settings.fees.vip_asset = Some(vip_asset);
        self.emit(FactoryEvent::VipAssetUpdated { vip_asset });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Factory, FactoryError, FactoryEvent, FactorySettings, FeeSchedule};
    use assets::{AssetLedger, InMemoryLedger};
    use core_types::{Address, CallContext, LeftoverPolicy, OperatorName, Order};
    use operators::{RouterCall, RouterOperator};
    use ownership::NftRegistry;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn make_factory() -> (Factory<InMemoryLedger, NftRegistry>, CallContext, CallContext) {
        let address = Address::from_label("factory");
        let owner = Address::from_label("owner");
        let settings = FactorySettings {
            address,
            owner,
            reserve: None,
            fee_sink: Address::from_label("fee-sink"),
            fees: FeeSchedule::new(50, Decimal::ZERO, None),
            leftover_policy: LeftoverPolicy::FeeSink,
            wrapped_native: None,
        };
        let factory = Factory::new(settings, InMemoryLedger::new(), NftRegistry::new(address));
        let admin = CallContext::new(owner, 0);
        let user = CallContext::new(Address::from_label("alice"), 0);
        (factory, admin, user)
    }

    #[test]
    fn admin_calls_reject_other_callers() {
        let (mut factory, _, user) = make_factory();
        let alice = user.caller;
        let name = OperatorName::new("ZeroEx").unwrap();
        let router = Arc::new(RouterOperator::new(Address::from_label("router")));

        assert_eq!(
            factory.add_operator(&user, name, router),
            Err(FactoryError::Unauthorized(alice))
        );
        assert_eq!(
            factory.set_reserve(&user, Address::from_label("reserve")),
            Err(FactoryError::Unauthorized(alice))
        );
        assert_eq!(
            factory.set_fee_sink(&user, alice),
            Err(FactoryError::Unauthorized(alice))
        );
        assert_eq!(
            factory.update_vip_discount(&user, 10, dec!(1)),
            Err(FactoryError::Unauthorized(alice))
        );
        assert!(factory.take_events().is_empty());
    }

    #[test]
    fn operator_registration_is_recorded() {
        let (mut factory, admin, _) = make_factory();
        let name = OperatorName::new("ZeroEx").unwrap();
        let router = Arc::new(RouterOperator::new(Address::from_label("router")));

        factory.add_operator(&admin, name.clone(), router).unwrap();
        assert_eq!(factory.required_operators(), &[name.clone()]);
        assert!(factory.are_operators_imported(&[name.clone()]));
        assert_eq!(factory.take_events(), vec![FactoryEvent::OperatorAdded { name }]);
    }

    #[test]
    fn reserve_is_immutable_once_set() {
        let (mut factory, admin, _) = make_factory();
        assert_eq!(
            factory.set_reserve(&admin, Address::ZERO),
            Err(FactoryError::InvalidAddress)
        );

        let reserve = Address::from_label("reserve");
        factory.set_reserve(&admin, reserve).unwrap();
        assert_eq!(factory.reserve().map(|r| r.address()), Some(reserve));
        assert_eq!(
            factory.set_reserve(&admin, Address::from_label("other")),
            Err(FactoryError::ReserveImmutable)
        );
    }

    #[test]
    fn fee_sink_cannot_be_zero() {
        let (mut factory, admin, _) = make_factory();
        assert_eq!(
            factory.set_fee_sink(&admin, Address::ZERO),
            Err(FactoryError::InvalidAddress)
        );

        let sink = Address::from_label("new-sink");
        factory.set_fee_sink(&admin, sink).unwrap();
        assert_eq!(factory.fee_sink(), sink);
    }

    #[test]
    fn vip_discount_must_stay_below_standard_rate() {
        let (mut factory, admin, _) = make_factory();
        assert_eq!(
            factory.update_vip_discount(&admin, 100, dec!(1)),
            Err(FactoryError::DiscountTooHigh(100))
        );

        factory.update_vip_discount(&admin, 99, dec!(500)).unwrap();
        assert_eq!(factory.settings().fees.vip_fee_bps, 99);
        assert_eq!(factory.settings().fees.vip_min_amount, dec!(500));
        assert_eq!(
            factory.take_events(),
            vec![FactoryEvent::VipDiscountUpdated {
                vip_fee_bps: 99,
                vip_min_amount: dec!(500)
            }]
        );
    }

    #[test]
    fn native_input_needs_a_wrapped_asset() {
        let (mut factory, admin, user) = make_factory();
        let router = Address::from_label("router");
        let name = OperatorName::new("ZeroEx").unwrap();
        factory
            .add_operator(&admin, name.clone(), Arc::new(RouterOperator::new(router)))
            .unwrap();
        factory.set_reserve(&admin, Address::from_label("reserve")).unwrap();
        factory.assets_mut().mint(user.caller, Address::NATIVE, dec!(10)).unwrap();

        let weth = Address::from_label("WETH");
        let uni = Address::from_label("UNI");
        let order = Order {
            operator: name,
            output: uni,
            payload: RouterCall::new(dec!(1), dec!(1)).to_payload(weth, uni).unwrap(),
            commit: true,
        };
        let ctx = user.with_value(dec!(1.01));
        assert_eq!(
            factory.create(&ctx, None, Address::NATIVE, dec!(1.01), &[order]),
            Err(FactoryError::NativeNotSupported)
        );
        assert_eq!(factory.assets().balance_of(user.caller, Address::NATIVE), dec!(10));
    }
}
