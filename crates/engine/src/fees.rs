use crate::error::FactoryError;
use configuration::{BPS_DENOMINATOR, FeeSettings, STANDARD_FEE_BPS};
use core_types::{Address, PortfolioId};
use records::Records;
use rust_decimal::Decimal;
use serde::Serialize;

/// The protocol fee schedule: a fixed standard rate and one VIP tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeSchedule {
    pub vip_fee_bps: u32,
    pub vip_min_amount: Decimal,
    pub vip_asset: Option<Address>,
}

impl FeeSchedule {
    pub fn new(vip_fee_bps: u32, vip_min_amount: Decimal, vip_asset: Option<Address>) -> Self {
        Self {
            vip_fee_bps,
            vip_min_amount,
            vip_asset,
        }
    }

    /// The rate, in basis points, that portfolio `id` pays.
    ///
    /// A portfolio qualifies for the VIP rate when its holding of the VIP asset is
    /// at least the configured minimum. Portfolios that do not exist yet pay the
    /// standard rate.
    pub fn rate_bps(&self, records: &Records, id: Option<PortfolioId>) -> u32 {
        match (self.vip_asset, id) {
            (Some(asset), Some(id)) if records.contains(id) => {
                if records.amount_of(id, asset) >= self.vip_min_amount {
                    self.vip_fee_bps
                } else {
                    STANDARD_FEE_BPS
                }
            }
            _ => STANDARD_FEE_BPS,
        }
    }
}

impl From<&FeeSettings> for FeeSchedule {
    fn from(settings: &FeeSettings) -> Self {
        Self::new(settings.vip_fee_bps, settings.vip_min_amount, settings.vip_asset)
    }
}

/// `amount * bps / 10_000`, exact in decimal arithmetic.
pub fn fee_for(amount: Decimal, bps: u32) -> Result<Decimal, FactoryError> {
    amount
        .checked_mul(Decimal::from(bps))
        .map(|scaled| scaled / Decimal::from(BPS_DENOMINATOR))
        .ok_or(FactoryError::AmountOverflow(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn standard_fee_is_one_percent() {
        assert_eq!(fee_for(dec!(10), STANDARD_FEE_BPS), Ok(dec!(0.1)));
        assert_eq!(fee_for(dec!(9.9), STANDARD_FEE_BPS), Ok(dec!(0.099)));
        assert_eq!(fee_for(Decimal::ZERO, STANDARD_FEE_BPS), Ok(Decimal::ZERO));
    }

    #[test]
    fn fee_on_huge_amount_overflows_into_an_error() {
        let huge = Decimal::MAX / dec!(50);
        assert_eq!(
            fee_for(huge, STANDARD_FEE_BPS),
            Err(FactoryError::AmountOverflow(huge))
        );
        assert!(fee_for(huge, 1).is_ok());
    }

    #[test]
    fn vip_rate_needs_threshold_holding() {
        let factory = Address::from_label("factory");
        let nst = Address::from_label("NST");
        let id = PortfolioId(1);
        let mut records = Records::new(factory);
        records.credit(factory, id, nst, dec!(499)).unwrap();

        let schedule = FeeSchedule::new(40, dec!(500), Some(nst));
        assert_eq!(schedule.rate_bps(&records, Some(id)), STANDARD_FEE_BPS);

        records.credit(factory, id, nst, dec!(1)).unwrap();
        assert_eq!(schedule.rate_bps(&records, Some(id)), 40);
        assert_eq!(schedule.rate_bps(&records, None), STANDARD_FEE_BPS);
    }

    #[test]
    fn no_vip_asset_means_no_discount() {
        let factory = Address::from_label("factory");
        let mut records = Records::new(factory);
        records
            .credit(factory, PortfolioId(1), Address::from_label("UNI"), dec!(1000))
            .unwrap();

        let schedule = FeeSchedule::new(10, Decimal::ZERO, None);
        assert_eq!(schedule.rate_bps(&records, Some(PortfolioId(1))), STANDARD_FEE_BPS);
    }
}
