#![deny(warnings)]

//! Economic state for Market Hustle: the cash ledger, the real-estate
//! registry, the supply chain and the market trend walk.
//!
//! This crate also provides the small pricing helpers the store floor uses:
//! - Price appeal under constant elasticity (`price_appeal`)
//! - Supplier markup and promotional discounts (`marked_up`, `promo_price`)
//! - Rounding of decimal money onto the integer ledger (`to_units`)

pub mod ledger;
pub mod market;
pub mod property;
pub mod supply;

pub use ledger::Ledger;
pub use market::{MarketTrends, TREND_BOUNDS};
pub use property::PropertyRegistry;
pub use supply::{seasonal_factor, PendingDelivery, SupplyChain, DEMAND_BOUNDS, SALE_DEMAND_FACTOR};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// How attractive a price level is to a shopper, `(1 / price_level)^sensitivity`.
///
/// A price level of 1.0 is neutral. Higher prices lose appeal faster for
/// more sensitive shoppers. Non-positive or non-finite inputs yield 0.
///
/// Example:
/// assert_eq!(price_appeal(1.0, 1.5), 1.0);
/// assert!(price_appeal(1.2, 1.5) < price_appeal(1.2, 0.5));
pub fn price_appeal(price_level: f32, sensitivity: f32) -> f32 {
    if !(price_level.is_finite() && sensitivity.is_finite()) || price_level <= 0.0 {
        return 0.0;
    }
    let appeal = price_level.recip().powf(sensitivity);
    if appeal.is_finite() {
        appeal
    } else {
        0.0
    }
}

/// Apply a multiplicative markup such as a supplier price multiplier.
pub fn marked_up(amount: i64, multiplier: f32) -> i64 {
    let m = Decimal::from_f32(multiplier).unwrap_or(Decimal::ONE);
    to_units(Decimal::from(amount) * m)
}

/// Apply a promotional discount. `discount_frac` in [0, 1); anything else
/// leaves the price unchanged.
///
/// Example:
/// assert_eq!(promo_price(1000, 0.2), 800);
pub fn promo_price(price: i64, discount_frac: f32) -> i64 {
    if !discount_frac.is_finite() || !(0.0..1.0).contains(&discount_frac) {
        return price;
    }
    marked_up(price, 1.0 - discount_frac)
}

/// Round a decimal amount to whole currency units, half away from zero.
pub fn to_units(amount: Decimal) -> i64 {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(if amount.is_sign_negative() { i64::MIN } else { i64::MAX })
}
