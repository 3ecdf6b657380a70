//! Real-estate registry: listings, ownership and daily appreciation.

use crate::ledger::Ledger;
use crate::market::MarketTrends;
use bevy_ecs::prelude::Resource;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sim_core::{Notification, Outbox, PropertyId, PropertyKind, PropertyRecord, SimError, SimResult};
use tracing::{info, warn};

/// Decimal places kept on property valuations.
const VALUE_SCALE: u32 = 4;

#[derive(Debug, Default, Resource)]
pub struct PropertyRegistry {
    properties: Vec<PropertyRecord>,
    current_home: Option<PropertyId>,
    outbox: Outbox,
}

impl PropertyRegistry {
    /// Build the registry from catalog listings. Listings start unowned.
    pub fn new(listings: Vec<PropertyRecord>) -> Self {
        let properties = listings
            .into_iter()
            .map(|mut p| {
                if p.base_price <= 0 {
                    p.base_price = p.price;
                }
                p.owned = false;
                p.property_value = Decimal::ZERO;
                p
            })
            .collect();
        Self {
            properties,
            current_home: None,
            outbox: Outbox::default(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&PropertyRecord> {
        self.properties.iter().find(|p| p.id.0 == id)
    }

    fn get_mut(&mut self, id: &str) -> SimResult<&mut PropertyRecord> {
        self.properties
            .iter_mut()
            .find(|p| p.id.0 == id)
            .ok_or_else(|| SimError::unknown(format!("property {id}")))
    }

    /// Every listing, owned or not.
    pub fn listings(&self) -> &[PropertyRecord] {
        &self.properties
    }

    pub fn owned(&self) -> impl Iterator<Item = &PropertyRecord> {
        self.properties.iter().filter(|p| p.owned)
    }

    pub fn owned_count(&self) -> u32 {
        self.owned().count() as u32
    }

    pub fn owned_ids(&self) -> Vec<PropertyId> {
        self.owned().map(|p| p.id.clone()).collect()
    }

    /// Buy listing `id` at its current price.
    pub fn buy_property(&mut self, id: &str, ledger: &mut Ledger) -> SimResult<i64> {
        let prop = self.get_mut(id)?;
        if prop.owned {
            return Err(SimError::ineligible(format!("{id} is already owned")));
        }
        let price = prop.price;
        ledger.try_spend(price)?;
        prop.owned = true;
        prop.property_value = Decimal::from(price);
        let residential = prop.kind.is_residential();
        let pid = prop.id.clone();
        info!(property = %pid, price, "property purchased");
        self.outbox.push(Notification::PropertyPurchased {
            id: pid.clone(),
            price,
        });
        if residential {
            self.current_home = Some(pid);
        }
        Ok(price)
    }

    /// Pay one month of rent on a listing offered for rent.
    pub fn rent_property(&mut self, id: &str, ledger: &mut Ledger) -> SimResult<i64> {
        let prop = self.get_mut(id)?;
        if !prop.for_rent {
            return Err(SimError::ineligible(format!("{id} is not for rent")));
        }
        let rent = prop.monthly_rent;
        ledger.try_spend(rent)?;
        let pid = prop.id.clone();
        self.outbox.push(Notification::PropertyRented { id: pid, rent });
        Ok(rent)
    }

    /// Appreciate every owned property by one day.
    pub fn process_daily_tick(&mut self) {
        for p in self.properties.iter_mut().filter(|p| p.owned) {
            let next = Decimal::ONE
                .checked_add(p.appreciation_rate)
                .and_then(|factor| p.property_value.checked_mul(factor))
                .map(|v| v.round_dp(VALUE_SCALE))
                .unwrap_or(Decimal::MAX);
            if next != p.property_value {
                p.property_value = next;
                self.outbox.push(Notification::PropertyValueChanged {
                    id: p.id.clone(),
                    value: next,
                });
            }
        }
    }

    /// Summed valuation of owned properties, saturating at `Decimal::MAX`.
    pub fn total_property_value(&self) -> Decimal {
        self.owned()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(p.property_value))
            .unwrap_or(Decimal::MAX)
    }

    /// Total valuation rounded down to whole currency units.
    pub fn total_property_value_units(&self) -> i64 {
        self.total_property_value().floor().to_i64().unwrap_or(i64::MAX)
    }

    /// Re-price every listing from its base price and the segment trend.
    pub fn apply_trends(&mut self, trends: &MarketTrends) {
        for p in &mut self.properties {
            let factor = Decimal::from_f32(trends.trend(p.kind.trend_category())).unwrap_or(Decimal::ONE);
            let priced = (Decimal::from(p.trend_base()) * factor).trunc();
            p.price = priced.to_i64().unwrap_or(p.price);
        }
    }

    pub fn current_home(&self) -> Option<&PropertyRecord> {
        self.current_home.as_ref().and_then(|id| self.get(&id.0))
    }

    /// Move the player into an owned residential property.
    pub fn set_current_home(&mut self, id: &str) -> SimResult<()> {
        let prop = self
            .get(id)
            .ok_or_else(|| SimError::unknown(format!("property {id}")))?;
        if !prop.owned || !prop.kind.is_residential() {
            return Err(SimError::ineligible(format!("{id} cannot be a home")));
        }
        self.current_home = Some(prop.id.clone());
        Ok(())
    }

    /// Set ownership to exactly `ids`, valuing each at its listing price.
    /// Unknown ids are skipped. Returns how many were restored.
    pub fn restore_ownership(&mut self, ids: &[PropertyId]) -> usize {
        for p in &mut self.properties {
            p.owned = false;
            p.property_value = Decimal::ZERO;
        }
        self.current_home = None;
        let mut restored = 0;
        for id in ids {
            match self.properties.iter_mut().find(|p| &p.id == id) {
                Some(p) if !p.owned => {
                    p.owned = true;
                    p.property_value = Decimal::from(p.price);
                    if p.kind.is_residential() {
                        self.current_home = Some(p.id.clone());
                    }
                    restored += 1;
                }
                Some(_) => {}
                None => warn!(property = %id, "saved property not in catalog"),
            }
        }
        restored
    }

    /// Release every owned property except apartments. Returns released ids.
    pub fn reset_for_prestige(&mut self) -> Vec<PropertyId> {
        let mut released = Vec::new();
        for p in &mut self.properties {
            if p.owned && p.kind != PropertyKind::Apartment {
                p.owned = false;
                p.property_value = Decimal::ZERO;
                released.push(p.id.clone());
            }
        }
        let home_released = self
            .current_home
            .as_ref()
            .map(|h| released.contains(h))
            .unwrap_or(false);
        if home_released {
            let fallback = self
                .owned()
                .find(|p| p.kind.is_residential())
                .map(|p| p.id.clone());
            self.current_home = fallback;
        }
        released
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sim_core::{Catalog, MarketConfig};

    fn registry() -> PropertyRegistry {
        PropertyRegistry::new(Catalog::builtin().properties)
    }

    #[test]
    fn cannot_buy_without_funds() {
        let mut reg = registry();
        let mut ledger = Ledger::new(1_000);
        assert!(matches!(
            reg.buy_property("apt_01", &mut ledger),
            Err(SimError::InsufficientFunds { .. })
        ));
        assert_eq!(ledger.cash(), 1_000);
        assert_eq!(reg.owned_count(), 0);
        assert!(reg.drain_notifications().is_empty());
    }

    #[test]
    fn buy_sets_value_and_home() {
        let mut reg = registry();
        let mut ledger = Ledger::new(20_000);
        assert_eq!(reg.buy_property("condo_01", &mut ledger).unwrap(), 15_000);
        assert_eq!(ledger.cash(), 5_000);
        assert_eq!(reg.total_property_value(), Decimal::from(15_000));
        assert_eq!(reg.current_home().map(|p| p.id.0.as_str()), Some("condo_01"));
        assert!(matches!(
            reg.buy_property("condo_01", &mut ledger),
            Err(SimError::Ineligible(_))
        ));
        assert!(matches!(
            reg.buy_property("castle_99", &mut ledger),
            Err(SimError::UnknownEntity(_))
        ));
    }

    #[test]
    fn rent_requires_for_rent_flag() {
        let mut reg = registry();
        let mut ledger = Ledger::new(10_000);
        assert_eq!(reg.rent_property("apt_01", &mut ledger).unwrap(), 500);
        assert_eq!(ledger.cash(), 9_500);
        assert!(matches!(
            reg.rent_property("man_01", &mut ledger),
            Err(SimError::Ineligible(_))
        ));
    }

    #[test]
    fn appreciation_compounds_daily() {
        let mut reg = registry();
        let mut ledger = Ledger::new(50_000);
        reg.buy_property("villa_01", &mut ledger).unwrap();
        reg.drain_notifications();
        reg.process_daily_tick();
        assert_eq!(reg.total_property_value(), Decimal::new(50_050, 0));
        assert_eq!(reg.drain_notifications().len(), 1);
    }

    #[test]
    fn trends_reprice_listings_not_valuations() {
        let mut reg = registry();
        let mut ledger = Ledger::new(5_000);
        reg.buy_property("apt_01", &mut ledger).unwrap();
        let mut trends = MarketTrends::new(&MarketConfig {
            volatility: 0.5,
            ..MarketConfig::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        trends.step(&mut rng);
        reg.apply_trends(&trends);
        let expected = (5_000.0 * trends.trend(sim_core::TrendCategory::Housing)) as i64;
        let apt = reg.get("apt_01").unwrap();
        assert!((apt.price - expected).abs() <= 1);
        assert_eq!(apt.property_value, Decimal::from(5_000));
    }

    #[test]
    fn prestige_keeps_apartments_only() {
        let mut reg = registry();
        let mut ledger = Ledger::new(100_000);
        reg.buy_property("apt_01", &mut ledger).unwrap();
        reg.buy_property("villa_01", &mut ledger).unwrap();
        let released = reg.reset_for_prestige();
        assert_eq!(released, vec![PropertyId::from("villa_01")]);
        assert_eq!(reg.owned_ids(), vec![PropertyId::from("apt_01")]);
        assert_eq!(reg.current_home().map(|p| p.id.0.as_str()), Some("apt_01"));
    }

    #[test]
    fn prestige_without_apartment_leaves_no_home() {
        let mut reg = registry();
        let mut ledger = Ledger::new(100_000);
        reg.buy_property("villa_01", &mut ledger).unwrap();
        reg.reset_for_prestige();
        assert_eq!(reg.owned_count(), 0);
        assert!(reg.current_home().is_none());
    }

    #[test]
    fn appreciation_saturates_instead_of_overflowing() {
        let mut listings = Catalog::builtin().properties;
        listings[0].appreciation_rate = Decimal::ONE;
        let mut reg = PropertyRegistry::new(listings);
        let mut ledger = Ledger::new(10_000);
        reg.buy_property("apt_01", &mut ledger).unwrap();
        for _ in 0..200 {
            reg.process_daily_tick();
        }
        assert_eq!(reg.get("apt_01").unwrap().property_value, Decimal::MAX);
        assert_eq!(reg.total_property_value(), Decimal::MAX);
        assert_eq!(reg.total_property_value_units(), i64::MAX);
        reg.buy_property("condo_01", &mut ledger).unwrap_err();
        ledger.add_money(20_000);
        reg.buy_property("condo_01", &mut ledger).unwrap();
        assert_eq!(reg.total_property_value(), Decimal::MAX);
    }

    #[test]
    fn restore_ownership_skips_unknown_ids() {
        let mut reg = registry();
        let ids = vec![PropertyId::from("apt_01"), PropertyId::from("ghost")];
        assert_eq!(reg.restore_ownership(&ids), 1);
        assert_eq!(reg.owned_ids(), vec![PropertyId::from("apt_01")]);
    }

    proptest! {
        #[test]
        fn owned_value_never_decreases(rate_bp in 0i64..500, days in 1usize..400) {
            let mut listings = Catalog::builtin().properties;
            listings[0].appreciation_rate = Decimal::new(rate_bp, 4);
            let mut reg = PropertyRegistry::new(listings);
            let mut ledger = Ledger::new(10_000);
            reg.buy_property("apt_01", &mut ledger).unwrap();
            let mut last = reg.total_property_value();
            for _ in 0..days {
                reg.process_daily_tick();
                let now = reg.total_property_value();
                prop_assert!(now >= last);
                last = now;
            }
        }
    }
}
