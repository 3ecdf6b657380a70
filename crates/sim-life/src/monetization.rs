//! Premium currency, cosmetic unlocks and timed convenience boosts.
//!
//! Currency, owned cosmetics and the instant delivery unlock are stored in
//! [`Preferences`] under `monetization.*`, so they carry across saves and
//! prestige. Timed boosts live only as long as the session.

use bevy_ecs::prelude::Resource;
use sim_core::{Cosmetic, MonetizationConfig, Notification, Outbox, Preferences, SimError, SimResult};
use std::collections::BTreeSet;
use tracing::info;

const CURRENCY_KEY: &str = "monetization.premium_currency";
const INSTANT_DELIVERY_KEY: &str = "monetization.instant_delivery";
const COSMETIC_PREFIX: &str = "monetization.cosmetic.";

#[derive(Debug, Resource)]
pub struct Monetization {
    cosmetics: Vec<Cosmetic>,
    unlocked: BTreeSet<String>,
    premium_currency: u32,
    instant_delivery: bool,
    discount: f32,
    discount_remaining: f64,
    double_experience_remaining: f64,
    cfg: MonetizationConfig,
    outbox: Outbox,
}

impl Monetization {
    /// Build from the cosmetic catalog, restoring purchases kept in `prefs`.
    pub fn new(cosmetics: Vec<Cosmetic>, cfg: MonetizationConfig, prefs: &Preferences) -> Self {
        let unlocked = prefs
            .with_prefix(COSMETIC_PREFIX)
            .filter(|(_, v)| *v != 0.0)
            .map(|(k, _)| k[COSMETIC_PREFIX.len()..].to_string())
            .filter(|id| cosmetics.iter().any(|c| &c.id == id))
            .collect();
        Self {
            cosmetics,
            unlocked,
            premium_currency: prefs.get_or(CURRENCY_KEY, 0.0).clamp(0.0, f64::from(u32::MAX)) as u32,
            instant_delivery: prefs.get_or(INSTANT_DELIVERY_KEY, 0.0) != 0.0,
            discount: 0.0,
            discount_remaining: 0.0,
            double_experience_remaining: 0.0,
            cfg,
            outbox: Outbox::default(),
        }
    }

    pub fn premium_currency(&self) -> u32 {
        self.premium_currency
    }

    pub fn add_premium_currency(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        self.premium_currency = self.premium_currency.saturating_add(amount);
        self.outbox.push(Notification::PremiumCurrencyChanged {
            balance: self.premium_currency,
        });
    }

    /// Credit a store purchase of premium currency.
    pub fn purchase_premium_currency(&mut self, amount: u32) {
        info!(amount, "premium currency purchased");
        self.add_premium_currency(amount);
    }

    /// Reward for watching an ad: currency plus a temporary order discount.
    pub fn watch_rewarded_ad(&mut self) {
        self.add_premium_currency(self.cfg.currency_per_ad);
        self.grant_temporary_discount(self.cfg.ad_discount, self.cfg.ad_discount_secs);
    }

    /// Replace any running discount with `discount` for `secs` seconds.
    pub fn grant_temporary_discount(&mut self, discount: f32, secs: f64) {
        if !discount.is_finite() || !secs.is_finite() || secs <= 0.0 {
            return;
        }
        self.discount = discount.clamp(0.0, 1.0);
        self.discount_remaining = secs;
    }

    pub fn current_discount(&self) -> f32 {
        self.discount
    }

    pub fn cosmetics(&self) -> &[Cosmetic] {
        &self.cosmetics
    }

    pub fn available_cosmetics(&self) -> impl Iterator<Item = &Cosmetic> {
        self.cosmetics.iter().filter(|c| !self.unlocked.contains(&c.id))
    }

    pub fn unlocked_cosmetics(&self) -> impl Iterator<Item = &Cosmetic> {
        self.cosmetics.iter().filter(|c| self.unlocked.contains(&c.id))
    }

    pub fn purchase_cosmetic(&mut self, id: &str) -> SimResult<()> {
        let cost = self
            .cosmetics
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.premium_cost)
            .ok_or_else(|| SimError::unknown(format!("cosmetic {id}")))?;
        if self.unlocked.contains(id) {
            return Err(SimError::ineligible(format!("{id} is already owned")));
        }
        if self.premium_currency < cost {
            return Err(SimError::InsufficientFunds {
                needed: i64::from(cost),
                available: i64::from(self.premium_currency),
            });
        }
        self.premium_currency -= cost;
        self.unlocked.insert(id.to_string());
        info!(cosmetic = id, cost, "cosmetic purchased");
        self.outbox.push(Notification::CosmeticPurchased { id: id.to_string() });
        self.outbox.push(Notification::PremiumCurrencyChanged {
            balance: self.premium_currency,
        });
        Ok(())
    }

    pub fn unlock_instant_delivery(&mut self) {
        self.instant_delivery = true;
    }

    pub fn has_instant_delivery(&self) -> bool {
        self.instant_delivery
    }

    /// Double skill experience for `hours` simulated hours.
    pub fn unlock_double_experience(&mut self, hours: f32) {
        if hours.is_finite() && hours > 0.0 {
            self.double_experience_remaining = f64::from(hours) * 3_600.0;
        }
    }

    pub fn has_double_experience(&self) -> bool {
        self.double_experience_remaining > 0.0
    }

    /// Multiplier for skill experience while the boost runs, else 1.
    pub fn experience_multiplier(&self) -> f32 {
        if self.has_double_experience() {
            self.cfg.double_experience_multiplier.max(1.0)
        } else {
            1.0
        }
    }

    /// Count boosts down by `dt` seconds and expire the finished ones.
    pub fn tick(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        if self.discount_remaining > 0.0 {
            self.discount_remaining -= dt;
            if self.discount_remaining <= 0.0 {
                self.discount_remaining = 0.0;
                self.discount = 0.0;
                self.outbox.push(Notification::BoostExpired {
                    boost: "discount".into(),
                });
            }
        }
        if self.double_experience_remaining > 0.0 {
            self.double_experience_remaining -= dt;
            if self.double_experience_remaining <= 0.0 {
                self.double_experience_remaining = 0.0;
                self.outbox.push(Notification::BoostExpired {
                    boost: "double_experience".into(),
                });
            }
        }
    }

    /// Write currency, cosmetics and permanent unlocks into `prefs`.
    pub fn store(&self, prefs: &mut Preferences) {
        prefs.set(CURRENCY_KEY, f64::from(self.premium_currency));
        prefs.set(INSTANT_DELIVERY_KEY, if self.instant_delivery { 1.0 } else { 0.0 });
        for id in &self.unlocked {
            prefs.set(format!("{COSMETIC_PREFIX}{id}"), 1.0);
        }
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::Catalog;

    fn shop() -> Monetization {
        Monetization::new(
            Catalog::builtin().cosmetics,
            MonetizationConfig::default(),
            &Preferences::default(),
        )
    }

    #[test]
    fn ad_grants_currency_and_timed_discount() {
        let mut m = shop();
        m.watch_rewarded_ad();
        assert_eq!(m.premium_currency(), 10);
        assert!((m.current_discount() - 0.2).abs() < 1e-6);
        m.tick(7_199.0);
        assert!(m.current_discount() > 0.0);
        m.tick(1.0);
        assert_eq!(m.current_discount(), 0.0);
        let expired = m
            .drain_notifications()
            .into_iter()
            .filter(|n| matches!(n, Notification::BoostExpired { .. }))
            .count();
        assert_eq!(expired, 1);
    }

    #[test]
    fn cosmetic_purchase_rules() {
        let mut m = shop();
        assert!(matches!(m.purchase_cosmetic("gold_toilet"), Err(SimError::UnknownEntity(_))));
        m.purchase_premium_currency(60);
        assert!(matches!(
            m.purchase_cosmetic("neon_sign"),
            Err(SimError::InsufficientFunds { needed: 100, available: 60 })
        ));
        m.purchase_cosmetic("luxury_chair").unwrap();
        assert_eq!(m.premium_currency(), 10);
        assert!(matches!(m.purchase_cosmetic("luxury_chair"), Err(SimError::Ineligible(_))));
        assert_eq!(m.unlocked_cosmetics().count(), 1);
        assert_eq!(m.available_cosmetics().count(), 4);
    }

    #[test]
    fn double_experience_runs_for_its_hours() {
        let mut m = shop();
        assert_eq!(m.experience_multiplier(), 1.0);
        m.unlock_double_experience(2.0);
        assert_eq!(m.experience_multiplier(), 2.0);
        m.tick(3_600.0);
        assert!(m.has_double_experience());
        m.tick(3_600.0);
        assert!(!m.has_double_experience());
        assert_eq!(m.experience_multiplier(), 1.0);
    }

    #[test]
    fn purchases_survive_through_preferences() {
        let mut m = shop();
        m.purchase_premium_currency(300);
        m.purchase_cosmetic("diamond_watch").unwrap();
        m.unlock_instant_delivery();
        m.unlock_double_experience(1.0);
        let mut prefs = Preferences::default();
        m.store(&mut prefs);

        let back = Monetization::new(Catalog::builtin().cosmetics, MonetizationConfig::default(), &prefs);
        assert_eq!(back.premium_currency(), 100);
        assert!(back.has_instant_delivery());
        assert!(!back.has_double_experience());
        let owned: Vec<&str> = back.unlocked_cosmetics().map(|c| c.id.as_str()).collect();
        assert_eq!(owned, vec!["diamond_watch"]);
    }
}
