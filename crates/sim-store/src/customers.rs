//! Customer arrivals, checkouts and store reputation.

use bevy_ecs::prelude::Resource;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{
    clamp_score, secs_to_days, CustomerConfig, CustomerId, CustomerKind, CustomerPersonality,
    Notification, Outbox, SimError, SimResult,
};
use sim_econ::price_appeal;
use tracing::{debug, trace};

/// A shopper currently inside the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveCustomer {
    pub id: CustomerId,
    pub kind: CustomerKind,
    /// Store clock time at arrival.
    pub arrived_at_secs: f64,
    /// How long the customer browses before checking out.
    pub visit_secs: f64,
}

/// Result of a customer checking out.
#[derive(Clone, Debug, PartialEq)]
pub struct VisitOutcome {
    pub id: CustomerId,
    pub kind: CustomerKind,
    pub satisfied: bool,
    /// Amount spent; zero when unsatisfied.
    pub spend: i64,
}

#[derive(Debug, Resource)]
pub struct CustomerFlow {
    templates: Vec<CustomerPersonality>,
    active: Vec<ActiveCustomer>,
    reputation: f32,
    cleanliness: f32,
    stock: f32,
    price_level: f32,
    spawn_interval_secs: Option<f64>,
    spawn_timer: f64,
    max_customers: usize,
    decay_per_day: f32,
    base_visit_secs: f64,
    elapsed_secs: f64,
    next_id: u64,
    customers_served: u64,
    outbox: Outbox,
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

impl CustomerFlow {
    pub fn new(templates: Vec<CustomerPersonality>, cfg: &CustomerConfig) -> Self {
        let spawn_interval_secs = (cfg.spawn_rate_per_min.is_finite() && cfg.spawn_rate_per_min > 0.0)
            .then(|| 60.0 / f64::from(cfg.spawn_rate_per_min));
        Self {
            templates,
            active: Vec::new(),
            reputation: clamp_score(cfg.starting_reputation),
            cleanliness: clamp_score(cfg.starting_cleanliness),
            stock: clamp_score(cfg.starting_stock),
            price_level: sanitize_price(cfg.price_level),
            spawn_interval_secs,
            spawn_timer: 0.0,
            max_customers: cfg.max_customers_in_store,
            decay_per_day: cfg.reputation_decay_per_day.max(0.0),
            base_visit_secs: cfg.base_visit_secs.max(0.0),
            elapsed_secs: 0.0,
            next_id: 1,
            customers_served: 0,
            outbox: Outbox::default(),
        }
    }

    pub fn reputation(&self) -> f32 {
        self.reputation
    }

    pub fn cleanliness(&self) -> f32 {
        self.cleanliness
    }

    pub fn stock_level(&self) -> f32 {
        self.stock
    }

    pub fn price_level(&self) -> f32 {
        self.price_level
    }

    pub fn active_customers(&self) -> &[ActiveCustomer] {
        &self.active
    }

    /// Customers that left satisfied since the store opened.
    pub fn customers_served(&self) -> u64 {
        self.customers_served
    }

    /// Store conditions drive spawn probability and satisfaction.
    pub fn update_store_conditions(&mut self, cleanliness: f32, stock: f32, price_level: f32) {
        self.cleanliness = clamp_score(cleanliness);
        self.stock = clamp_score(stock);
        self.price_level = sanitize_price(price_level);
    }

    /// Raise the stock level after a delivery; one unit per item.
    pub fn restock(&mut self, quantity: u32) {
        self.stock = clamp_score(self.stock + quantity as f32);
    }

    /// Nudge reputation by `delta`, clamped to `[0, 100]`. Returns the
    /// change actually applied.
    pub fn adjust_reputation(&mut self, delta: f32) -> f32 {
        if !delta.is_finite() || delta == 0.0 {
            return 0.0;
        }
        let before = self.reputation;
        self.reputation = clamp_score(before + delta);
        let applied = self.reputation - before;
        if applied != 0.0 {
            self.outbox.push(Notification::ReputationChanged {
                reputation: self.reputation,
            });
        }
        applied
    }

    /// Advance the store clock: decay reputation and run due spawn checks.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.elapsed_secs += dt;
        let decay = self.decay_per_day * secs_to_days(dt) as f32;
        self.reputation = clamp_score(self.reputation - decay);

        let Some(interval) = self.spawn_interval_secs else {
            return;
        };
        self.spawn_timer += dt;
        while self.spawn_timer >= interval {
            self.spawn_timer -= interval;
            if let Err(e) = self.spawn_customer(rng) {
                trace!(error = %e, "no customer this check");
            }
        }
    }

    /// One spawn check: roll against store attractiveness and, on success,
    /// admit a customer of a reputation-weighted archetype.
    pub fn spawn_customer<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SimResult<CustomerId> {
        if self.active.len() >= self.max_customers {
            return Err(SimError::CapacityExceeded("store is full".into()));
        }
        if self.templates.is_empty() {
            return Err(SimError::ineligible("no customer archetypes"));
        }
        let chance = self.spawn_chance();
        if rng.gen::<f32>() >= chance {
            return Err(SimError::StochasticFailure("nobody walked in".into()));
        }
        let kind = self.pick_kind(rng.gen());
        let template = self
            .templates
            .iter()
            .find(|t| t.kind == kind)
            .unwrap_or(&self.templates[0]);
        let id = CustomerId(self.next_id);
        self.next_id += 1;
        let customer = ActiveCustomer {
            id,
            kind: template.kind,
            arrived_at_secs: self.elapsed_secs,
            visit_secs: f64::from(template.patience.max(0.0)) * self.base_visit_secs,
        };
        debug!(id = id.0, kind = ?customer.kind, "customer arrived");
        self.outbox.push(Notification::CustomerSpawned {
            id,
            kind: customer.kind,
        });
        self.active.push(customer);
        Ok(id)
    }

    /// Probability that a spawn check admits a customer.
    pub fn spawn_chance(&self) -> f32 {
        let attractiveness = (self.cleanliness + self.stock) / 200.0;
        attractiveness * lerp(0.5, 1.5, self.reputation / 100.0)
    }

    /// Map a uniform roll to an archetype; better reputation draws fewer
    /// bargain hunters.
    pub fn pick_kind(&self, roll: f32) -> CustomerKind {
        let f = self.reputation / 100.0;
        if roll < 0.2 - f * 0.1 {
            CustomerKind::BargainHunter
        } else if roll < 0.4 - f * 0.05 {
            CustomerKind::ImpatientCustomer
        } else if roll < 0.6 + f * 0.1 {
            CustomerKind::ImpulseBuyer
        } else {
            CustomerKind::WealthyShopper
        }
    }

    /// Remove customer `id`; a satisfied visit adds the archetype's impact
    /// to reputation, an unsatisfied one subtracts twice that.
    pub fn customer_leaves(&mut self, id: CustomerId, satisfied: bool) -> SimResult<()> {
        let pos = self
            .active
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| SimError::unknown(format!("customer {}", id.0)))?;
        let customer = self.active.remove(pos);
        let impact = self
            .templates
            .iter()
            .find(|t| t.kind == customer.kind)
            .map(|t| t.reputation_impact)
            .unwrap_or(1.0);
        let delta = if satisfied { impact } else { -2.0 * impact };
        self.reputation = clamp_score(self.reputation + delta);
        if satisfied {
            self.customers_served += 1;
        }
        self.outbox.push(Notification::CustomerDeparted { id, satisfied });
        self.outbox.push(Notification::ReputationChanged {
            reputation: self.reputation,
        });
        Ok(())
    }

    /// Check out every customer whose visit has run its course.
    ///
    /// Satisfaction chance is the store attractiveness scaled by how the
    /// archetype judges the price level; a satisfied customer spends
    /// `average_spend * price_level * demand` and takes one unit of stock.
    pub fn resolve_visits<R: Rng + ?Sized>(&mut self, demand: f32, rng: &mut R) -> Vec<VisitOutcome> {
        let now = self.elapsed_secs;
        let due: Vec<(CustomerId, CustomerKind)> = self
            .active
            .iter()
            .filter(|c| now - c.arrived_at_secs >= c.visit_secs)
            .map(|c| (c.id, c.kind))
            .collect();
        let mut outcomes = Vec::with_capacity(due.len());
        for (id, kind) in due {
            let (sensitivity, average_spend) = self
                .templates
                .iter()
                .find(|t| t.kind == kind)
                .map(|t| (t.price_sensitivity, t.average_spend))
                .unwrap_or((1.0, 0.0));
            let chance = ((self.cleanliness + self.stock) / 200.0) * price_appeal(self.price_level, sensitivity);
            let satisfied = self.stock >= 1.0 && rng.gen::<f32>() < chance;
            let spend = if satisfied {
                let raw = average_spend * self.price_level * demand.max(0.0);
                if raw.is_finite() {
                    raw.round() as i64
                } else {
                    0
                }
            } else {
                0
            };
            if satisfied {
                self.stock = clamp_score(self.stock - 1.0);
            }
            if self.customer_leaves(id, satisfied).is_ok() {
                outcomes.push(VisitOutcome {
                    id,
                    kind,
                    satisfied,
                    spend,
                });
            }
        }
        outcomes
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain()
    }
}

fn sanitize_price(p: f32) -> f32 {
    if p.is_finite() && p > 0.0 {
        p
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sim_core::Catalog;

    fn flow(cfg: CustomerConfig) -> CustomerFlow {
        CustomerFlow::new(Catalog::builtin().customer_types, &cfg)
    }

    fn perfect_store() -> CustomerConfig {
        CustomerConfig {
            starting_cleanliness: 100.0,
            starting_stock: 100.0,
            starting_reputation: 100.0,
            ..CustomerConfig::default()
        }
    }

    #[test]
    fn perfect_store_always_admits_until_full() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut f = flow(CustomerConfig {
            max_customers_in_store: 3,
            ..perfect_store()
        });
        assert!((f.spawn_chance() - 1.5).abs() < 1e-6);
        for _ in 0..3 {
            f.spawn_customer(&mut rng).unwrap();
        }
        assert!(matches!(
            f.spawn_customer(&mut rng),
            Err(SimError::CapacityExceeded(_))
        ));
    }

    #[test]
    fn spawn_timer_follows_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut f = flow(CustomerConfig {
            spawn_rate_per_min: 1.0,
            max_customers_in_store: 100,
            ..perfect_store()
        });
        f.tick(59.0, &mut rng);
        assert!(f.active_customers().is_empty());
        f.tick(1.0, &mut rng);
        assert_eq!(f.active_customers().len(), 1);
        f.tick(600.0, &mut rng);
        assert_eq!(f.active_customers().len(), 11);
    }

    #[test]
    fn departure_moves_reputation() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut f = flow(perfect_store());
        f.update_store_conditions(100.0, 100.0, 1.0);
        f.adjust_reputation(-50.0);
        let id = f.spawn_customer(&mut rng).unwrap();
        let kind = f.active_customers()[0].kind;
        let impact = Catalog::builtin()
            .customer_types
            .iter()
            .find(|t| t.kind == kind)
            .unwrap()
            .reputation_impact;
        let before = f.reputation();
        f.customer_leaves(id, false).unwrap();
        assert!((f.reputation() - (before - 2.0 * impact)).abs() < 1e-4);
        assert!(matches!(f.customer_leaves(id, true), Err(SimError::UnknownEntity(_))));
    }

    #[test]
    fn reputation_decays_per_day() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut f = flow(CustomerConfig {
            spawn_rate_per_min: 0.0,
            reputation_decay_per_day: 2.0,
            ..CustomerConfig::default()
        });
        f.tick(86_400.0, &mut rng);
        assert!((f.reputation() - 48.0).abs() < 1e-4);
    }

    #[test]
    fn high_reputation_draws_fewer_bargain_hunters() {
        let mut f = flow(CustomerConfig::default());
        f.adjust_reputation(-50.0);
        assert_eq!(f.pick_kind(0.15), CustomerKind::BargainHunter);
        f.adjust_reputation(100.0);
        assert_eq!(f.pick_kind(0.15), CustomerKind::ImpatientCustomer);
        assert_eq!(f.pick_kind(0.95), CustomerKind::WealthyShopper);
    }

    #[test]
    fn visits_resolve_with_spend() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut f = flow(perfect_store());
        f.spawn_customer(&mut rng).unwrap();
        let patience = Catalog::builtin()
            .customer_types
            .iter()
            .map(|t| t.patience)
            .fold(0.0f32, f32::max);
        f.tick(f64::from(patience) * 300.0 + 1.0, &mut rng);
        let outcomes = f.resolve_visits(1.0, &mut rng);
        assert!(!outcomes.is_empty());
        for o in &outcomes {
            if o.satisfied {
                assert!(o.spend > 0);
            } else {
                assert_eq!(o.spend, 0);
            }
        }
    }

    #[test]
    fn conditions_are_clamped() {
        let mut f = flow(CustomerConfig::default());
        f.update_store_conditions(150.0, -3.0, 0.0);
        assert_eq!(f.cleanliness(), 100.0);
        assert_eq!(f.stock_level(), 0.0);
        assert_eq!(f.price_level(), 1.0);
    }

    proptest! {
        #[test]
        fn reputation_stays_in_bounds(seed in any::<u64>(),
                                      ops in proptest::collection::vec((0u8..4, -200.0f32..200.0), 0..80)) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut f = flow(CustomerConfig { max_customers_in_store: 50, ..perfect_store() });
            for (op, x) in ops {
                match op {
                    0 => { let _ = f.spawn_customer(&mut rng); }
                    1 => {
                        if let Some(c) = f.active_customers().first().map(|c| c.id) {
                            f.customer_leaves(c, x > 0.0).unwrap();
                        }
                    }
                    2 => f.tick(f64::from(x.abs()) * 1_000.0, &mut rng),
                    _ => { f.adjust_reputation(x); }
                }
                prop_assert!((0.0..=100.0).contains(&f.reputation()));
            }
        }
    }
}
