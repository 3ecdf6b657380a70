//! Timed store events: opportunities, crises and seasonal surges.
//!
//! Each template is either inactive or has exactly one active instance.
//! Triggering applies the money and reputation effects once; expiry
//! reverses what was actually applied so the pair is self-inverse.
//! Costs are the exception: a crisis cost is paid once and stays paid.

use crate::customers::CustomerFlow;
use bevy_ecs::prelude::Resource;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{clamp_chance, secs_to_days, EventConfig, EventTemplate, Notification, Outbox, SimError, SimResult};
use sim_econ::Ledger;
use tracing::{debug, info};

/// Live instance of an event template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub id: String,
    /// Simulated days until expiry.
    pub time_remaining: f32,
    /// Reward credited at trigger, clawed back at expiry.
    pub reward_paid: i64,
    /// Cost debited at trigger; never refunded.
    pub cost_paid: i64,
    /// Reputation change applied at trigger, reversed at expiry.
    pub reputation_applied: f32,
}

#[derive(Debug, Resource)]
pub struct EventEngine {
    templates: Vec<EventTemplate>,
    active: Vec<ActiveEvent>,
    max_concurrent: usize,
    spawn_chance_per_day: f64,
    outbox: Outbox,
}

impl EventEngine {
    pub fn new(templates: Vec<EventTemplate>, cfg: &EventConfig) -> Self {
        Self {
            templates,
            active: Vec::new(),
            max_concurrent: cfg.max_concurrent_events,
            spawn_chance_per_day: cfg.spawn_chance_per_day.max(0.0),
            outbox: Outbox::default(),
        }
    }

    pub fn templates(&self) -> &[EventTemplate] {
        &self.templates
    }

    pub fn active_events(&self) -> &[ActiveEvent] {
        &self.active
    }

    pub fn is_event_active(&self, id: &str) -> bool {
        self.active.iter().any(|a| a.id == id)
    }

    fn template(&self, id: &str) -> Option<&EventTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    fn eligible(&self, t: &EventTemplate, cash: i64, reputation: f32) -> bool {
        !self.is_event_active(&t.id) && cash >= t.min_net_worth && reputation >= t.min_reputation
    }

    /// Ids of templates that could fire right now.
    pub fn eligible_events(&self, ledger: &Ledger, customers: &CustomerFlow) -> Vec<&str> {
        self.templates
            .iter()
            .filter(|t| self.eligible(t, ledger.cash(), customers.reputation()))
            .map(|t| t.id.as_str())
            .collect()
    }

    /// Fire a uniformly chosen eligible event, unless the active set is full.
    pub fn try_trigger_random<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut Ledger,
        customers: &mut CustomerFlow,
        rng: &mut R,
    ) -> Option<String> {
        if self.active.len() >= self.max_concurrent {
            return None;
        }
        let pick = self
            .eligible_events(ledger, customers)
            .choose(rng)
            .map(|id| id.to_string())?;
        self.trigger_event(&pick, ledger, customers).ok()?;
        Some(pick)
    }

    /// Activate template `id` and apply its effects once.
    pub fn trigger_event(
        &mut self,
        id: &str,
        ledger: &mut Ledger,
        customers: &mut CustomerFlow,
    ) -> SimResult<()> {
        let t = self
            .template(id)
            .cloned()
            .ok_or_else(|| SimError::unknown(format!("event {id}")))?;
        if self.is_event_active(id) {
            return Err(SimError::ineligible(format!("{id} is already active")));
        }
        if self.active.len() >= self.max_concurrent {
            return Err(SimError::CapacityExceeded(format!(
                "{} events already active",
                self.active.len()
            )));
        }
        let reward_paid = if t.money_reward > 0 {
            ledger.add_money(t.money_reward)
        } else {
            0
        };
        let cost_paid = ledger.debit_up_to(t.money_cost);
        let reputation_applied = customers.adjust_reputation(t.reputation_change);
        info!(event = %t.id, reward_paid, cost_paid, reputation_applied, "event triggered");
        self.active.push(ActiveEvent {
            id: t.id.clone(),
            time_remaining: t.duration_days,
            reward_paid,
            cost_paid,
            reputation_applied,
        });
        self.outbox.push(Notification::EventTriggered { id: t.id });
        Ok(())
    }

    /// Age active events by `dt` seconds, reverse and drop the expired ones,
    /// then roll for a new random event. Returns the expired ids.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        ledger: &mut Ledger,
        customers: &mut CustomerFlow,
        rng: &mut R,
    ) -> Vec<String> {
        if !dt.is_finite() || dt <= 0.0 {
            return Vec::new();
        }
        let days = secs_to_days(dt) as f32;
        let mut expired = Vec::new();
        let mut still_active = Vec::with_capacity(self.active.len());
        for mut ev in self.active.drain(..) {
            ev.time_remaining -= days;
            if ev.time_remaining <= 0.0 {
                expired.push(ev);
            } else {
                still_active.push(ev);
            }
        }
        self.active = still_active;

        let mut ids = Vec::with_capacity(expired.len());
        for ev in expired {
            if ev.reward_paid > 0 {
                ledger.add_money(-ev.reward_paid);
            }
            customers.adjust_reputation(-ev.reputation_applied);
            info!(event = %ev.id, "event expired");
            self.outbox.push(Notification::EventExpired { id: ev.id.clone() });
            ids.push(ev.id);
        }

        let chance = clamp_chance(self.spawn_chance_per_day * secs_to_days(dt));
        if chance > 0.0 && rng.gen_bool(chance) {
            match self.try_trigger_random(ledger, customers, rng) {
                Some(id) => debug!(event = %id, "random event fired"),
                None => debug!("random event roll found nothing eligible"),
            }
        }
        ids
    }

    /// Product of the demand multipliers of every active event.
    pub fn demand_multiplier(&self) -> f32 {
        self.active
            .iter()
            .filter_map(|a| self.template(&a.id))
            .map(|t| t.demand_multiplier)
            .product()
    }

    /// Product of the price multipliers of every active event.
    pub fn price_multiplier(&self) -> f32 {
        self.active
            .iter()
            .filter_map(|a| self.template(&a.id))
            .map(|t| t.price_multiplier)
            .product()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sim_core::{Catalog, CustomerConfig, EventKind, SECONDS_PER_DAY};

    fn windfall() -> EventTemplate {
        EventTemplate {
            id: "windfall".into(),
            title: "Windfall".into(),
            description: String::new(),
            kind: EventKind::Random,
            duration_days: 2.0,
            demand_multiplier: 1.5,
            price_multiplier: 1.0,
            reputation_change: 5.0,
            money_reward: 500,
            money_cost: 0,
            min_net_worth: 0,
            min_reputation: 0.0,
        }
    }

    fn setup(templates: Vec<EventTemplate>, max: usize) -> (EventEngine, Ledger, CustomerFlow) {
        let cfg = EventConfig {
            spawn_chance_per_day: 0.0,
            max_concurrent_events: max,
        };
        let customers = CustomerFlow::new(Catalog::builtin().customer_types, &CustomerConfig {
            spawn_rate_per_min: 0.0,
            reputation_decay_per_day: 0.0,
            ..CustomerConfig::default()
        });
        (EventEngine::new(templates, &cfg), Ledger::new(1_000), customers)
    }

    #[test]
    fn reward_is_reversed_on_expiry() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (mut ev, mut ledger, mut customers) = setup(vec![windfall()], 2);
        ev.trigger_event("windfall", &mut ledger, &mut customers).unwrap();
        assert_eq!(ledger.cash(), 1_500);
        assert_eq!(customers.reputation(), 55.0);
        assert!((ev.demand_multiplier() - 1.5).abs() < 1e-6);
        ev.tick(SECONDS_PER_DAY, &mut ledger, &mut customers, &mut rng);
        assert!(ev.is_event_active("windfall"));
        let expired = ev.tick(SECONDS_PER_DAY, &mut ledger, &mut customers, &mut rng);
        assert_eq!(expired, vec!["windfall".to_string()]);
        assert!(!ev.is_event_active("windfall"));
        assert_eq!(ledger.cash(), 1_000);
        assert_eq!(customers.reputation(), 50.0);
        assert_eq!(ev.demand_multiplier(), 1.0);
    }

    #[test]
    fn crisis_cost_is_charged_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (mut ev, mut ledger, mut customers) = setup(Catalog::builtin().events, 2);
        ledger.add_money(2_000);
        ev.trigger_event("freezer_breakdown", &mut ledger, &mut customers).unwrap();
        assert_eq!(ledger.cash(), 1_000);
        assert_eq!(customers.reputation(), 40.0);
        ev.tick(SECONDS_PER_DAY * 1.5, &mut ledger, &mut customers, &mut rng);
        assert!(!ev.is_event_active("freezer_breakdown"));
        assert_eq!(ledger.cash(), 1_000);
        assert_eq!(customers.reputation(), 50.0);
    }

    #[test]
    fn trigger_errors() {
        let (mut ev, mut ledger, mut customers) = setup(Catalog::builtin().events, 1);
        assert!(matches!(
            ev.trigger_event("alien_invasion", &mut ledger, &mut customers),
            Err(SimError::UnknownEntity(_))
        ));
        ev.trigger_event("city_festival", &mut ledger, &mut customers).unwrap();
        assert!(matches!(
            ev.trigger_event("city_festival", &mut ledger, &mut customers),
            Err(SimError::Ineligible(_))
        ));
        assert!(matches!(
            ev.trigger_event("supplier_delay", &mut ledger, &mut customers),
            Err(SimError::CapacityExceeded(_))
        ));
    }

    #[test]
    fn random_trigger_respects_eligibility() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let (mut ev, mut ledger, mut customers) = setup(Catalog::builtin().events, 10);
        let eligible = ev.eligible_events(&ledger, &customers);
        assert!(!eligible.contains(&"brewery_closing"));
        assert!(!eligible.contains(&"competitor_bankruptcy"));
        let fired = ev.try_trigger_random(&mut ledger, &mut customers, &mut rng).unwrap();
        assert!(ev.is_event_active(&fired));
        assert!(fired != "brewery_closing" && fired != "competitor_bankruptcy");
    }

    #[test]
    fn random_trigger_waits_for_a_free_slot() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let (mut ev, mut ledger, mut customers) = setup(Catalog::builtin().events, 1);
        ev.trigger_event("city_festival", &mut ledger, &mut customers).unwrap();
        let cash = ledger.cash();
        for _ in 0..20 {
            assert_eq!(ev.try_trigger_random(&mut ledger, &mut customers, &mut rng), None);
        }
        assert_eq!(ev.active_events().len(), 1);
        assert_eq!(ledger.cash(), cash);
        assert!(!ev.eligible_events(&ledger, &customers).is_empty());
    }

    #[test]
    fn clawback_never_overdraws() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (mut ev, mut ledger, mut customers) = setup(vec![windfall()], 2);
        ev.trigger_event("windfall", &mut ledger, &mut customers).unwrap();
        ledger.try_spend(1_200).unwrap();
        ev.tick(SECONDS_PER_DAY * 3.0, &mut ledger, &mut customers, &mut rng);
        assert_eq!(ledger.cash(), 0);
    }
}
