//! Personal needs that drain over time and are topped up by actions.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use sim_core::{clamp_score, NeedsConfig, Notification, Outbox};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Full level of every need.
pub const FULL: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NeedKind {
    Energy,
    Hunger,
    Social,
    Hygiene,
}

impl NeedKind {
    pub const ALL: [NeedKind; 4] = [NeedKind::Energy, NeedKind::Hunger, NeedKind::Social, NeedKind::Hygiene];

    fn decay(self, cfg: &NeedsConfig) -> f32 {
        match self {
            NeedKind::Energy => cfg.energy_decay,
            NeedKind::Hunger => cfg.hunger_decay,
            NeedKind::Social => cfg.social_decay,
            NeedKind::Hygiene => cfg.hygiene_decay,
        }
    }
}

/// Energy, hunger, social and hygiene levels in `[0, 100]`.
///
/// Levels fall by a fixed step every decay interval. Crossing into or out
/// of the critical band emits one notification per transition.
#[derive(Clone, Debug, Resource)]
pub struct PlayerNeeds {
    levels: BTreeMap<NeedKind, f32>,
    cfg: NeedsConfig,
    since_decay: f64,
    critical: bool,
    outbox: Outbox,
}

impl PlayerNeeds {
    pub fn new(cfg: NeedsConfig) -> Self {
        Self {
            levels: NeedKind::ALL.iter().map(|k| (*k, FULL)).collect(),
            cfg,
            since_decay: 0.0,
            critical: false,
            outbox: Outbox::default(),
        }
    }

    pub fn level(&self, kind: NeedKind) -> f32 {
        self.levels.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Advance the decay timer by `dt` seconds. Returns the decay steps applied.
    pub fn tick(&mut self, dt: f64) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        let interval = self.cfg.decay_interval_secs.max(1.0);
        self.since_decay += dt;
        let mut steps = 0;
        while self.since_decay >= interval {
            self.since_decay -= interval;
            steps += 1;
            for kind in NeedKind::ALL {
                let step = kind.decay(&self.cfg);
                if let Some(level) = self.levels.get_mut(&kind) {
                    *level = clamp_score(*level - step);
                }
            }
            self.update_critical();
        }
        if steps > 0 {
            debug!(steps, energy = self.level(NeedKind::Energy), "needs decayed");
        }
        steps
    }

    /// Raise `kind` by `amount`, capped at full. Returns the points gained.
    pub fn restore(&mut self, kind: NeedKind, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let level = self.levels.entry(kind).or_insert(0.0);
        let before = *level;
        *level = clamp_score(before + amount);
        let gained = *level - before;
        self.update_critical();
        gained
    }

    pub fn eat(&mut self, amount: f32) -> f32 {
        self.restore(NeedKind::Hunger, amount)
    }

    pub fn sleep(&mut self, amount: f32) -> f32 {
        self.restore(NeedKind::Energy, amount)
    }

    pub fn socialize(&mut self, amount: f32) -> f32 {
        self.restore(NeedKind::Social, amount)
    }

    pub fn clean(&mut self, amount: f32) -> f32 {
        self.restore(NeedKind::Hygiene, amount)
    }

    /// Energy-driven pace in `[0.5, 1.0]`.
    pub fn energy_multiplier(&self) -> f32 {
        0.5 + 0.5 * (self.level(NeedKind::Energy) / FULL)
    }

    fn update_critical(&mut self) {
        let threshold = self.cfg.critical_threshold;
        let now = self.levels.values().any(|l| *l <= threshold);
        if now == self.critical {
            return;
        }
        self.critical = now;
        if now {
            info!("player needs critical");
            self.outbox.push(Notification::NeedsCritical);
        } else {
            info!("player needs restored");
            self.outbox.push(Notification::NeedsRestored);
        }
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decays_once_per_interval() {
        let mut needs = PlayerNeeds::new(NeedsConfig::default());
        assert_eq!(needs.tick(59.0), 0);
        assert_eq!(needs.level(NeedKind::Energy), FULL);
        assert_eq!(needs.tick(1.0), 1);
        assert_eq!(needs.level(NeedKind::Energy), 95.0);
        assert_eq!(needs.level(NeedKind::Hunger), 97.0);
        assert_eq!(needs.level(NeedKind::Social), 98.0);
        assert_eq!(needs.level(NeedKind::Hygiene), 96.0);
        assert_eq!(needs.tick(180.0), 3);
        assert_eq!(needs.level(NeedKind::Energy), 80.0);
    }

    #[test]
    fn critical_and_restored_fire_once_each() {
        let mut needs = PlayerNeeds::new(NeedsConfig::default());
        // 16 steps: energy 20, at the threshold
        needs.tick(60.0 * 16.0);
        assert!(needs.is_critical());
        needs.tick(60.0 * 4.0);
        needs.sleep(50.0);
        needs.clean(80.0);
        assert!(!needs.is_critical());
        assert_eq!(
            needs.drain_notifications(),
            vec![Notification::NeedsCritical, Notification::NeedsRestored]
        );
    }

    #[test]
    fn restore_caps_at_full() {
        let mut needs = PlayerNeeds::new(NeedsConfig::default());
        needs.tick(60.0);
        assert_eq!(needs.eat(10.0), 3.0);
        assert_eq!(needs.level(NeedKind::Hunger), FULL);
        assert_eq!(needs.socialize(f32::NAN), 0.0);
        assert_eq!(needs.sleep(-5.0), 0.0);
    }

    #[test]
    fn tired_player_slows_down() {
        let mut needs = PlayerNeeds::new(NeedsConfig::default());
        assert_eq!(needs.energy_multiplier(), 1.0);
        needs.tick(60.0 * 40.0);
        assert_eq!(needs.level(NeedKind::Energy), 0.0);
        assert_eq!(needs.energy_multiplier(), 0.5);
    }

    proptest! {
        #[test]
        fn levels_stay_bounded(steps in proptest::collection::vec((0u8..5, 0.0f32..200.0), 0..64)) {
            let mut needs = PlayerNeeds::new(NeedsConfig::default());
            for (op, amount) in steps {
                match op {
                    0 => { needs.tick(f64::from(amount) * 10.0); }
                    1 => { needs.eat(amount); }
                    2 => { needs.sleep(amount); }
                    3 => { needs.socialize(amount); }
                    _ => { needs.clean(amount); }
                }
                for kind in NeedKind::ALL {
                    prop_assert!((0.0..=FULL).contains(&needs.level(kind)));
                }
            }
        }
    }
}
