//! Prestige: a voluntary soft reset in exchange for permanent bonuses.
//!
//! Claimed bonuses live in [`Preferences`] under
//! `prestige.<slug>.<field>` so they survive independently of the save
//! file. Nothing here applies them; callers read [`PrestigeModifiers`]
//! at initialisation.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{GameStats, Notification, Outbox, Preferences, PrestigeBonus, PrestigeConfig};
use std::collections::BTreeSet;
use tracing::info;

const PREFIX: &str = "prestige.";
const LEVEL_KEY: &str = "prestige_level";

/// Aggregate of every claimed bonus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrestigeModifiers {
    pub money_multiplier: f32,
    pub experience_multiplier: f32,
    pub reputation_multiplier: f32,
    pub starting_money_bonus: i64,
    /// Slugs of claimed bonuses that unlock a feature.
    pub features: Vec<String>,
}

impl Default for PrestigeModifiers {
    fn default() -> Self {
        Self {
            money_multiplier: 1.0,
            experience_multiplier: 1.0,
            reputation_multiplier: 1.0,
            starting_money_bonus: 0,
            features: Vec::new(),
        }
    }
}

impl PrestigeModifiers {
    /// Multiply the multipliers and sum the money bonuses of every claimed
    /// bonus found in `prefs`.
    pub fn from_preferences(prefs: &Preferences) -> Self {
        let mut m = PrestigeModifiers::default();
        for (key, value) in prefs.with_prefix(PREFIX) {
            let Some((slug, field)) = key[PREFIX.len()..].rsplit_once('.') else {
                continue;
            };
            match field {
                "money_mult" => m.money_multiplier *= value as f32,
                "exp_mult" => m.experience_multiplier *= value as f32,
                "rep_mult" => m.reputation_multiplier *= value as f32,
                "start_money" => m.starting_money_bonus += value.round() as i64,
                "feature" if value != 0.0 => m.features.push(slug.to_string()),
                _ => {}
            }
        }
        m
    }

    pub fn has_feature(&self, slug: &str) -> bool {
        self.features.iter().any(|f| f == slug)
    }
}

/// Slugs of bonuses already stored in `prefs`.
pub fn claimed_slugs(prefs: &Preferences) -> BTreeSet<String> {
    prefs
        .with_prefix(PREFIX)
        .filter_map(|(k, _)| k[PREFIX.len()..].rsplit_once('.').map(|(slug, _)| slug.to_string()))
        .collect()
}

/// Persist one bonus into `prefs`.
pub fn store_bonus(prefs: &mut Preferences, bonus: &PrestigeBonus) {
    let slug = bonus.slug();
    prefs.set(format!("{PREFIX}{slug}.money_mult"), f64::from(bonus.money_multiplier));
    prefs.set(format!("{PREFIX}{slug}.exp_mult"), f64::from(bonus.experience_multiplier));
    prefs.set(format!("{PREFIX}{slug}.rep_mult"), f64::from(bonus.reputation_multiplier));
    prefs.set(format!("{PREFIX}{slug}.start_money"), bonus.starting_money_bonus as f64);
    prefs.set(
        format!("{PREFIX}{slug}.feature"),
        if bonus.unlock_feature { 1.0 } else { 0.0 },
    );
}

/// Prestige level stored in `prefs`.
pub fn stored_level(prefs: &Preferences) -> u32 {
    prefs.get_or(LEVEL_KEY, 0.0).max(0.0) as u32
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prestige {
    cfg: PrestigeConfig,
    bonuses: Vec<PrestigeBonus>,
    unlocked: bool,
    level: u32,
}

impl Prestige {
    pub fn new(cfg: PrestigeConfig, bonuses: Vec<PrestigeBonus>) -> Self {
        Self {
            cfg,
            bonuses,
            unlocked: false,
            level: 0,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    pub fn bonuses(&self) -> &[PrestigeBonus] {
        &self.bonuses
    }

    /// Whether the unlock thresholds hold for `stats`.
    pub fn requirements_met(&self, stats: &GameStats) -> bool {
        stats.net_worth >= self.cfg.net_worth_threshold
            && stats.aspirations_completed >= self.cfg.aspirations_required
    }

    /// Latch the unlock flag the first time the thresholds hold.
    pub fn check_unlock(&mut self, stats: &GameStats, outbox: &mut Outbox) -> bool {
        if !self.unlocked && self.requirements_met(stats) {
            self.unlocked = true;
            info!(net_worth = stats.net_worth, "prestige unlocked");
            outbox.push(Notification::PrestigeUnlocked);
        }
        self.unlocked
    }

    /// Pick up to `bonuses_per_prestige` distinct unclaimed bonuses, store
    /// them, bump the level and re-lock until the thresholds hold again.
    pub fn grant<R: Rng + ?Sized>(&mut self, prefs: &mut Preferences, rng: &mut R) -> Vec<PrestigeBonus> {
        let claimed = claimed_slugs(prefs);
        let pool: Vec<&PrestigeBonus> = self
            .bonuses
            .iter()
            .filter(|b| !claimed.contains(&b.slug()))
            .collect();
        let picked: Vec<PrestigeBonus> = pool
            .choose_multiple(rng, self.cfg.bonuses_per_prestige)
            .map(|b| (*b).clone())
            .collect();
        for b in &picked {
            store_bonus(prefs, b);
        }
        self.level += 1;
        self.unlocked = false;
        prefs.set(LEVEL_KEY, f64::from(self.level));
        picked
    }
}
