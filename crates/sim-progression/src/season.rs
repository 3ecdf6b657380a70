//! Seasonal battle pass.
//!
//! Seasons rotate every `length_days` simulated days. Each season carries a
//! fresh tier track; experience earned from actions advances tiers and the
//! free (and, with the premium pass, premium) reward of every reached tier
//! is claimed automatically.

use serde::{Deserialize, Serialize};
use sim_core::{Notification, Outbox, Season, SeasonConfig};
use std::collections::BTreeSet;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonPass {
    cfg: SeasonConfig,
    season: Season,
    day_in_season: u32,
    tier: u32,
    experience: u32,
    experience_to_next: u32,
    premium: bool,
    claimed_free: BTreeSet<u32>,
    claimed_premium: BTreeSet<u32>,
}

impl SeasonPass {
    pub fn new(cfg: SeasonConfig) -> Self {
        let experience_to_next = cfg.base_xp_to_next;
        Self {
            cfg,
            season: Season::Spring,
            day_in_season: 0,
            tier: 1,
            experience: 0,
            experience_to_next,
            premium: false,
            claimed_free: BTreeSet::new(),
            claimed_premium: BTreeSet::new(),
        }
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn tier(&self) -> u32 {
        self.tier
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    pub fn experience_to_next(&self) -> u32 {
        self.experience_to_next
    }

    pub fn has_premium(&self) -> bool {
        self.premium
    }

    pub fn days_remaining(&self) -> u32 {
        self.cfg.length_days.saturating_sub(self.day_in_season)
    }

    pub fn is_claimed(&self, tier: u32, premium: bool) -> bool {
        if premium {
            self.claimed_premium.contains(&tier)
        } else {
            self.claimed_free.contains(&tier)
        }
    }

    pub fn demand_multiplier(&self) -> f32 {
        self.season.profile().demand_multiplier
    }

    pub fn experience_multiplier(&self) -> f32 {
        self.season.profile().experience_multiplier
    }

    /// Count one simulated day; rolls into the next season when the current
    /// one runs out.
    pub fn on_day(&mut self, outbox: &mut Outbox) {
        self.day_in_season += 1;
        if self.day_in_season >= self.cfg.length_days.max(1) {
            self.start_season(self.season.next(), outbox);
        }
    }

    fn start_season(&mut self, season: Season, outbox: &mut Outbox) {
        self.season = season;
        self.day_in_season = 0;
        self.tier = 1;
        self.experience = 0;
        self.experience_to_next = self.cfg.base_xp_to_next;
        self.claimed_free.clear();
        self.claimed_premium.clear();
        info!(season = self.season.profile().name, "season started");
        outbox.push(Notification::SeasonStarted { season });
    }

    /// Add pass experience (doubled with premium) and advance tiers.
    /// Returns the number of tiers gained.
    pub fn gain_experience(&mut self, amount: u32, outbox: &mut Outbox) -> u32 {
        if self.tier >= self.cfg.max_tier {
            return 0;
        }
        let amount = if self.premium { amount.saturating_mul(2) } else { amount };
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.tier < self.cfg.max_tier && self.experience >= self.experience_to_next {
            self.experience -= self.experience_to_next;
            self.tier += 1;
            self.experience_to_next = self.experience_to_next.saturating_add(self.cfg.xp_step);
            gained += 1;
            outbox.push(Notification::TierAdvanced { tier: self.tier });
            self.claim(self.tier, false, outbox);
            if self.premium {
                self.claim(self.tier, true, outbox);
            }
        }
        if self.tier >= self.cfg.max_tier {
            self.experience = 0;
        }
        gained
    }

    /// Experience for one rewarded action (a sale, a purchase).
    pub fn record_action(&mut self, outbox: &mut Outbox) -> u32 {
        self.gain_experience(self.cfg.xp_per_action, outbox)
    }

    /// Unlock the premium track and claim its rewards up to the current
    /// tier. Returns false when premium was already owned.
    pub fn purchase_premium(&mut self, outbox: &mut Outbox) -> bool {
        if self.premium {
            return false;
        }
        self.premium = true;
        for tier in 1..=self.tier {
            self.claim(tier, true, outbox);
        }
        true
    }

    fn claim(&mut self, tier: u32, premium: bool, outbox: &mut Outbox) {
        let set = if premium {
            &mut self.claimed_premium
        } else {
            &mut self.claimed_free
        };
        if set.insert(tier) {
            outbox.push(Notification::RewardClaimed { tier, premium });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass() -> SeasonPass {
        SeasonPass::new(SeasonConfig::default())
    }

    #[test]
    fn tiers_cost_more_each_step() {
        let mut p = pass();
        let mut out = Outbox::default();
        assert_eq!(p.gain_experience(100, &mut out), 1);
        assert_eq!(p.tier(), 2);
        assert_eq!(p.experience_to_next(), 150);
        assert_eq!(p.gain_experience(149, &mut out), 0);
        assert_eq!(p.gain_experience(1, &mut out), 1);
        assert!(p.is_claimed(2, false) && p.is_claimed(3, false));
        assert!(!p.is_claimed(2, true));
    }

    #[test]
    fn premium_doubles_and_backfills() {
        let mut p = pass();
        let mut out = Outbox::default();
        p.gain_experience(100, &mut out);
        assert!(p.purchase_premium(&mut out));
        assert!(!p.purchase_premium(&mut out));
        assert!(p.is_claimed(1, true) && p.is_claimed(2, true));
        p.gain_experience(75, &mut out);
        assert_eq!(p.tier(), 3);
        assert!(p.is_claimed(3, true));
    }

    #[test]
    fn tier_is_capped() {
        let mut p = pass();
        let mut out = Outbox::default();
        p.gain_experience(u32::MAX, &mut out);
        assert_eq!(p.tier(), SeasonConfig::default().max_tier);
        assert_eq!(p.gain_experience(1_000, &mut out), 0);
    }

    #[test]
    fn season_rolls_over_and_resets_track() {
        let mut p = pass();
        let mut out = Outbox::default();
        p.gain_experience(300, &mut out);
        for _ in 0..30 {
            p.on_day(&mut out);
        }
        assert_eq!(p.season(), Season::Summer);
        assert_eq!(p.tier(), 1);
        assert!(!p.is_claimed(2, false));
        assert!(out
            .drain()
            .contains(&Notification::SeasonStarted { season: Season::Summer }));
    }
}
