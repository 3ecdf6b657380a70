use crate::achievements::Achievements;
use crate::aspirations::Aspirations;
use crate::challenges::DailyChallenges;
use crate::prestige::{stored_level, Prestige, PrestigeModifiers};
use crate::season::SeasonPass;
use crate::skills::{PlayerSkills, SkillKind};
use bevy_ecs::prelude::Resource;
use rand::Rng;
use sim_core::{
    Catalog, ChallengeKind, GameStats, NoScripts, Notification, Outbox, PredicateHost, Preferences,
    PrestigeBonus, SimConfig, SimError, SimResult,
};
use sim_econ::{Ledger, PropertyRegistry};
use sim_store::CustomerFlow;
use std::fmt;
use tracing::info;

/// Every reward and goal layer on top of the store economy.
///
/// The tracker reads aggregate state through [`GameStats`] and only writes
/// back through the ledger, the customer flow (reputation) and, on
/// prestige, the property registry.
#[derive(Resource)]
pub struct ProgressionTracker {
    pub achievements: Achievements,
    pub challenges: DailyChallenges,
    pub aspirations: Aspirations,
    pub prestige: Prestige,
    pub season: SeasonPass,
    pub skills: PlayerSkills,
    modifiers: PrestigeModifiers,
    /// Temporary experience multiplier, e.g. a purchased boost.
    experience_boost: f32,
    host: Box<dyn PredicateHost + Send + Sync>,
    outbox: Outbox,
}

impl fmt::Debug for ProgressionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressionTracker")
            .field("achievements", &self.achievements.unlocked_count())
            .field("aspirations_completed", &self.aspirations.completed_count())
            .field("prestige_level", &self.prestige.level())
            .field("season", &self.season.season())
            .finish_non_exhaustive()
    }
}

impl ProgressionTracker {
    pub fn new(catalog: &Catalog, cfg: &SimConfig, prefs: &Preferences) -> Self {
        let modifiers = PrestigeModifiers::from_preferences(prefs);
        let mut prestige = Prestige::new(cfg.prestige.clone(), catalog.prestige_bonuses.clone());
        prestige.set_level(stored_level(prefs));
        let mut skills = PlayerSkills::default();
        skills.set_base_multiplier(modifiers.experience_multiplier);
        Self {
            achievements: Achievements::new(catalog.achievements.clone()),
            challenges: DailyChallenges::new(catalog.challenges.clone()),
            aspirations: Aspirations::new(catalog.aspirations.clone()),
            prestige,
            season: SeasonPass::new(cfg.season.clone()),
            skills,
            modifiers,
            experience_boost: 1.0,
            host: Box::new(NoScripts),
            outbox: Outbox::default(),
        }
    }

    /// Install the engine used for scripted achievement requirements.
    pub fn set_predicate_host(&mut self, host: Box<dyn PredicateHost + Send + Sync>) {
        self.host = host;
    }

    pub fn modifiers(&self) -> &PrestigeModifiers {
        &self.modifiers
    }

    /// Fill the progression-owned fields of `stats`.
    pub fn fill_stats(&self, stats: &mut GameStats) {
        stats.skill_total = self.skills.total_level();
        stats.aspirations_completed = self.aspirations.completed_count();
        stats.prestige_level = self.prestige.level();
    }

    /// Per-tick evaluation: achievements, aspirations, then the prestige
    /// unlock check against the post-completion aspiration count.
    pub fn evaluate(&mut self, stats: &GameStats, ledger: &mut Ledger, customers: &mut CustomerFlow) {
        self.achievements
            .evaluate(stats, self.host.as_ref(), ledger, &mut self.outbox);
        self.aspirations.evaluate(
            stats,
            ledger,
            customers,
            self.modifiers.reputation_multiplier,
            &mut self.outbox,
        );
        let mut after = stats.clone();
        after.aspirations_completed = self.aspirations.completed_count();
        self.prestige.check_unlock(&after, &mut self.outbox);
    }

    pub fn report_money_earned(&mut self, amount: i64, ledger: &mut Ledger) {
        if amount > 0 {
            self.challenges
                .report(ChallengeKind::MoneyEarned, amount as f64, ledger, &mut self.outbox);
        }
    }

    /// A checkout: advances challenges, the season pass and charisma.
    pub fn report_customer_served(&mut self, ledger: &mut Ledger) {
        self.challenges
            .report(ChallengeKind::CustomersServed, 1.0, ledger, &mut self.outbox);
        self.season.record_action(&mut self.outbox);
        self.use_skill(SkillKind::Charisma);
    }

    /// A purchase: advances challenges, the season pass and negotiation.
    pub fn report_property_bought(&mut self, ledger: &mut Ledger) {
        self.challenges
            .report(ChallengeKind::PropertiesBought, 1.0, ledger, &mut self.outbox);
        self.season.record_action(&mut self.outbox);
        self.use_skill(SkillKind::Negotiation);
    }

    pub fn set_experience_boost(&mut self, boost: f32) {
        self.experience_boost = if boost.is_finite() && boost > 0.0 { boost } else { 1.0 };
    }

    /// Exercise a skill; the season multiplier and any boost apply.
    pub fn use_skill(&mut self, kind: SkillKind) -> u32 {
        let amount = kind.use_experience() * self.season.experience_multiplier() * self.experience_boost;
        self.skills.gain_experience(kind, amount, &mut self.outbox)
    }

    /// Day-boundary housekeeping.
    pub fn on_day(&mut self) {
        self.challenges.reset_daily();
        self.season.on_day(&mut self.outbox);
    }

    pub fn activate_aspiration(&mut self, id: &str) -> SimResult<()> {
        self.aspirations.activate(id, &mut self.outbox)
    }

    pub fn purchase_season_premium(&mut self) -> bool {
        self.season.purchase_premium(&mut self.outbox)
    }

    /// Soft reset in exchange for permanent bonuses. Cash returns to
    /// `starting_cash` plus every stored money bonus; non-apartment
    /// properties are released and aspiration progress is cleared.
    pub fn enter_prestige<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut Ledger,
        properties: &mut PropertyRegistry,
        prefs: &mut Preferences,
        starting_cash: i64,
        rng: &mut R,
    ) -> SimResult<Vec<PrestigeBonus>> {
        if !self.prestige.is_unlocked() {
            return Err(SimError::ineligible("prestige is locked"));
        }
        let granted = self.prestige.grant(prefs, rng);
        self.modifiers = PrestigeModifiers::from_preferences(prefs);
        ledger.set_cash(starting_cash.saturating_add(self.modifiers.starting_money_bonus));
        let released = properties.reset_for_prestige();
        self.aspirations.reset();
        self.skills.set_base_multiplier(self.modifiers.experience_multiplier);
        let names: Vec<String> = granted.iter().map(|b| b.name.clone()).collect();
        info!(
            level = self.prestige.level(),
            bonuses = ?names,
            released = released.len(),
            "entered prestige"
        );
        self.outbox.push(Notification::PrestigeEntered {
            level: self.prestige.level(),
            bonuses: names,
        });
        Ok(granted)
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain()
    }
}
