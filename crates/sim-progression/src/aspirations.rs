//! Long-horizon compound goals.
//!
//! An aspiration is evaluated only while active. Every non-zero requirement
//! must hold at once; completion is one-way and pays exactly once.

use serde::{Deserialize, Serialize};
use sim_core::{AspirationDef, GameStats, Notification, Outbox, SimError, SimResult};
use sim_econ::Ledger;
use sim_store::CustomerFlow;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AspirationState {
    pub def: AspirationDef,
    pub active: bool,
    pub completed: bool,
}

impl AspirationState {
    /// Whether every non-zero requirement is satisfied by `stats`.
    pub fn requirements_met(&self, stats: &GameStats) -> bool {
        let d = &self.def;
        (d.required_net_worth == 0 || stats.net_worth >= d.required_net_worth)
            && (d.required_properties == 0 || stats.properties_owned >= d.required_properties)
            && (d.required_employees == 0 || stats.qualified_employees >= d.required_employees)
            && (d.required_reputation <= 0.0 || stats.reputation >= d.required_reputation)
            && (d.required_skill_level == 0 || stats.skill_total >= d.required_skill_level)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aspirations {
    entries: Vec<AspirationState>,
    unlocked_features: Vec<String>,
}

impl Aspirations {
    pub fn new(defs: Vec<AspirationDef>) -> Self {
        Self {
            entries: defs
                .into_iter()
                .map(|def| AspirationState {
                    def,
                    active: false,
                    completed: false,
                })
                .collect(),
            unlocked_features: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[AspirationState] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&AspirationState> {
        self.entries.iter().find(|a| a.def.id == id)
    }

    pub fn completed_count(&self) -> u32 {
        self.entries.iter().filter(|a| a.completed).count() as u32
    }

    /// Feature tags granted by completed aspirations, in completion order.
    pub fn unlocked_features(&self) -> &[String] {
        &self.unlocked_features
    }

    /// Start pursuing `id`. Active or completed aspirations are ineligible.
    pub fn activate(&mut self, id: &str, outbox: &mut Outbox) -> SimResult<()> {
        let a = self
            .entries
            .iter_mut()
            .find(|a| a.def.id == id)
            .ok_or_else(|| SimError::unknown(format!("aspiration {id}")))?;
        if a.active {
            return Err(SimError::ineligible(format!("{id} is already active")));
        }
        if a.completed {
            return Err(SimError::ineligible(format!("{id} is already completed")));
        }
        a.active = true;
        info!(aspiration = %id, "aspiration activated");
        outbox.push(Notification::AspirationActivated { id: id.to_string() });
        Ok(())
    }

    /// Complete every active aspiration whose requirements hold. Money goes
    /// to the ledger; the reputation bonus (scaled by
    /// `reputation_multiplier`) goes to the store.
    pub fn evaluate(
        &mut self,
        stats: &GameStats,
        ledger: &mut Ledger,
        customers: &mut CustomerFlow,
        reputation_multiplier: f32,
        outbox: &mut Outbox,
    ) -> Vec<String> {
        let mut done = Vec::new();
        for a in self.entries.iter_mut().filter(|a| a.active && !a.completed) {
            if !a.requirements_met(stats) {
                continue;
            }
            a.completed = true;
            a.active = false;
            let paid = if a.def.money_reward > 0 {
                ledger.add_money(a.def.money_reward)
            } else {
                0
            };
            if a.def.reputation_bonus > 0.0 {
                customers.adjust_reputation(a.def.reputation_bonus * reputation_multiplier);
            }
            if let Some(f) = &a.def.unlock_feature {
                self.unlocked_features.push(f.clone());
            }
            info!(aspiration = %a.def.id, reward = paid, "aspiration completed");
            outbox.push(Notification::AspirationCompleted {
                id: a.def.id.clone(),
                unlock_feature: a.def.unlock_feature.clone(),
            });
            done.push(a.def.id.clone());
        }
        done
    }

    /// Forget all progress. Used when entering prestige.
    pub fn reset(&mut self) {
        for a in &mut self.entries {
            a.active = false;
            a.completed = false;
        }
        self.unlocked_features.clear();
    }

    /// Reapply persisted flags without paying rewards.
    pub fn restore(&mut self, active: &[String], completed: &[String]) {
        self.unlocked_features.clear();
        for a in &mut self.entries {
            a.completed = completed.contains(&a.def.id);
            a.active = !a.completed && active.contains(&a.def.id);
            if a.completed {
                if let Some(f) = &a.def.unlock_feature {
                    self.unlocked_features.push(f.clone());
                }
            }
        }
    }

    pub fn active_ids(&self) -> Vec<String> {
        self.entries.iter().filter(|a| a.active).map(|a| a.def.id.clone()).collect()
    }

    pub fn completed_ids(&self) -> Vec<String> {
        self.entries.iter().filter(|a| a.completed).map(|a| a.def.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{Catalog, CustomerConfig};

    fn setup() -> (Aspirations, Ledger, CustomerFlow) {
        let catalog = Catalog::builtin();
        (
            Aspirations::new(catalog.aspirations),
            Ledger::new(0),
            CustomerFlow::new(catalog.customer_types, &CustomerConfig::default()),
        )
    }

    #[test]
    fn inactive_aspirations_never_complete() {
        let (mut asp, mut ledger, mut customers) = setup();
        let mut out = Outbox::default();
        let stats = GameStats {
            properties_owned: 3,
            ..GameStats::default()
        };
        assert!(asp.evaluate(&stats, &mut ledger, &mut customers, 1.0, &mut out).is_empty());
        assert_eq!(ledger.cash(), 0);
    }

    #[test]
    fn completion_pays_money_and_reputation() {
        let (mut asp, mut ledger, mut customers) = setup();
        let mut out = Outbox::default();
        asp.activate("southside_savior", &mut out).unwrap();
        let stats = GameStats {
            properties_owned: 3,
            ..GameStats::default()
        };
        assert_eq!(
            asp.evaluate(&stats, &mut ledger, &mut customers, 1.0, &mut out),
            vec!["southside_savior"]
        );
        assert_eq!(ledger.cash(), 10_000);
        assert_eq!(customers.reputation(), 70.0);
        let a = asp.get("southside_savior").unwrap();
        assert!(a.completed && !a.active);
        assert_eq!(asp.completed_count(), 1);
    }

    #[test]
    fn activation_rules() {
        let (mut asp, mut ledger, mut customers) = setup();
        let mut out = Outbox::default();
        assert!(matches!(asp.activate("nope", &mut out), Err(SimError::UnknownEntity(_))));
        asp.activate("community_leader", &mut out).unwrap();
        assert!(matches!(
            asp.activate("community_leader", &mut out),
            Err(SimError::Ineligible(_))
        ));
        let stats = GameStats {
            reputation: 100.0,
            ..GameStats::default()
        };
        asp.evaluate(&stats, &mut ledger, &mut customers, 1.0, &mut out);
        assert!(matches!(
            asp.activate("community_leader", &mut out),
            Err(SimError::Ineligible(_))
        ));
        assert_eq!(asp.unlocked_features(), ["Community Event System".to_string()]);
    }

    #[test]
    fn zero_requirements_are_ignored() {
        let (asp, _, _) = setup();
        let a = asp.get("people_person").unwrap();
        let mut stats = GameStats {
            qualified_employees: 5,
            employees: 5,
            ..GameStats::default()
        };
        assert!(a.requirements_met(&stats));
        stats.qualified_employees = 4;
        assert!(!a.requirements_met(&stats));
    }
}
