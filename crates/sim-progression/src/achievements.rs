use serde::{Deserialize, Serialize};
use sim_core::{AchievementDef, GameStats, Notification, Outbox, PredicateHost};
use sim_econ::Ledger;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// One-shot milestones. Once unlocked an achievement never re-locks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Achievements {
    defs: Vec<AchievementDef>,
    unlocked: BTreeSet<String>,
    /// Scripted requirements that failed to evaluate; skipped from then on.
    #[serde(default)]
    broken: BTreeSet<String>,
}

impl Achievements {
    pub fn new(defs: Vec<AchievementDef>) -> Self {
        Self {
            defs,
            unlocked: BTreeSet::new(),
            broken: BTreeSet::new(),
        }
    }

    pub fn defs(&self) -> &[AchievementDef] {
        &self.defs
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    /// Unlock every achievement whose requirement holds and credit its
    /// reward. Returns the newly unlocked ids.
    pub fn evaluate(
        &mut self,
        stats: &GameStats,
        host: &dyn PredicateHost,
        ledger: &mut Ledger,
        outbox: &mut Outbox,
    ) -> Vec<String> {
        let mut fresh = Vec::new();
        for def in &self.defs {
            if self.unlocked.contains(&def.id) || self.broken.contains(&def.id) {
                continue;
            }
            match def.requirement.is_met(stats, host) {
                Ok(true) => fresh.push(def.clone()),
                Ok(false) => {}
                Err(e) => {
                    warn!(achievement = %def.id, error = %e, "requirement disabled");
                    self.broken.insert(def.id.clone());
                }
            }
        }
        let mut ids = Vec::with_capacity(fresh.len());
        for def in fresh {
            let paid = if def.reward > 0 { ledger.add_money(def.reward) } else { 0 };
            info!(achievement = %def.id, reward = paid, "achievement unlocked");
            self.unlocked.insert(def.id.clone());
            outbox.push(Notification::AchievementUnlocked {
                id: def.id.clone(),
                reward: paid,
            });
            ids.push(def.id);
        }
        ids
    }

    pub fn unlocked_ids(&self) -> impl Iterator<Item = &str> {
        self.unlocked.iter().map(String::as_str)
    }

    /// Mark ids as already unlocked without paying rewards (save restore).
    pub fn restore_unlocked<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            if self.defs.iter().any(|d| d.id == id) {
                self.unlocked.insert(id.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{Catalog, NoScripts, Requirement};

    #[test]
    fn unlocks_once_and_pays_once() {
        let mut a = Achievements::new(Catalog::builtin().achievements);
        let mut ledger = Ledger::new(0);
        let mut out = Outbox::default();
        let stats = GameStats {
            customers_served: 1,
            ..GameStats::default()
        };
        assert_eq!(a.evaluate(&stats, &NoScripts, &mut ledger, &mut out), vec!["first_sale"]);
        assert_eq!(ledger.cash(), 100);
        assert!(a.evaluate(&stats, &NoScripts, &mut ledger, &mut out).is_empty());
        assert_eq!(ledger.cash(), 100);
        let regressed = GameStats::default();
        a.evaluate(&regressed, &NoScripts, &mut ledger, &mut out);
        assert!(a.is_unlocked("first_sale"));
    }

    #[test]
    fn failing_script_is_skipped_after_first_error() {
        let mut a = Achievements::new(vec![AchievementDef {
            id: "scripted".into(),
            name: "Scripted".into(),
            description: String::new(),
            reward: 10,
            requirement: Requirement::Script {
                expr: "cash > 0".into(),
            },
        }]);
        let mut ledger = Ledger::new(0);
        let mut out = Outbox::default();
        a.evaluate(&GameStats::default(), &NoScripts, &mut ledger, &mut out);
        assert!(a.broken.contains("scripted"));
        assert!(!a.is_unlocked("scripted"));
    }
}
