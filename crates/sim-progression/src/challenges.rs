use serde::{Deserialize, Serialize};
use sim_core::{ChallengeDef, ChallengeKind, Notification, Outbox};
use sim_econ::Ledger;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    pub def: ChallengeDef,
    pub progress: f64,
    pub completed: bool,
}

/// Challenges whose progress resets at every day boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyChallenges {
    entries: Vec<ChallengeProgress>,
}

impl DailyChallenges {
    pub fn new(defs: Vec<ChallengeDef>) -> Self {
        Self {
            entries: defs
                .into_iter()
                .map(|def| ChallengeProgress {
                    def,
                    progress: 0.0,
                    completed: false,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[ChallengeProgress] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&ChallengeProgress> {
        self.entries.iter().find(|c| c.def.id == id)
    }

    /// Advance every open challenge of `kind` by `amount`. A challenge that
    /// reaches its target completes at once and pays its reward.
    pub fn report(
        &mut self,
        kind: ChallengeKind,
        amount: f64,
        ledger: &mut Ledger,
        outbox: &mut Outbox,
    ) -> Vec<String> {
        if !amount.is_finite() || amount <= 0.0 {
            return Vec::new();
        }
        let mut done = Vec::new();
        for c in self.entries.iter_mut().filter(|c| c.def.kind == kind && !c.completed) {
            c.progress += amount;
            if c.progress >= c.def.target {
                c.completed = true;
                let paid = if c.def.reward > 0 { ledger.add_money(c.def.reward) } else { 0 };
                info!(challenge = %c.def.id, reward = paid, "daily challenge completed");
                outbox.push(Notification::ChallengeCompleted {
                    id: c.def.id.clone(),
                    reward: paid,
                });
                done.push(c.def.id.clone());
            }
        }
        done
    }

    /// Clear progress and completion for a new day.
    pub fn reset_daily(&mut self) {
        for c in &mut self.entries {
            c.progress = 0.0;
            c.completed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::Catalog;

    #[test]
    fn completes_once_per_day() {
        let mut ch = DailyChallenges::new(Catalog::builtin().challenges);
        let mut ledger = Ledger::new(0);
        let mut out = Outbox::default();
        assert!(ch.report(ChallengeKind::MoneyEarned, 300.0, &mut ledger, &mut out).is_empty());
        assert_eq!(
            ch.report(ChallengeKind::MoneyEarned, 200.0, &mut ledger, &mut out),
            vec!["sales_champion"]
        );
        assert_eq!(ledger.cash(), 100);
        assert!(ch.report(ChallengeKind::MoneyEarned, 900.0, &mut ledger, &mut out).is_empty());
        assert_eq!(ledger.cash(), 100);

        ch.reset_daily();
        assert_eq!(ch.get("sales_champion").map(|c| c.progress), Some(0.0));
        ch.report(ChallengeKind::MoneyEarned, 500.0, &mut ledger, &mut out);
        assert_eq!(ledger.cash(), 200);
    }

    #[test]
    fn other_kinds_are_untouched() {
        let mut ch = DailyChallenges::new(Catalog::builtin().challenges);
        let mut ledger = Ledger::new(0);
        let mut out = Outbox::default();
        ch.report(ChallengeKind::PropertiesBought, 1.0, &mut ledger, &mut out);
        assert_eq!(ch.get("busy_store").map(|c| c.progress), Some(0.0));
        assert!(ch.get("property_investor").is_some_and(|c| c.completed));
    }
}
