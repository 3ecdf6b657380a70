//! Aggregate state read by the progression layer.

use crate::error::{SimError, SimResult};
use crate::model::Requirement;
use serde::{Deserialize, Serialize};

/// Snapshot of the live aggregate state, rebuilt every tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    /// Cash on hand.
    pub cash: i64,
    /// Cash plus the value of owned properties, rounded down.
    pub net_worth: i64,
    /// Summed valuation of owned properties, rounded down.
    pub property_value: i64,
    pub properties_owned: u32,
    pub reputation: f32,
    pub employees: u32,
    /// Employees with loyalty >= 90 and skill >= 8.
    pub qualified_employees: u32,
    /// Sum of the player's skill levels.
    pub skill_total: u32,
    pub customers_served: u64,
    /// Every credit the ledger ever received.
    pub lifetime_income: i64,
    pub day: u32,
    pub aspirations_completed: u32,
    pub prestige_level: u32,
}

/// Evaluates scripted predicates against [`GameStats`].
pub trait PredicateHost {
    fn check(&self, expr: &str, stats: &GameStats) -> SimResult<bool>;
}

/// Host for builds without a scripting engine: every script is rejected.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoScripts;

impl PredicateHost for NoScripts {
    fn check(&self, expr: &str, _stats: &GameStats) -> SimResult<bool> {
        Err(SimError::Script(format!("scripting unavailable: {expr}")))
    }
}

impl Requirement {
    /// Whether the requirement holds for `stats`.
    pub fn is_met(&self, stats: &GameStats, host: &dyn PredicateHost) -> SimResult<bool> {
        Ok(match self {
            Requirement::CustomersServed { count } => stats.customers_served >= *count,
            Requirement::PropertiesOwned { count } => stats.properties_owned >= *count,
            Requirement::EmployeesHired { count } => stats.employees >= *count,
            Requirement::CashAtLeast { amount } => stats.cash >= *amount,
            Requirement::NetWorthAtLeast { amount } => stats.net_worth >= *amount,
            Requirement::ReputationAtLeast { value } => stats.reputation >= *value,
            Requirement::Script { expr } => host.check(expr, stats)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        let stats = GameStats {
            cash: 500,
            net_worth: 5_500,
            properties_owned: 1,
            ..GameStats::default()
        };
        let host = NoScripts;
        assert!(Requirement::CashAtLeast { amount: 500 }.is_met(&stats, &host).unwrap());
        assert!(!Requirement::CashAtLeast { amount: 501 }.is_met(&stats, &host).unwrap());
        assert!(Requirement::PropertiesOwned { count: 1 }.is_met(&stats, &host).unwrap());
        assert!(Requirement::NetWorthAtLeast { amount: 5_000 }.is_met(&stats, &host).unwrap());
    }

    #[test]
    fn scripts_need_a_host() {
        let req = Requirement::Script {
            expr: "cash > 0".into(),
        };
        assert!(matches!(
            req.is_met(&GameStats::default(), &NoScripts),
            Err(SimError::Script(_))
        ));
    }
}
