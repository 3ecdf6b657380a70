use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sim_core::Season;

/// Point-in-time business metrics for dashboards and the CLI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    pub day: u32,
    pub date: NaiveDate,
    pub cash: i64,
    pub net_worth: i64,
    pub property_value: i64,
    pub properties_owned: u32,
    pub reputation: f32,
    pub customers_in_store: usize,
    pub customers_served: u64,
    pub sales: u64,
    pub walkouts: u64,
    pub revenue: i64,
    pub employees: usize,
    /// Summed employee performance.
    pub staff_efficiency: f32,
    pub monthly_payroll: i64,
    pub payroll_paid: i64,
    pub payroll_missed: u32,
    pub market_demand: f32,
    pub competitor_sale: bool,
    pub active_events: Vec<String>,
    pub season: Season,
    pub season_tier: u32,
    pub achievements_unlocked: usize,
    pub aspirations_completed: u32,
    pub prestige_level: u32,
    pub energy: f32,
    pub needs_critical: bool,
    pub networking_bonus: f32,
    pub premium_currency: u32,
}

impl KpiSnapshot {
    /// Share of finished visits that ended in a sale.
    pub fn conversion_rate(&self) -> f32 {
        let visits = self.sales + self.walkouts;
        if visits == 0 {
            0.0
        } else {
            self.sales as f32 / visits as f32
        }
    }
}
