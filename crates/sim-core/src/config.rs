//! Tunables for every simulation component.
//!
//! All fields have defaults, so a config file only needs the values it
//! overrides.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the deterministic RNG.
    pub rng_seed: u64,
    /// Simulated seconds advanced per tick.
    pub tick_seconds: f64,
    /// Cash at a fresh start and after prestige.
    pub starting_cash: i64,
    /// Calendar date of day 0.
    pub start_date: NaiveDate,
    /// Payroll runs on day boundaries that are multiples of this.
    pub payroll_interval_days: u32,
    pub customers: CustomerConfig,
    pub workforce: WorkforceConfig,
    pub supply: SupplyConfig,
    pub events: EventConfig,
    pub market: MarketConfig,
    pub prestige: PrestigeConfig,
    pub season: SeasonConfig,
    pub needs: NeedsConfig,
    pub social: SocialConfig,
    pub monetization: MonetizationConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            tick_seconds: 60.0,
            starting_cash: 1_000,
            start_date: default_start_date(),
            payroll_interval_days: 30,
            customers: CustomerConfig::default(),
            workforce: WorkforceConfig::default(),
            supply: SupplyConfig::default(),
            events: EventConfig::default(),
            market: MarketConfig::default(),
            prestige: PrestigeConfig::default(),
            season: SeasonConfig::default(),
            needs: NeedsConfig::default(),
            social: SocialConfig::default(),
            monetization: MonetizationConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerConfig {
    /// Spawn attempts per simulated minute.
    pub spawn_rate_per_min: f32,
    pub max_customers_in_store: usize,
    pub starting_reputation: f32,
    /// Reputation lost per simulated day.
    pub reputation_decay_per_day: f32,
    /// Seconds a customer with patience 1.0 stays before checking out.
    pub base_visit_secs: f64,
    pub starting_cleanliness: f32,
    pub starting_stock: f32,
    pub price_level: f32,
}

impl Default for CustomerConfig {
    fn default() -> Self {
        Self {
            spawn_rate_per_min: 0.5,
            max_customers_in_store: 10,
            starting_reputation: 50.0,
            reputation_decay_per_day: 0.1,
            base_visit_secs: 300.0,
            starting_cleanliness: 50.0,
            starting_stock: 50.0,
            price_level: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkforceConfig {
    pub max_employees: usize,
    pub hiring_cost: i64,
    /// Morale points lost per simulated second.
    pub morale_decay_per_sec: f32,
    /// Employees below this loyalty may quit.
    pub quit_loyalty_threshold: f32,
    /// Chance per tick that a disloyal employee quits.
    pub quit_chance_per_tick: f64,
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
}

impl Default for WorkforceConfig {
    fn default() -> Self {
        let names = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            max_employees: 5,
            hiring_cost: 500,
            morale_decay_per_sec: 0.01,
            quit_loyalty_threshold: 20.0,
            quit_chance_per_tick: 0.001,
            first_names: names(&["Alex", "Jordan", "Taylor", "Morgan", "Casey"]),
            last_names: names(&["Smith", "Johnson", "Williams", "Brown", "Davis"]),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyConfig {
    /// Supplier selected at startup, if any.
    pub default_supplier: Option<String>,
    /// Chance per tick that a competitor starts a sale.
    pub competitor_sale_chance_per_tick: f64,
    /// Largest daily step of the market demand walk.
    pub demand_volatility: f32,
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            default_supplier: Some("Standard Supply Inc".to_string()),
            competitor_sale_chance_per_tick: 0.001,
            demand_volatility: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Chance per simulated day that a random event fires.
    pub spawn_chance_per_day: f64,
    pub max_concurrent_events: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            spawn_chance_per_day: 0.02,
            max_concurrent_events: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Largest step of a trend per update.
    pub volatility: f32,
    /// Simulated seconds between trend updates.
    pub trend_update_secs: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            volatility: 0.1,
            trend_update_secs: 300.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrestigeConfig {
    pub net_worth_threshold: i64,
    pub aspirations_required: u32,
    pub bonuses_per_prestige: usize,
}

impl Default for PrestigeConfig {
    fn default() -> Self {
        Self {
            net_worth_threshold: 1_000_000,
            aspirations_required: 5,
            bonuses_per_prestige: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonConfig {
    pub length_days: u32,
    pub max_tier: u32,
    /// Experience needed to leave tier 1.
    pub base_xp_to_next: u32,
    /// Extra experience needed per tier gained.
    pub xp_step: u32,
    /// Experience granted per rewarded action.
    pub xp_per_action: u32,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            length_days: 30,
            max_tier: 10,
            base_xp_to_next: 100,
            xp_step: 50,
            xp_per_action: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedsConfig {
    /// Points lost per decay step.
    pub energy_decay: f32,
    pub hunger_decay: f32,
    pub social_decay: f32,
    pub hygiene_decay: f32,
    /// Simulated seconds between decay steps.
    pub decay_interval_secs: f64,
    /// At or below this level a need is critical.
    pub critical_threshold: f32,
    /// Energy restored per hour of sleep at a recovery rate of 1.0.
    pub sleep_energy_per_hour: f32,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            energy_decay: 5.0,
            hunger_decay: 3.0,
            social_decay: 2.0,
            hygiene_decay: 4.0,
            decay_interval_secs: 60.0,
            critical_threshold: 20.0,
            sleep_energy_per_hour: 12.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub entry_fee: i64,
    /// Visitor draws per hub visit fall in `[min_occupants, max_occupants)`.
    pub min_occupants: u32,
    pub max_occupants: u32,
    /// Chance per visit to meet a contact who prefers this hub.
    pub contact_spawn_chance: f64,
    /// Relationship needed before a contact may offer a partnership.
    pub partnership_min_relationship: u8,
    pub partnership_chance: f64,
    /// Social need restored by entering a hub.
    pub social_restore: f32,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            entry_fee: 50,
            min_occupants: 3,
            max_occupants: 20,
            contact_spawn_chance: 0.1,
            partnership_min_relationship: 7,
            partnership_chance: 0.3,
            social_restore: 20.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonetizationConfig {
    pub currency_per_ad: u32,
    /// Order discount granted by a rewarded ad.
    pub ad_discount: f32,
    pub ad_discount_secs: f64,
    /// Skill experience multiplier while the boost runs.
    pub double_experience_multiplier: f32,
}

impl Default for MonetizationConfig {
    fn default() -> Self {
        Self {
            currency_per_ad: 10,
            ad_discount: 0.2,
            ad_discount_secs: 7_200.0,
            double_experience_multiplier: 2.0,
        }
    }
}
