//! Serializable records shared by every simulation component.
//!
//! Records double as designer-authored seed data: the catalog owns the
//! templates, components own the per-instance flags (`owned`, `active`,
//! `completed`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

fn one() -> f32 {
    1.0
}

fn one_u8() -> u8 {
    1
}

fn yes() -> bool {
    true
}

/// Unique identifier for a property listing, e.g. "apt_01".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub String);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyId {
    fn from(s: &str) -> Self {
        PropertyId(s.to_string())
    }
}

/// Roster identifier of a hired employee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub u32);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "emp-{}", self.0)
    }
}

/// Identifier of a customer currently inside the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub u64);

/// Kinds of real estate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    Apartment,
    Condo,
    Villa,
    Mansion,
}

impl PropertyKind {
    /// Whether the property can serve as the player's home.
    pub fn is_residential(self) -> bool {
        matches!(
            self,
            PropertyKind::Apartment | PropertyKind::Condo | PropertyKind::Villa | PropertyKind::Mansion
        )
    }

    /// Market trend category that drives the listing price.
    pub fn trend_category(self) -> TrendCategory {
        match self {
            PropertyKind::Apartment | PropertyKind::Condo => TrendCategory::Housing,
            PropertyKind::Villa | PropertyKind::Mansion => TrendCategory::Commercial,
        }
    }
}

/// Broad market segments tracked by the trend random walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrendCategory {
    Housing,
    Retail,
    Commercial,
}

impl TrendCategory {
    pub const ALL: [TrendCategory; 3] = [
        TrendCategory::Housing,
        TrendCategory::Retail,
        TrendCategory::Commercial,
    ];
}

/// A real-estate listing. Owned listings carry a live market valuation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Listing identifier.
    pub id: PropertyId,
    /// Property kind.
    pub kind: PropertyKind,
    /// Human-readable name.
    pub display_name: String,
    /// Scene loaded by the presentation layer when the player enters.
    #[serde(default)]
    pub scene_name: String,
    /// Current asking price.
    pub price: i64,
    /// Price before market trends are applied; 0 means "same as price".
    #[serde(default)]
    pub base_price: i64,
    /// Rent charged per month when the listing is rented.
    pub monthly_rent: i64,
    /// Whether the player owns the property.
    #[serde(default)]
    pub owned: bool,
    /// Whether the listing can be rented.
    #[serde(default)]
    pub for_rent: bool,
    /// Current market value of an owned property.
    #[serde(default)]
    pub property_value: Decimal,
    /// Daily appreciation rate (0.001 = 0.1% per day).
    pub appreciation_rate: Decimal,
    /// Luxury tier 1-4.
    #[serde(default = "one_u8")]
    pub luxury_level: u8,
    /// Energy recovery multiplier while at home.
    #[serde(default = "one")]
    pub energy_recovery_rate: f32,
    /// Bonus added to player skill experience gain.
    #[serde(default)]
    pub skill_gain_bonus: f32,
    #[serde(default)]
    pub has_home_office: bool,
    #[serde(default)]
    pub has_master_bedroom: bool,
}

impl PropertyRecord {
    /// Price the market trends are applied against.
    pub fn trend_base(&self) -> i64 {
        if self.base_price > 0 {
            self.base_price
        } else {
            self.price
        }
    }
}

/// Supplier tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplierKind {
    Budget,
    Standard,
    Premium,
    Local,
}

/// A wholesale supplier. Only `available` changes after initialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub name: String,
    pub kind: SupplierKind,
    /// Cost multiplier applied to quotes.
    #[serde(default = "one")]
    pub price_multiplier: f32,
    /// How long goods last and how well they sell.
    #[serde(default = "one")]
    pub quality_multiplier: f32,
    /// Days until an order arrives.
    pub delivery_time_days: u32,
    /// Probability in [0,1] that an order goes through.
    pub reliability: f32,
    #[serde(default = "yes")]
    pub available: bool,
}

/// A rival store that occasionally runs sales.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    /// Share of the market the competitor controls.
    pub market_share: f32,
    /// How aggressively the competitor prices.
    #[serde(default = "one")]
    pub price_competitiveness: f32,
    #[serde(default)]
    pub is_having_sale: bool,
    #[serde(default)]
    pub sale_discount: f32,
}

/// Shopper archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerKind {
    BargainHunter,
    ImpulseBuyer,
    WealthyShopper,
    ImpatientCustomer,
}

/// Behavior template for a shopper archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerPersonality {
    pub kind: CustomerKind,
    pub name: String,
    /// Relative time a customer is willing to spend in the store.
    pub patience: f32,
    /// Exponent applied to the store price level when judging prices.
    pub price_sensitivity: f32,
    pub impulse_buy_chance: f32,
    pub review_likelihood: f32,
    /// Typical basket value.
    pub average_spend: f32,
    /// Reputation gained on a good visit; twice this is lost on a bad one.
    pub reputation_impact: f32,
}

/// Store job roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmployeeRole {
    Cashier,
    StockClerk,
    Manager,
    MarketingSpecialist,
}

impl EmployeeRole {
    /// Monthly base salary for the role.
    pub fn base_salary(self) -> Decimal {
        match self {
            EmployeeRole::Cashier => Decimal::new(800, 0),
            EmployeeRole::StockClerk => Decimal::new(900, 0),
            EmployeeRole::Manager => Decimal::new(1500, 0),
            EmployeeRole::MarketingSpecialist => Decimal::new(1200, 0),
        }
    }
}

/// Categories of store events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Opportunity,
    Crisis,
    Seasonal,
    Random,
}

/// Template for a timed store event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventTemplate {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: EventKind,
    /// Simulated days the event stays active.
    pub duration_days: f32,
    #[serde(default = "one")]
    pub demand_multiplier: f32,
    #[serde(default = "one")]
    pub price_multiplier: f32,
    #[serde(default)]
    pub reputation_change: f32,
    #[serde(default)]
    pub money_reward: i64,
    #[serde(default)]
    pub money_cost: i64,
    /// Minimum cash on hand for the event to be eligible.
    #[serde(default)]
    pub min_net_worth: i64,
    #[serde(default)]
    pub min_reputation: f32,
}

/// Condition under which an achievement unlocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    CustomersServed { count: u64 },
    PropertiesOwned { count: u32 },
    EmployeesHired { count: u32 },
    CashAtLeast { amount: i64 },
    NetWorthAtLeast { amount: i64 },
    ReputationAtLeast { value: f32 },
    /// Rhai boolean expression over the live game stats.
    Script { expr: String },
}

/// One-shot achievement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub reward: i64,
    pub requirement: Requirement,
}

/// Signals that advance daily challenges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeKind {
    MoneyEarned,
    CustomersServed,
    PropertiesBought,
}

fn default_challenge_reward() -> i64 {
    100
}

/// A challenge whose progress resets every simulated day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChallengeDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: ChallengeKind,
    pub target: f64,
    #[serde(default = "default_challenge_reward")]
    pub reward: i64,
}

/// Narrative themes for aspirations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspirationKind {
    Wealth,
    Legacy,
    Community,
    Innovation,
    Lifestyle,
}

/// Long-horizon goal. Zero-valued requirements are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AspirationDef {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: AspirationKind,
    #[serde(default)]
    pub required_net_worth: i64,
    #[serde(default)]
    pub required_properties: u32,
    /// Count of employees with loyalty >= 90 and skill >= 8.
    #[serde(default)]
    pub required_employees: u32,
    #[serde(default)]
    pub required_reputation: f32,
    /// Sum of all player skill levels.
    #[serde(default)]
    pub required_skill_level: u32,
    #[serde(default)]
    pub money_reward: i64,
    #[serde(default)]
    pub reputation_bonus: f32,
    #[serde(default)]
    pub unlock_feature: Option<String>,
}

/// Permanent modifier granted on entering prestige.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrestigeBonus {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "one")]
    pub money_multiplier: f32,
    #[serde(default = "one")]
    pub experience_multiplier: f32,
    #[serde(default = "one")]
    pub reputation_multiplier: f32,
    #[serde(default)]
    pub starting_money_bonus: i64,
    #[serde(default)]
    pub unlock_feature: bool,
}

impl PrestigeBonus {
    /// Stable key fragment derived from the bonus name.
    pub fn slug(&self) -> String {
        self.name.trim().to_lowercase().replace(' ', "_")
    }
}

/// Battle-pass seasons, cycled in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
    Holiday,
}

/// Seasonal flavor and multipliers.
#[derive(Clone, Debug, PartialEq)]
pub struct SeasonProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub demand_multiplier: f32,
    pub experience_multiplier: f32,
}

impl Season {
    pub fn next(self) -> Season {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Fall,
            Season::Fall => Season::Winter,
            Season::Winter => Season::Holiday,
            Season::Holiday => Season::Spring,
        }
    }

    pub fn profile(self) -> SeasonProfile {
        let (name, description, demand, xp) = match self {
            Season::Spring => ("Spring Renewal", "Fresh start with blooming opportunities.", 1.1, 1.05),
            Season::Summer => ("Summer Rush", "Beach season brings tourist crowds.", 1.3, 1.1),
            Season::Fall => ("Harvest Festival", "Celebrate the harvest with special deals.", 1.15, 1.08),
            Season::Winter => ("Winter Wonderland", "People stay home more.", 0.9, 1.12),
            Season::Holiday => ("Holiday Hustle", "Festive season means peak shopping.", 1.5, 1.2),
        };
        SeasonProfile {
            name,
            description,
            demand_multiplier: demand,
            experience_multiplier: xp,
        }
    }
}

/// Venues the player can visit to meet business contacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HubKind {
    BusinessClub,
    LocalBar,
    Gym,
    CoffeeShop,
    NetworkingEvent,
}

/// A business contact who frequents one kind of hub.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub role: String,
    /// Weight in the networking bonus at full relationship.
    pub networking_value: f32,
    #[serde(default)]
    pub can_offer_partnership: bool,
    pub preferred_hub: HubKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CosmeticKind {
    Furniture,
    Clothing,
    StoreDecor,
    AvatarAccessory,
    Pet,
}

/// Purely visual unlock bought with premium currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cosmetic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: CosmeticKind,
    pub premium_cost: u32,
}
