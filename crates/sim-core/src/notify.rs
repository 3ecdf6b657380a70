//! Notifications emitted by the simulation for the presentation layer.
//!
//! Components buffer notifications in their own [`Outbox`]; the runtime
//! drains every outbox once per tick into a single queue. Nothing in the
//! core waits for a notification to be consumed.

use crate::model::{CustomerId, CustomerKind, EmployeeId, HubKind, PropertyId, Season};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Something observable happened inside the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    MoneyChanged { cash: i64 },
    PropertyPurchased { id: PropertyId, price: i64 },
    PropertyRented { id: PropertyId, rent: i64 },
    PropertyValueChanged { id: PropertyId, value: Decimal },
    SupplierSelected { name: String },
    OrderPlaced { item: String, quantity: u32, days: u32 },
    OrderFailed { item: String, supplier: String },
    DeliveryArrived { item: String, quantity: u32 },
    CompetitorSaleStarted { competitor: String, days: u32 },
    CompetitorSaleEnded,
    CustomerSpawned { id: CustomerId, kind: CustomerKind },
    CustomerDeparted { id: CustomerId, satisfied: bool },
    ReputationChanged { reputation: f32 },
    EmployeeHired { id: EmployeeId, name: String },
    EmployeeQuit { id: EmployeeId, name: String },
    EmployeeFired { id: EmployeeId, name: String },
    EmployeePromoted { id: EmployeeId, skill_level: u8 },
    PartnershipFormed { id: EmployeeId },
    RaiseRequested { id: EmployeeId, desired: Decimal },
    PayrollProcessed { total: i64 },
    EventTriggered { id: String },
    EventExpired { id: String },
    AchievementUnlocked { id: String, reward: i64 },
    ChallengeCompleted { id: String, reward: i64 },
    AspirationActivated { id: String },
    AspirationCompleted { id: String, unlock_feature: Option<String> },
    PrestigeUnlocked,
    PrestigeEntered { level: u32, bonuses: Vec<String> },
    SeasonStarted { season: Season },
    TierAdvanced { tier: u32 },
    RewardClaimed { tier: u32, premium: bool },
    SkillLeveledUp { skill: String, level: u32 },
    NeedsCritical,
    NeedsRestored,
    HubEntered { hub: HubKind, visitors: usize },
    ContactMet { name: String },
    PartnershipOffered { contact: String },
    PremiumCurrencyChanged { balance: u32 },
    CosmeticPurchased { id: String },
    BoostExpired { boost: String },
}

/// Per-component notification buffer.
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    items: Vec<Notification>,
}

impl Outbox {
    pub fn push(&mut self, n: Notification) {
        self.items.push(n);
    }

    /// Take every buffered notification, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
