//! Seed data: the read-only templates every component is built from.

use crate::error::ValidationError;
use crate::model::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Every designer-authored template the simulation starts from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub properties: Vec<PropertyRecord>,
    pub suppliers: Vec<Supplier>,
    pub competitors: Vec<Competitor>,
    pub customer_types: Vec<CustomerPersonality>,
    pub events: Vec<EventTemplate>,
    pub achievements: Vec<AchievementDef>,
    pub challenges: Vec<ChallengeDef>,
    pub aspirations: Vec<AspirationDef>,
    pub prestige_bonuses: Vec<PrestigeBonus>,
    pub contacts: Vec<Contact>,
    pub cosmetics: Vec<Cosmetic>,
}

#[allow(clippy::too_many_arguments)]
fn property(
    id: &str,
    kind: PropertyKind,
    name: &str,
    scene: &str,
    price: i64,
    rent: i64,
    appreciation_per_10k: i64,
    luxury: u8,
    energy: f32,
    skill_bonus: f32,
) -> PropertyRecord {
    PropertyRecord {
        id: PropertyId(id.to_string()),
        kind,
        display_name: name.to_string(),
        scene_name: scene.to_string(),
        price,
        base_price: price,
        monthly_rent: rent,
        owned: false,
        for_rent: kind == PropertyKind::Apartment,
        property_value: Decimal::from(price),
        appreciation_rate: Decimal::new(appreciation_per_10k, 4),
        luxury_level: luxury,
        energy_recovery_rate: energy,
        skill_gain_bonus: skill_bonus,
        has_home_office: luxury >= 3,
        has_master_bedroom: luxury >= 4,
    }
}

fn supplier(name: &str, kind: SupplierKind, price: f32, quality: f32, days: u32, reliability: f32) -> Supplier {
    Supplier {
        name: name.to_string(),
        kind,
        price_multiplier: price,
        quality_multiplier: quality,
        delivery_time_days: days,
        reliability,
        available: true,
    }
}

#[allow(clippy::too_many_arguments)]
fn shopper(
    kind: CustomerKind,
    name: &str,
    patience: f32,
    sensitivity: f32,
    impulse: f32,
    review: f32,
    spend: f32,
    impact: f32,
) -> CustomerPersonality {
    CustomerPersonality {
        kind,
        name: name.to_string(),
        patience,
        price_sensitivity: sensitivity,
        impulse_buy_chance: impulse,
        review_likelihood: review,
        average_spend: spend,
        reputation_impact: impact,
    }
}

fn event(id: &str, title: &str, description: &str, kind: EventKind, days: f32) -> EventTemplate {
    EventTemplate {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        kind,
        duration_days: days,
        demand_multiplier: 1.0,
        price_multiplier: 1.0,
        reputation_change: 0.0,
        money_reward: 0,
        money_cost: 0,
        min_net_worth: 0,
        min_reputation: 0.0,
    }
}

fn achievement(id: &str, name: &str, description: &str, reward: i64, requirement: Requirement) -> AchievementDef {
    AchievementDef {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        reward,
        requirement,
    }
}

fn challenge(id: &str, name: &str, description: &str, kind: ChallengeKind, target: f64) -> ChallengeDef {
    ChallengeDef {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        kind,
        target,
        reward: 100,
    }
}

fn aspiration(id: &str, title: &str, description: &str, kind: AspirationKind) -> AspirationDef {
    AspirationDef {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        kind,
        required_net_worth: 0,
        required_properties: 0,
        required_employees: 0,
        required_reputation: 0.0,
        required_skill_level: 0,
        money_reward: 0,
        reputation_bonus: 0.0,
        unlock_feature: None,
    }
}

fn bonus(name: &str, description: &str) -> PrestigeBonus {
    PrestigeBonus {
        name: name.to_string(),
        description: description.to_string(),
        money_multiplier: 1.0,
        experience_multiplier: 1.0,
        reputation_multiplier: 1.0,
        starting_money_bonus: 0,
        unlock_feature: false,
    }
}

impl Catalog {
    /// The stock content shipped with the game.
    pub fn builtin() -> Self {
        let properties = vec![
            property("apt_01", PropertyKind::Apartment, "Small Apartment", "ApartmentScene", 5_000, 500, 5, 1, 0.8, 0.0),
            property("condo_01", PropertyKind::Condo, "Modern Condo", "CondoScene", 15_000, 1_500, 8, 2, 1.0, 0.05),
            property("villa_01", PropertyKind::Villa, "Luxury Villa", "VillaScene", 50_000, 4_500, 10, 3, 1.2, 0.1),
            property("man_01", PropertyKind::Mansion, "Mansion", "MansionScene", 200_000, 12_000, 15, 4, 1.5, 0.2),
        ];

        let suppliers = vec![
            supplier("Budget Bulk Co", SupplierKind::Budget, 0.8, 0.7, 3, 0.7),
            supplier("Standard Supply Inc", SupplierKind::Standard, 1.0, 1.0, 2, 0.85),
            supplier("Premium Partners", SupplierKind::Premium, 1.3, 1.4, 1, 0.95),
            supplier("Local Market Hub", SupplierKind::Local, 1.1, 1.1, 1, 0.9),
        ];

        let competitors = vec![
            Competitor {
                name: "QuickMart".into(),
                market_share: 0.25,
                price_competitiveness: 0.95,
                is_having_sale: false,
                sale_discount: 0.2,
            },
            Competitor {
                name: "ValuePlus".into(),
                market_share: 0.2,
                price_competitiveness: 0.9,
                is_having_sale: false,
                sale_discount: 0.2,
            },
        ];

        let customer_types = vec![
            shopper(CustomerKind::BargainHunter, "Bargain Hunter", 0.8, 1.5, 0.1, 0.3, 30.0, 0.5),
            shopper(CustomerKind::ImpulseBuyer, "Impulse Buyer", 1.2, 0.8, 0.8, 0.4, 60.0, 0.7),
            shopper(CustomerKind::WealthyShopper, "Wealthy Shopper", 1.5, 0.5, 0.6, 0.8, 150.0, 1.5),
            shopper(CustomerKind::ImpatientCustomer, "Impatient Customer", 0.3, 1.0, 0.2, 0.9, 40.0, 2.0),
        ];

        let events = vec![
            EventTemplate {
                demand_multiplier: 1.5,
                price_multiplier: 0.8,
                min_net_worth: 10_000,
                ..event(
                    "brewery_closing",
                    "Brewery Liquidation",
                    "A local brewery is selling its stock at a deep discount.",
                    EventKind::Opportunity,
                    3.0,
                )
            },
            EventTemplate {
                money_cost: 2_000,
                reputation_change: -10.0,
                ..event(
                    "freezer_breakdown",
                    "Freezer Malfunction",
                    "The freezer broke down and spoiled half the frozen goods.",
                    EventKind::Crisis,
                    1.0,
                )
            },
            EventTemplate {
                demand_multiplier: 3.0,
                price_multiplier: 1.2,
                ..event(
                    "city_festival",
                    "City Festival",
                    "A city-wide festival triples snack demand.",
                    EventKind::Seasonal,
                    7.0,
                )
            },
            EventTemplate {
                demand_multiplier: 0.7,
                ..event(
                    "supplier_delay",
                    "Supplier Delay",
                    "The regular supplier is running late.",
                    EventKind::Crisis,
                    2.0,
                )
            },
            EventTemplate {
                reputation_change: 15.0,
                demand_multiplier: 1.8,
                ..event(
                    "viral_social_media",
                    "Viral Moment",
                    "The store got featured on social media.",
                    EventKind::Opportunity,
                    1.0,
                )
            },
            EventTemplate {
                money_reward: 50_000,
                min_net_worth: 50_000,
                ..event(
                    "competitor_bankruptcy",
                    "Competitor Bankruptcy",
                    "A competing store went bankrupt and its location is cheap.",
                    EventKind::Opportunity,
                    14.0,
                )
            },
        ];

        let achievements = vec![
            achievement("first_sale", "First Sale", "Serve your first customer", 100, Requirement::CustomersServed { count: 1 }),
            achievement("property_owner", "Property Owner", "Buy your first property", 500, Requirement::PropertiesOwned { count: 1 }),
            achievement("store_manager", "Store Manager", "Hire your first employee", 250, Requirement::EmployeesHired { count: 1 }),
            achievement("millionaire", "Millionaire", "Hold $1,000,000 in cash", 10_000, Requirement::CashAtLeast { amount: 1_000_000 }),
            achievement("empire_builder", "Empire Builder", "Own 4 properties", 5_000, Requirement::PropertiesOwned { count: 4 }),
        ];

        let challenges = vec![
            challenge("sales_champion", "Sales Champion", "Earn $500 today", ChallengeKind::MoneyEarned, 500.0),
            challenge("busy_store", "Busy Store", "Serve 50 customers today", ChallengeKind::CustomersServed, 50.0),
            challenge("property_investor", "Property Investor", "Buy a property today", ChallengeKind::PropertiesBought, 1.0),
        ];

        let aspirations = vec![
            AspirationDef {
                required_properties: 3,
                money_reward: 10_000,
                reputation_bonus: 20.0,
                ..aspiration(
                    "southside_savior",
                    "The Southside Savior",
                    "Revitalize the neighborhood by owning 3 properties.",
                    AspirationKind::Community,
                )
            },
            AspirationDef {
                required_net_worth: 500_000,
                money_reward: 50_000,
                unlock_feature: Some("Advanced Property Management".into()),
                ..aspiration(
                    "property_mogul",
                    "The Property Mogul",
                    "Build a real-estate portfolio worth half a million.",
                    AspirationKind::Wealth,
                )
            },
            AspirationDef {
                required_employees: 5,
                reputation_bonus: 30.0,
                unlock_feature: Some("Employee Partnership Program".into()),
                ..aspiration(
                    "people_person",
                    "The People Person",
                    "Keep 5 highly loyal, highly skilled employees.",
                    AspirationKind::Legacy,
                )
            },
            AspirationDef {
                required_net_worth: 1_000_000,
                money_reward: 100_000,
                unlock_feature: Some("Franchise System".into()),
                ..aspiration(
                    "market_dominator",
                    "Market Dominator",
                    "Dominate the district with a million in net worth.",
                    AspirationKind::Wealth,
                )
            },
            AspirationDef {
                required_reputation: 100.0,
                reputation_bonus: 10.0,
                unlock_feature: Some("Community Event System".into()),
                ..aspiration(
                    "community_leader",
                    "Community Leader",
                    "Reach maximum reputation.",
                    AspirationKind::Community,
                )
            },
            AspirationDef {
                required_skill_level: 100,
                money_reward: 25_000,
                unlock_feature: Some("Advanced Analytics".into()),
                ..aspiration(
                    "innovation_pioneer",
                    "Innovation Pioneer",
                    "Reach a combined skill level of 100.",
                    AspirationKind::Innovation,
                )
            },
            AspirationDef {
                required_net_worth: 2_000_000,
                reputation_bonus: 25.0,
                unlock_feature: Some("Luxury Lifestyle Perks".into()),
                ..aspiration(
                    "lifestyle_emperor",
                    "Lifestyle Emperor",
                    "Live the luxury life with two million in net worth.",
                    AspirationKind::Lifestyle,
                )
            },
        ];

        let prestige_bonuses = vec![
            PrestigeBonus {
                money_multiplier: 0.9,
                ..bonus("Supplier Veteran", "10% better supplier deals")
            },
            PrestigeBonus {
                experience_multiplier: 1.5,
                unlock_feature: true,
                ..bonus("Handiness Expert", "Start with handiness unlocked")
            },
            PrestigeBonus {
                reputation_multiplier: 1.25,
                ..bonus("Reputation Legacy", "Start with a reputation bonus")
            },
            PrestigeBonus {
                starting_money_bonus: 50_000,
                ..bonus("Capitalist", "Start with $50,000 extra cash")
            },
            PrestigeBonus {
                experience_multiplier: 1.15,
                ..bonus("Networking Pro", "15% faster skill experience gain")
            },
            PrestigeBonus {
                money_multiplier: 1.25,
                ..bonus("Property Magnate", "Properties appreciate 25% faster")
            },
            PrestigeBonus {
                reputation_multiplier: 1.2,
                ..bonus("Employee Loyalty", "Employees start with higher loyalty")
            },
            PrestigeBonus {
                unlock_feature: true,
                ..bonus("Market Master", "Start with the premium supplier unlocked")
            },
        ];

        let contact = |name: &str, role: &str, value: f32, partner: bool, hub: HubKind| Contact {
            name: name.to_string(),
            role: role.to_string(),
            networking_value: value,
            can_offer_partnership: partner,
            preferred_hub: hub,
        };
        let contacts = vec![
            contact("Marcus Chen", "Real Estate Developer", 2.0, true, HubKind::BusinessClub),
            contact("Sarah Johnson", "Marketing Consultant", 1.5, false, HubKind::CoffeeShop),
            contact("Roberto Garcia", "Supplier Manager", 1.8, true, HubKind::NetworkingEvent),
            contact("Emma Wilson", "Business Coach", 1.3, false, HubKind::Gym),
        ];

        let cosmetic = |id: &str, name: &str, description: &str, kind: CosmeticKind, cost: u32| Cosmetic {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            kind,
            premium_cost: cost,
        };
        let cosmetics = vec![
            cosmetic("luxury_chair", "Executive Office Chair", "Premium leather office chair", CosmeticKind::Furniture, 50),
            cosmetic("designer_clothes", "Designer Business Suit", "Tailored suit for important meetings", CosmeticKind::Clothing, 75),
            cosmetic("neon_sign", "Neon Store Sign", "Eye-catching sign for the storefront", CosmeticKind::StoreDecor, 100),
            cosmetic("golden_retriever", "Golden Retriever Pet", "A loyal companion", CosmeticKind::Pet, 150),
            cosmetic("diamond_watch", "Diamond Watch", "Luxury timepiece", CosmeticKind::AvatarAccessory, 200),
        ];

        Catalog {
            properties,
            suppliers,
            competitors,
            customer_types,
            events,
            achievements,
            challenges,
            aspirations,
            prestige_bonuses,
            contacts,
            cosmetics,
        }
    }

    /// Overlay `other` on top of `self`. Templates with an id (or name) that
    /// already exists replace the old entry in place; new ones are appended.
    pub fn merge(&mut self, other: Catalog) {
        merge_by(&mut self.properties, other.properties, |p| p.id.0.clone());
        merge_by(&mut self.suppliers, other.suppliers, |s| s.name.clone());
        merge_by(&mut self.competitors, other.competitors, |c| c.name.clone());
        merge_by(&mut self.customer_types, other.customer_types, |c| format!("{:?}", c.kind));
        merge_by(&mut self.events, other.events, |e| e.id.clone());
        merge_by(&mut self.achievements, other.achievements, |a| a.id.clone());
        merge_by(&mut self.challenges, other.challenges, |c| c.id.clone());
        merge_by(&mut self.aspirations, other.aspirations, |a| a.id.clone());
        merge_by(&mut self.prestige_bonuses, other.prestige_bonuses, |b| b.name.clone());
        merge_by(&mut self.contacts, other.contacts, |c| c.name.clone());
        merge_by(&mut self.cosmetics, other.cosmetics, |c| c.id.clone());
    }

    pub fn property(&self, id: &str) -> Option<&PropertyRecord> {
        self.properties.iter().find(|p| p.id.0 == id)
    }
}

fn merge_by<T, F>(base: &mut Vec<T>, incoming: Vec<T>, key: F)
where
    F: Fn(&T) -> String,
{
    for item in incoming {
        let k = key(&item);
        match base.iter_mut().find(|existing| key(existing) == k) {
            Some(slot) => {
                debug!(key = %k, "catalog entry replaced");
                *slot = item;
            }
            None => base.push(item),
        }
    }
}

fn check_unique<'a, I>(ids: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = BTreeSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

/// Highest daily appreciation a listing may declare (5% per day).
pub const MAX_APPRECIATION_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

fn unit_interval(v: f32) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

/// Validate a property listing.
pub fn validate_property(p: &PropertyRecord) -> Result<(), ValidationError> {
    if p.price < 0 || p.base_price < 0 || p.monthly_rent < 0 {
        return Err(ValidationError::NegativeMoney(p.id.0.clone()));
    }
    if p.appreciation_rate < Decimal::ZERO || p.property_value < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(p.id.0.clone()));
    }
    if p.appreciation_rate > MAX_APPRECIATION_RATE {
        return Err(ValidationError::OutOfRange(p.id.0.clone()));
    }
    if !p.energy_recovery_rate.is_finite() || !p.skill_gain_bonus.is_finite() {
        return Err(ValidationError::NonFinite(p.id.0.clone()));
    }
    Ok(())
}

/// Validate a supplier.
pub fn validate_supplier(s: &Supplier) -> Result<(), ValidationError> {
    if !unit_interval(s.reliability) {
        return Err(ValidationError::InvalidProbability(s.name.clone()));
    }
    if !(s.price_multiplier.is_finite() && s.quality_multiplier.is_finite()) {
        return Err(ValidationError::NonFinite(s.name.clone()));
    }
    if s.price_multiplier <= 0.0 {
        return Err(ValidationError::NonPositive(s.name.clone()));
    }
    Ok(())
}

/// Validate a customer personality.
pub fn validate_personality(c: &CustomerPersonality) -> Result<(), ValidationError> {
    let fields = [
        c.patience,
        c.price_sensitivity,
        c.average_spend,
        c.reputation_impact,
    ];
    if fields.iter().any(|v| !v.is_finite()) {
        return Err(ValidationError::NonFinite(c.name.clone()));
    }
    if !unit_interval(c.impulse_buy_chance) || !unit_interval(c.review_likelihood) {
        return Err(ValidationError::InvalidProbability(c.name.clone()));
    }
    if c.patience <= 0.0 {
        return Err(ValidationError::NonPositive(c.name.clone()));
    }
    if c.average_spend < 0.0 || c.reputation_impact < 0.0 {
        return Err(ValidationError::NegativeMoney(c.name.clone()));
    }
    Ok(())
}

/// Validate an event template.
pub fn validate_event(e: &EventTemplate) -> Result<(), ValidationError> {
    if !(e.duration_days.is_finite() && e.demand_multiplier.is_finite() && e.price_multiplier.is_finite()) {
        return Err(ValidationError::NonFinite(e.id.clone()));
    }
    if e.duration_days <= 0.0 || e.demand_multiplier <= 0.0 || e.price_multiplier <= 0.0 {
        return Err(ValidationError::NonPositive(e.id.clone()));
    }
    if e.money_reward < 0 || e.money_cost < 0 || e.min_net_worth < 0 {
        return Err(ValidationError::NegativeMoney(e.id.clone()));
    }
    if !e.reputation_change.is_finite() || !e.min_reputation.is_finite() {
        return Err(ValidationError::NonFinite(e.id.clone()));
    }
    Ok(())
}

/// Validate the whole catalog, including id uniqueness per template list.
pub fn validate_catalog(c: &Catalog) -> Result<(), ValidationError> {
    check_unique(c.properties.iter().map(|p| p.id.0.as_str()))?;
    check_unique(c.suppliers.iter().map(|s| s.name.as_str()))?;
    check_unique(c.events.iter().map(|e| e.id.as_str()))?;
    check_unique(c.achievements.iter().map(|a| a.id.as_str()))?;
    check_unique(c.challenges.iter().map(|ch| ch.id.as_str()))?;
    check_unique(c.aspirations.iter().map(|a| a.id.as_str()))?;
    check_unique(c.prestige_bonuses.iter().map(|b| b.name.as_str()))?;
    check_unique(c.contacts.iter().map(|ct| ct.name.as_str()))?;
    check_unique(c.cosmetics.iter().map(|cs| cs.id.as_str()))?;

    for p in &c.properties {
        validate_property(p)?;
    }
    for s in &c.suppliers {
        validate_supplier(s)?;
    }
    for p in &c.customer_types {
        validate_personality(p)?;
    }
    for e in &c.events {
        validate_event(e)?;
    }
    for a in &c.achievements {
        if a.reward < 0 {
            return Err(ValidationError::NegativeMoney(a.id.clone()));
        }
    }
    for ch in &c.challenges {
        if !ch.target.is_finite() || ch.target <= 0.0 {
            return Err(ValidationError::NonPositive(ch.id.clone()));
        }
        if ch.reward < 0 {
            return Err(ValidationError::NegativeMoney(ch.id.clone()));
        }
    }
    for a in &c.aspirations {
        if a.money_reward < 0 || a.required_net_worth < 0 {
            return Err(ValidationError::NegativeMoney(a.id.clone()));
        }
        if !a.required_reputation.is_finite() || !a.reputation_bonus.is_finite() {
            return Err(ValidationError::NonFinite(a.id.clone()));
        }
    }
    for b in &c.prestige_bonuses {
        if b.starting_money_bonus < 0 {
            return Err(ValidationError::NegativeMoney(b.name.clone()));
        }
    }
    for ct in &c.contacts {
        if !ct.networking_value.is_finite() {
            return Err(ValidationError::NonFinite(ct.name.clone()));
        }
        if ct.networking_value < 0.0 {
            return Err(ValidationError::NegativeMoney(ct.name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let c = Catalog::builtin();
        validate_catalog(&c).unwrap();
        assert_eq!(c.property("apt_01").map(|p| p.price), Some(5_000));
        assert_eq!(c.suppliers.len(), 4);
        assert_eq!(c.prestige_bonuses.len(), 8);
        assert_eq!(c.contacts.len(), 4);
        assert_eq!(c.cosmetics.iter().map(|x| x.premium_cost).sum::<u32>(), 575);
    }

    #[test]
    fn contacts_need_finite_non_negative_value() {
        let mut c = Catalog::builtin();
        c.contacts[0].networking_value = f32::NAN;
        assert!(matches!(validate_catalog(&c), Err(ValidationError::NonFinite(_))));
        c.contacts[0].networking_value = -1.0;
        assert!(matches!(validate_catalog(&c), Err(ValidationError::NegativeMoney(_))));
        let mut c = Catalog::builtin();
        let dup = c.cosmetics[0].clone();
        c.cosmetics.push(dup);
        assert!(matches!(validate_catalog(&c), Err(ValidationError::DuplicateId(_))));
    }

    #[test]
    fn catalog_json_roundtrip() {
        let c = Catalog::builtin();
        let s = serde_json::to_string_pretty(&c).unwrap();
        let back: Catalog = serde_json::from_str(&s).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn merge_replaces_by_id_and_appends_new() {
        let mut base = Catalog::builtin();
        let mut patch = Catalog::default();
        let mut cheaper = base.property("apt_01").cloned().unwrap();
        cheaper.price = 4_000;
        patch.properties.push(cheaper);
        patch.events.push(event("block_party", "Block Party", "", EventKind::Random, 1.0));
        base.merge(patch);
        assert_eq!(base.properties.len(), 4);
        assert_eq!(base.property("apt_01").map(|p| p.price), Some(4_000));
        assert!(base.events.iter().any(|e| e.id == "block_party"));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut c = Catalog::builtin();
        let dup = c.events[0].clone();
        c.events.push(dup);
        assert_eq!(
            validate_catalog(&c),
            Err(ValidationError::DuplicateId("brewery_closing".into()))
        );
    }

    #[test]
    fn supplier_reliability_must_be_probability() {
        let mut s = Catalog::builtin().suppliers[0].clone();
        s.reliability = 1.5;
        assert!(matches!(
            validate_supplier(&s),
            Err(ValidationError::InvalidProbability(_))
        ));
    }

    #[test]
    fn runaway_appreciation_is_rejected() {
        let mut p = Catalog::builtin().properties[0].clone();
        p.appreciation_rate = Decimal::ONE;
        assert_eq!(
            validate_property(&p),
            Err(ValidationError::OutOfRange("apt_01".into()))
        );
        p.appreciation_rate = MAX_APPRECIATION_RATE;
        assert!(validate_property(&p).is_ok());
    }

    proptest! {
        #[test]
        fn any_reliability_in_unit_interval_is_valid(r in 0.0f32..=1.0) {
            let mut s = Catalog::builtin().suppliers[1].clone();
            s.reliability = r;
            prop_assert!(validate_supplier(&s).is_ok());
        }

        #[test]
        fn negative_prices_rejected(price in -1_000_000i64..0) {
            let mut p = Catalog::builtin().properties[0].clone();
            p.price = price;
            prop_assert!(validate_property(&p).is_err());
        }
    }
}
