#![deny(warnings)]

//! ECS runtime for the Market Hustle simulation.
//!
//! Every component lives in a bevy_ecs [`World`] as a resource and a
//! single-threaded chained [`Schedule`] advances them one tick at a time.
//! [`Simulation`] is the synchronous facade the input layer talks to.

pub mod kpi;
pub mod systems;

use bevy_ecs::prelude::*;
use bevy_ecs::system::{RunSystemOnce, SystemState};
use persistence::{FurnitureRecord, SaveData};
use rust_decimal::Decimal;
use sim_core::{
    clamp_score, seeded_rng, validate_catalog, Catalog, EmployeeId, EmployeeRole, GameStats, HubKind,
    Notification, PredicateHost, Preferences, PrestigeBonus, SimClock, SimConfig, SimResult, SupplierKind,
    ValidationError,
};
use sim_econ::{promo_price, Ledger, MarketTrends, PropertyRegistry, SupplyChain};
use sim_life::{HubVisit, Monetization, NeedKind, NetworkOutcome, PlayerNeeds, SocialHubs};
use sim_progression::{claimed_slugs, PrestigeModifiers, ProgressionTracker, SkillKind};
use sim_store::{CustomerFlow, Employee, EventEngine, WorkforcePool};
use tracing::{info, warn};

pub use kpi::KpiSnapshot;
pub use systems::{
    build_schedule, gather_stats, FurnitureLayout, Notifications, Prefs, SimRand, Settings, TickClock, Totals,
};

/// Feature slug that starts a run with the premium supplier selected.
const PREMIUM_SUPPLIER_FEATURE: &str = "market_master";

/// Claimed bonus that raises the starting loyalty of new hires.
const LOYALTY_BONUS_SLUG: &str = "employee_loyalty";
const LOYALTY_HIRE_BONUS: f32 = 15.0;

/// Energy recovery rate when sleeping without a home.
const NO_HOME_RECOVERY: f32 = 0.5;

fn hire_loyalty_bonus(prefs: &Preferences) -> f32 {
    if claimed_slugs(prefs).contains(LOYALTY_BONUS_SLUG) {
        LOYALTY_HIRE_BONUS
    } else {
        0.0
    }
}

/// Owns the world and schedule; every player action goes through here.
pub struct Simulation {
    world: World,
    schedule: Schedule,
}

impl Simulation {
    /// Build a world from `catalog`, applying the prestige bonuses stored
    /// in `prefs` (starting cash, reputation, experience, features).
    pub fn new(cfg: SimConfig, catalog: Catalog, prefs: Preferences) -> Result<Self, ValidationError> {
        validate_catalog(&catalog)?;
        let modifiers = PrestigeModifiers::from_preferences(&prefs);
        let progression = ProgressionTracker::new(&catalog, &cfg, &prefs);

        let mut customer_cfg = cfg.customers.clone();
        customer_cfg.starting_reputation =
            clamp_score(customer_cfg.starting_reputation * modifiers.reputation_multiplier);
        let customers = CustomerFlow::new(catalog.customer_types.clone(), &customer_cfg);

        let mut supply = SupplyChain::new(catalog.suppliers.clone(), catalog.competitors.clone(), &cfg.supply);
        if modifiers.has_feature(PREMIUM_SUPPLIER_FEATURE) {
            let premium = catalog
                .suppliers
                .iter()
                .find(|s| s.kind == SupplierKind::Premium)
                .map(|s| s.name.clone());
            if let Some(name) = premium {
                if let Err(e) = supply.select_supplier(&name) {
                    warn!(supplier = %name, error = %e, "premium supplier bonus not applied");
                }
            }
        }

        let mut workforce = WorkforcePool::new(cfg.workforce.clone());
        workforce.set_loyalty_bonus(hire_loyalty_bonus(&prefs));
        let shop = Monetization::new(catalog.cosmetics.clone(), cfg.monetization.clone(), &prefs);

        let starting_cash = cfg.starting_cash.saturating_add(modifiers.starting_money_bonus);
        let mut world = World::new();
        world.insert_resource(TickClock {
            clock: SimClock::new(cfg.start_date),
            days_crossed: 0,
        });
        world.insert_resource(SimRand(seeded_rng(cfg.rng_seed)));
        world.insert_resource(Ledger::new(starting_cash));
        world.insert_resource(PropertyRegistry::new(catalog.properties.clone()));
        world.insert_resource(MarketTrends::new(&cfg.market));
        world.insert_resource(supply);
        world.insert_resource(customers);
        world.insert_resource(workforce);
        world.insert_resource(EventEngine::new(catalog.events.clone(), &cfg.events));
        world.insert_resource(progression);
        world.insert_resource(PlayerNeeds::new(cfg.needs.clone()));
        world.insert_resource(SocialHubs::new(catalog.contacts.clone(), cfg.social.clone()));
        world.insert_resource(shop);
        world.insert_resource(Notifications::default());
        world.insert_resource(FurnitureLayout::default());
        world.insert_resource(Totals::default());
        world.insert_resource(Prefs(prefs));
        info!(
            seed = cfg.rng_seed,
            starting_cash,
            prestige_level = sim_progression::stored_level(&world.resource::<Prefs>().0),
            "simulation initialised"
        );
        world.insert_resource(Settings(cfg));
        Ok(Self {
            world,
            schedule: build_schedule(),
        })
    }

    /// Builtin catalog, no stored bonuses.
    pub fn from_config(cfg: SimConfig) -> Result<Self, ValidationError> {
        Self::new(cfg, Catalog::builtin(), Preferences::default())
    }

    pub fn set_predicate_host(&mut self, host: Box<dyn PredicateHost + Send + Sync>) {
        self.world.resource_mut::<ProgressionTracker>().set_predicate_host(host);
    }

    // ---- time ----

    pub fn tick(&mut self) {
        self.schedule.run(&mut self.world);
    }

    pub fn run_ticks(&mut self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Tick until `days` more day boundaries have passed. Returns the days
    /// actually advanced (0 when the tick length is not positive).
    pub fn run_days(&mut self, days: u32) -> u32 {
        let dt = self.world.resource::<Settings>().0.tick_seconds;
        if !dt.is_finite() || dt <= 0.0 {
            warn!(dt, "tick length must be positive");
            return 0;
        }
        let start = self.day();
        let target = start.saturating_add(days);
        while self.day() < target {
            self.tick();
        }
        self.day() - start
    }

    pub fn day(&self) -> u32 {
        self.world.resource::<TickClock>().clock.day()
    }

    pub fn clock(&self) -> &SimClock {
        &self.world.resource::<TickClock>().clock
    }

    // ---- read access ----

    pub fn cash(&self) -> i64 {
        self.ledger().cash()
    }

    pub fn ledger(&self) -> &Ledger {
        self.world.resource::<Ledger>()
    }

    pub fn properties(&self) -> &PropertyRegistry {
        self.world.resource::<PropertyRegistry>()
    }

    pub fn supply(&self) -> &SupplyChain {
        self.world.resource::<SupplyChain>()
    }

    pub fn customers(&self) -> &CustomerFlow {
        self.world.resource::<CustomerFlow>()
    }

    pub fn workforce(&self) -> &WorkforcePool {
        self.world.resource::<WorkforcePool>()
    }

    pub fn events(&self) -> &EventEngine {
        self.world.resource::<EventEngine>()
    }

    pub fn progression(&self) -> &ProgressionTracker {
        self.world.resource::<ProgressionTracker>()
    }

    pub fn needs(&self) -> &PlayerNeeds {
        self.world.resource::<PlayerNeeds>()
    }

    pub fn social(&self) -> &SocialHubs {
        self.world.resource::<SocialHubs>()
    }

    pub fn monetization(&self) -> &Monetization {
        self.world.resource::<Monetization>()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.world.resource::<Prefs>().0
    }

    pub fn totals(&self) -> &Totals {
        self.world.resource::<Totals>()
    }

    pub fn stats(&self) -> GameStats {
        gather_stats(
            self.day(),
            self.ledger(),
            self.properties(),
            self.customers(),
            self.workforce(),
            self.progression(),
        )
    }

    pub fn snapshot(&self) -> KpiSnapshot {
        let stats = self.stats();
        let totals = self.totals();
        let progression = self.progression();
        KpiSnapshot {
            day: stats.day,
            date: self.clock().date(),
            cash: stats.cash,
            net_worth: stats.net_worth,
            property_value: stats.property_value,
            properties_owned: stats.properties_owned,
            reputation: stats.reputation,
            customers_in_store: self.customers().active_customers().len(),
            customers_served: stats.customers_served,
            sales: totals.sales,
            walkouts: totals.walkouts,
            revenue: totals.revenue,
            employees: self.workforce().len(),
            staff_efficiency: self.workforce().total_efficiency(),
            monthly_payroll: self.workforce().payroll_total(),
            payroll_paid: totals.payroll_paid,
            payroll_missed: totals.payroll_missed,
            market_demand: self.supply().effective_demand(),
            competitor_sale: self.supply().sale_active(),
            active_events: self.events().active_events().iter().map(|e| e.id.clone()).collect(),
            season: progression.season.season(),
            season_tier: progression.season.tier(),
            achievements_unlocked: progression.achievements.unlocked_count(),
            aspirations_completed: stats.aspirations_completed,
            prestige_level: stats.prestige_level,
            energy: self.needs().level(NeedKind::Energy),
            needs_critical: self.needs().is_critical(),
            networking_bonus: self.social().networking_bonus(),
            premium_currency: self.monetization().premium_currency(),
        }
    }

    /// Every notification produced since the last call, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.world.run_system_once(systems::drain_outboxes);
        std::mem::take(&mut self.world.resource_mut::<Notifications>().0)
    }

    // ---- real estate ----

    pub fn buy_property(&mut self, id: &str) -> SimResult<i64> {
        let mut state: SystemState<(ResMut<Ledger>, ResMut<PropertyRegistry>, ResMut<ProgressionTracker>)> =
            SystemState::new(&mut self.world);
        let (mut ledger, mut properties, mut progression) = state.get_mut(&mut self.world);
        let price = properties.buy_property(id, &mut ledger)?;
        progression.report_property_bought(&mut ledger);
        self.refresh_home_bonus();
        Ok(price)
    }

    pub fn rent_property(&mut self, id: &str) -> SimResult<i64> {
        self.world.resource_scope(|world, mut ledger: Mut<Ledger>| {
            world.resource_mut::<PropertyRegistry>().rent_property(id, &mut ledger)
        })
    }

    /// Move into an owned residence; its skill bonus applies from now on.
    pub fn set_current_home(&mut self, id: &str) -> SimResult<()> {
        self.world.resource_mut::<PropertyRegistry>().set_current_home(id)?;
        self.refresh_home_bonus();
        Ok(())
    }

    /// Re-derive the skill gain bonus from whichever home is current.
    fn refresh_home_bonus(&mut self) {
        let bonus = self
            .properties()
            .current_home()
            .map(|h| h.skill_gain_bonus)
            .unwrap_or(0.0);
        self.world.resource_mut::<ProgressionTracker>().skills.set_gain_bonus(bonus);
    }

    // ---- store ----

    pub fn select_supplier(&mut self, name: &str) -> SimResult<()> {
        self.world.resource_mut::<SupplyChain>().select_supplier(name)
    }

    pub fn set_supplier_available(&mut self, name: &str, available: bool) -> SimResult<()> {
        self.world
            .resource_mut::<SupplyChain>()
            .set_supplier_available(name, available)
    }

    /// Order `quantity` units of `item` whose list price is `base_cost`.
    /// The supplier markup applies, then any running discount. With
    /// instant delivery the goods are shelved at once and 0 is returned.
    pub fn place_order(&mut self, item: &str, quantity: u32, base_cost: i64) -> SimResult<u32> {
        let mut state: SystemState<(
            ResMut<SupplyChain>,
            ResMut<Ledger>,
            ResMut<SimRand>,
            ResMut<ProgressionTracker>,
            ResMut<CustomerFlow>,
            Res<Monetization>,
        )> = SystemState::new(&mut self.world);
        let (mut supply, mut ledger, mut rng, mut progression, mut customers, shop) =
            state.get_mut(&mut self.world);
        let cost = promo_price(supply.quote(base_cost), shop.current_discount());
        let days = supply.place_order(item, quantity, cost, &mut ledger, &mut rng.0)?;
        progression.use_skill(SkillKind::Logistics);
        if shop.has_instant_delivery() {
            if let Some(arrived) = supply.complete_delivery(item) {
                customers.restock(arrived);
            }
            return Ok(0);
        }
        Ok(days)
    }

    pub fn update_store_conditions(&mut self, cleanliness: f32, stock: f32, price_level: f32) {
        self.world
            .resource_mut::<CustomerFlow>()
            .update_store_conditions(cleanliness, stock, price_level);
    }

    // ---- workforce ----

    pub fn hire_employee(&mut self, role: EmployeeRole) -> SimResult<EmployeeId> {
        let mut state: SystemState<(ResMut<WorkforcePool>, ResMut<Ledger>, ResMut<SimRand>)> =
            SystemState::new(&mut self.world);
        let (mut workforce, mut ledger, mut rng) = state.get_mut(&mut self.world);
        workforce.hire_employee(role, &mut ledger, &mut rng.0)
    }

    pub fn fire_employee(&mut self, id: EmployeeId) -> SimResult<Employee> {
        self.world.resource_mut::<WorkforcePool>().fire_employee(id)
    }

    pub fn promote_employee(&mut self, id: EmployeeId) -> SimResult<u8> {
        self.world.resource_mut::<WorkforcePool>().promote_employee(id)
    }

    pub fn offer_raise(&mut self, id: EmployeeId, amount: Decimal) -> SimResult<()> {
        self.world.resource_scope(|world, mut ledger: Mut<Ledger>| {
            world
                .resource_mut::<WorkforcePool>()
                .offer_raise(id, amount, &mut ledger)
        })
    }

    pub fn offer_partnership(&mut self, id: EmployeeId) -> SimResult<()> {
        self.world.resource_mut::<WorkforcePool>().offer_partnership(id)
    }

    // ---- events ----

    pub fn trigger_event(&mut self, id: &str) -> SimResult<()> {
        let mut state: SystemState<(ResMut<EventEngine>, ResMut<Ledger>, ResMut<CustomerFlow>)> =
            SystemState::new(&mut self.world);
        let (mut events, mut ledger, mut customers) = state.get_mut(&mut self.world);
        events.trigger_event(id, &mut ledger, &mut customers)
    }

    // ---- progression ----

    pub fn activate_aspiration(&mut self, id: &str) -> SimResult<()> {
        self.world.resource_mut::<ProgressionTracker>().activate_aspiration(id)
    }

    pub fn purchase_season_premium(&mut self) -> bool {
        self.world.resource_mut::<ProgressionTracker>().purchase_season_premium()
    }

    pub fn use_skill(&mut self, kind: SkillKind) -> u32 {
        self.world.resource_mut::<ProgressionTracker>().use_skill(kind)
    }

    /// Soft reset for permanent bonuses. The updated preferences should be
    /// persisted by the caller.
    pub fn enter_prestige(&mut self) -> SimResult<Vec<PrestigeBonus>> {
        let starting_cash = self.world.resource::<Settings>().0.starting_cash;
        let mut state: SystemState<(
            ResMut<ProgressionTracker>,
            ResMut<Ledger>,
            ResMut<PropertyRegistry>,
            ResMut<Prefs>,
            ResMut<SimRand>,
        )> = SystemState::new(&mut self.world);
        let (mut progression, mut ledger, mut properties, mut prefs, mut rng) = state.get_mut(&mut self.world);
        let granted =
            progression.enter_prestige(&mut ledger, &mut properties, &mut prefs.0, starting_cash, &mut rng.0)?;
        self.refresh_home_bonus();
        let bonus = hire_loyalty_bonus(self.preferences());
        self.world.resource_mut::<WorkforcePool>().set_loyalty_bonus(bonus);
        Ok(granted)
    }

    // ---- player life ----

    pub fn eat(&mut self, amount: f32) -> f32 {
        self.world.resource_mut::<PlayerNeeds>().eat(amount)
    }

    pub fn clean(&mut self, amount: f32) -> f32 {
        self.world.resource_mut::<PlayerNeeds>().clean(amount)
    }

    /// Sleep for `hours`; the current home's recovery rate scales the
    /// energy regained. Returns the energy gained.
    pub fn sleep(&mut self, hours: f32) -> f32 {
        let rate = self
            .properties()
            .current_home()
            .map(|h| h.energy_recovery_rate)
            .unwrap_or(NO_HOME_RECOVERY);
        let per_hour = self.world.resource::<Settings>().0.needs.sleep_energy_per_hour;
        self.world
            .resource_mut::<PlayerNeeds>()
            .sleep(hours.max(0.0) * per_hour * rate)
    }

    /// Pay into a hub. Tops up the social need; meeting a regular trains
    /// charisma.
    pub fn enter_hub(&mut self, hub: HubKind) -> SimResult<HubVisit> {
        let restore = self.world.resource::<Settings>().0.social.social_restore;
        let mut state: SystemState<(
            ResMut<SocialHubs>,
            ResMut<Ledger>,
            ResMut<SimRand>,
            ResMut<PlayerNeeds>,
            ResMut<ProgressionTracker>,
        )> = SystemState::new(&mut self.world);
        let (mut social, mut ledger, mut rng, mut needs, mut progression) = state.get_mut(&mut self.world);
        let visit = social.enter_hub(hub, &mut ledger, &mut rng.0)?;
        needs.socialize(restore);
        if visit.met.is_some() {
            progression.use_skill(SkillKind::Charisma);
        }
        Ok(visit)
    }

    pub fn leave_hub(&mut self) {
        self.world.resource_mut::<SocialHubs>().leave_hub();
    }

    /// Network with a contact in the current hub; trains negotiation.
    pub fn network_with(&mut self, name: &str) -> SimResult<NetworkOutcome> {
        let mut state: SystemState<(ResMut<SocialHubs>, ResMut<SimRand>, ResMut<ProgressionTracker>)> =
            SystemState::new(&mut self.world);
        let (mut social, mut rng, mut progression) = state.get_mut(&mut self.world);
        let outcome = social.network_with(name, &mut rng.0)?;
        progression.use_skill(SkillKind::Negotiation);
        Ok(outcome)
    }

    // ---- premium shop ----

    pub fn watch_rewarded_ad(&mut self) {
        self.world.resource_mut::<Monetization>().watch_rewarded_ad();
        self.persist_shop();
    }

    pub fn purchase_premium_currency(&mut self, amount: u32) {
        self.world.resource_mut::<Monetization>().purchase_premium_currency(amount);
        self.persist_shop();
    }

    pub fn purchase_cosmetic(&mut self, id: &str) -> SimResult<()> {
        self.world.resource_mut::<Monetization>().purchase_cosmetic(id)?;
        self.persist_shop();
        Ok(())
    }

    pub fn unlock_instant_delivery(&mut self) {
        self.world.resource_mut::<Monetization>().unlock_instant_delivery();
        self.persist_shop();
    }

    pub fn unlock_double_experience(&mut self, hours: f32) {
        self.world.resource_mut::<Monetization>().unlock_double_experience(hours);
        self.persist_shop();
    }

    /// Mirror the shop into preferences and the experience boost.
    fn persist_shop(&mut self) {
        self.world.resource_scope(|world, shop: Mut<Monetization>| {
            shop.store(&mut world.resource_mut::<Prefs>().0);
            world
                .resource_mut::<ProgressionTracker>()
                .set_experience_boost(shop.experience_multiplier());
        });
    }

    // ---- furniture ----

    pub fn furniture(&self) -> &[FurnitureRecord] {
        &self.world.resource::<FurnitureLayout>().0
    }

    pub fn place_furniture(&mut self, record: FurnitureRecord) {
        self.world.resource_mut::<FurnitureLayout>().0.push(record);
    }

    pub fn remove_furniture(&mut self, index: usize) -> Option<FurnitureRecord> {
        let mut layout = self.world.resource_mut::<FurnitureLayout>();
        (index < layout.0.len()).then(|| layout.0.remove(index))
    }

    // ---- save ----

    pub fn capture_save(&self) -> SaveData {
        SaveData {
            cash: self.cash(),
            owned_property_ids: self.properties().owned_ids(),
            furniture: self.furniture().to_vec(),
        }
    }

    /// Apply a save on top of the fresh world. Returns how many owned
    /// properties were restored.
    pub fn restore_save(&mut self, save: &SaveData) -> usize {
        self.world.resource_mut::<Ledger>().set_cash(save.cash);
        let restored = self
            .world
            .resource_mut::<PropertyRegistry>()
            .restore_ownership(&save.owned_property_ids);
        self.refresh_home_bonus();
        self.world.resource_mut::<FurnitureLayout>().0 = save.furniture.clone();
        info!(cash = save.cash, restored, "save restored");
        restored
    }
}
