//! World resources and the per-tick systems, in schedule order.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use persistence::FurnitureRecord;
use sim_core::{GameStats, Notification, Preferences, SimClock, SimConfig, SimRng};
use sim_econ::{Ledger, MarketTrends, PropertyRegistry, SupplyChain};
use sim_life::{Monetization, PlayerNeeds, SocialHubs};
use sim_progression::ProgressionTracker;
use sim_store::{CustomerFlow, EventEngine, WorkforcePool};
use tracing::debug;

#[derive(Resource, Debug, Clone)]
pub struct Settings(pub SimConfig);

#[derive(Resource, Debug, Clone)]
pub struct TickClock {
    pub clock: SimClock,
    /// Day boundaries crossed by the current tick.
    pub days_crossed: u32,
}

#[derive(Resource, Debug)]
pub struct SimRand(pub SimRng);

/// Notifications drained from every component, oldest first.
#[derive(Resource, Debug, Default)]
pub struct Notifications(pub Vec<Notification>);

/// Placed furniture, stored for the presentation layer.
#[derive(Resource, Debug, Default, Clone)]
pub struct FurnitureLayout(pub Vec<FurnitureRecord>);

#[derive(Resource, Debug, Default, Clone)]
pub struct Prefs(pub Preferences);

/// Running totals reported in the KPI snapshot.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct Totals {
    pub revenue: i64,
    pub sales: u64,
    pub walkouts: u64,
    pub payroll_paid: i64,
    pub payroll_missed: u32,
    pub employees_quit: u32,
}

/// Aggregate the live state read by progression.
pub fn gather_stats(
    day: u32,
    ledger: &Ledger,
    properties: &PropertyRegistry,
    customers: &CustomerFlow,
    workforce: &WorkforcePool,
    progression: &ProgressionTracker,
) -> GameStats {
    let property_value = properties.total_property_value_units();
    let mut stats = GameStats {
        cash: ledger.cash(),
        net_worth: ledger.cash().saturating_add(property_value),
        property_value,
        properties_owned: properties.owned_count(),
        reputation: customers.reputation(),
        employees: workforce.len() as u32,
        qualified_employees: workforce.qualified_count(),
        customers_served: customers.customers_served(),
        lifetime_income: ledger.lifetime_income(),
        day,
        ..GameStats::default()
    };
    progression.fill_stats(&mut stats);
    stats
}

pub fn advance_clock(settings: Res<Settings>, mut clock: ResMut<TickClock>) {
    let crossed = clock.clock.advance(settings.0.tick_seconds);
    clock.days_crossed = crossed;
}

/// Payroll, appreciation, deliveries, challenge reset and employee demands
/// for every day boundary the tick crossed.
#[allow(clippy::too_many_arguments)]
pub fn day_boundary(
    settings: Res<Settings>,
    clock: Res<TickClock>,
    mut rng: ResMut<SimRand>,
    mut ledger: ResMut<Ledger>,
    mut properties: ResMut<PropertyRegistry>,
    mut supply: ResMut<SupplyChain>,
    mut customers: ResMut<CustomerFlow>,
    mut workforce: ResMut<WorkforcePool>,
    mut progression: ResMut<ProgressionTracker>,
    mut totals: ResMut<Totals>,
) {
    if clock.days_crossed == 0 {
        return;
    }
    let today = clock.clock.day();
    let interval = settings.0.payroll_interval_days.max(1);
    let rng = &mut rng.0;
    for day in (today + 1 - clock.days_crossed)..=today {
        if day % interval == 0 {
            match workforce.process_payroll(&mut ledger) {
                Ok(paid) => totals.payroll_paid += paid,
                Err(e) => {
                    debug!(day, error = %e, "payroll skipped");
                    totals.payroll_missed += 1;
                }
            }
        }
        properties.process_daily_tick();
        for (item, quantity) in supply.process_day_end(rng) {
            debug!(day, item = %item, quantity, "restocking shelves");
            customers.restock(quantity);
        }
        progression.on_day();
        workforce.check_employee_demands(rng);
    }
}

pub fn market_system(
    settings: Res<Settings>,
    mut rng: ResMut<SimRand>,
    mut trends: ResMut<MarketTrends>,
    mut properties: ResMut<PropertyRegistry>,
    mut supply: ResMut<SupplyChain>,
) {
    if trends.tick(settings.0.tick_seconds, &mut rng.0) {
        properties.apply_trends(&trends);
    }
    supply.roll_competitor_sale(&mut rng.0);
}

/// Needs decay and boost timers; the experience boost follows the shop.
pub fn life_system(
    settings: Res<Settings>,
    mut needs: ResMut<PlayerNeeds>,
    mut shop: ResMut<Monetization>,
    mut progression: ResMut<ProgressionTracker>,
) {
    needs.tick(settings.0.tick_seconds);
    shop.tick(settings.0.tick_seconds);
    progression.set_experience_boost(shop.experience_multiplier());
}

/// Spawn, age and check out customers; satisfied visits are sales.
#[allow(clippy::too_many_arguments)]
pub fn customer_system(
    settings: Res<Settings>,
    mut rng: ResMut<SimRand>,
    mut ledger: ResMut<Ledger>,
    mut customers: ResMut<CustomerFlow>,
    supply: Res<SupplyChain>,
    events: Res<EventEngine>,
    mut progression: ResMut<ProgressionTracker>,
    mut totals: ResMut<Totals>,
) {
    let rng = &mut rng.0;
    customers.tick(settings.0.tick_seconds, rng);
    let demand =
        supply.effective_demand() * events.demand_multiplier() * progression.season.demand_multiplier();
    let price = events.price_multiplier();
    for visit in customers.resolve_visits(demand, rng) {
        if !visit.satisfied {
            totals.walkouts += 1;
            continue;
        }
        let spend = (visit.spend as f32 * price).round() as i64;
        if spend > 0 {
            ledger.add_money(spend);
            progression.report_money_earned(spend, &mut ledger);
            totals.revenue += spend;
        }
        totals.sales += 1;
        progression.report_customer_served(&mut ledger);
    }
}

pub fn workforce_system(
    settings: Res<Settings>,
    mut rng: ResMut<SimRand>,
    mut workforce: ResMut<WorkforcePool>,
    mut totals: ResMut<Totals>,
) {
    let quit = workforce.tick(settings.0.tick_seconds, &mut rng.0);
    totals.employees_quit += quit.len() as u32;
}

pub fn events_system(
    settings: Res<Settings>,
    mut rng: ResMut<SimRand>,
    mut ledger: ResMut<Ledger>,
    mut customers: ResMut<CustomerFlow>,
    mut events: ResMut<EventEngine>,
) {
    events.tick(settings.0.tick_seconds, &mut ledger, &mut customers, &mut rng.0);
}

pub fn progression_system(
    clock: Res<TickClock>,
    mut ledger: ResMut<Ledger>,
    properties: Res<PropertyRegistry>,
    mut customers: ResMut<CustomerFlow>,
    workforce: Res<WorkforcePool>,
    mut progression: ResMut<ProgressionTracker>,
) {
    let stats = gather_stats(
        clock.clock.day(),
        &ledger,
        &properties,
        &customers,
        &workforce,
        &progression,
    );
    progression.evaluate(&stats, &mut ledger, &mut customers);
}

/// Move every component outbox into the shared queue.
#[allow(clippy::too_many_arguments)]
pub fn drain_outboxes(
    mut queue: ResMut<Notifications>,
    mut ledger: ResMut<Ledger>,
    mut properties: ResMut<PropertyRegistry>,
    mut supply: ResMut<SupplyChain>,
    mut customers: ResMut<CustomerFlow>,
    mut workforce: ResMut<WorkforcePool>,
    mut events: ResMut<EventEngine>,
    mut progression: ResMut<ProgressionTracker>,
    mut needs: ResMut<PlayerNeeds>,
    mut social: ResMut<SocialHubs>,
    mut shop: ResMut<Monetization>,
) {
    queue.0.extend(ledger.drain_notifications());
    queue.0.extend(properties.drain_notifications());
    queue.0.extend(supply.drain_notifications());
    queue.0.extend(customers.drain_notifications());
    queue.0.extend(workforce.drain_notifications());
    queue.0.extend(events.drain_notifications());
    queue.0.extend(progression.drain_notifications());
    queue.0.extend(needs.drain_notifications());
    queue.0.extend(social.drain_notifications());
    queue.0.extend(shop.drain_notifications());
}

/// One tick: clock, day-boundary work, market, player life, customers,
/// workforce, events, progression, notification drain.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            advance_clock,
            day_boundary,
            market_system,
            life_system,
            customer_system,
            workforce_system,
            events_system,
            progression_system,
            drain_outboxes,
        )
            .chain(),
    );
    schedule
}
