//! Suppliers, pending deliveries, market demand drift and competitor sales.

use crate::ledger::Ledger;
use bevy_ecs::prelude::Resource;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{clamp_chance, Competitor, Notification, Outbox, SimError, SimResult, Supplier, SupplyConfig};
use std::collections::BTreeMap;
use std::f64::consts::TAU;
use tracing::{debug, info, warn};

/// Bounds of the market demand random walk.
pub const DEMAND_BOUNDS: (f32, f32) = (0.5, 2.0);
/// Demand factor applied while a competitor sale runs.
pub const SALE_DEMAND_FACTOR: f32 = 0.8;

/// Goods on their way from a supplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDelivery {
    pub days_remaining: u32,
    pub quantity: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CompetitorSale {
    competitor: usize,
    days_remaining: u32,
}

#[derive(Debug, Resource)]
pub struct SupplyChain {
    suppliers: Vec<Supplier>,
    current: Option<usize>,
    pending: BTreeMap<String, PendingDelivery>,
    competitors: Vec<Competitor>,
    sale: Option<CompetitorSale>,
    market_demand: f32,
    seasonal_demand: f32,
    competitor_factor: f32,
    day: u32,
    demand_volatility: f32,
    sale_chance_per_tick: f64,
    outbox: Outbox,
}

impl SupplyChain {
    pub fn new(suppliers: Vec<Supplier>, competitors: Vec<Competitor>, cfg: &SupplyConfig) -> Self {
        let current = cfg
            .default_supplier
            .as_deref()
            .and_then(|name| suppliers.iter().position(|s| s.name == name && s.available));
        Self {
            suppliers,
            current,
            pending: BTreeMap::new(),
            competitors,
            sale: None,
            market_demand: 1.0,
            seasonal_demand: 1.0,
            competitor_factor: 1.0,
            day: 0,
            demand_volatility: cfg.demand_volatility.abs(),
            sale_chance_per_tick: clamp_chance(cfg.competitor_sale_chance_per_tick),
            outbox: Outbox::default(),
        }
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn competitors(&self) -> &[Competitor] {
        &self.competitors
    }

    pub fn current_supplier(&self) -> Option<&Supplier> {
        self.current.and_then(|i| self.suppliers.get(i))
    }

    /// Make `name` the supplier for every subsequent order.
    pub fn select_supplier(&mut self, name: &str) -> SimResult<()> {
        let idx = self
            .suppliers
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| SimError::unknown(format!("supplier {name}")))?;
        if !self.suppliers[idx].available {
            return Err(SimError::ineligible(format!("{name} is unavailable")));
        }
        self.current = Some(idx);
        self.outbox.push(Notification::SupplierSelected {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Toggle a supplier's availability. Deselects it when disabled.
    pub fn set_supplier_available(&mut self, name: &str, available: bool) -> SimResult<()> {
        let idx = self
            .suppliers
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| SimError::unknown(format!("supplier {name}")))?;
        self.suppliers[idx].available = available;
        if !available && self.current == Some(idx) {
            self.current = None;
        }
        Ok(())
    }

    /// Cost of goods worth `base_cost` from the current supplier.
    pub fn quote(&self, base_cost: i64) -> i64 {
        match self.current_supplier() {
            Some(s) => crate::marked_up(base_cost, s.price_multiplier),
            None => base_cost,
        }
    }

    /// Order `quantity` of `item` for `cost` from the current supplier.
    ///
    /// A failed reliability roll schedules nothing and charges nothing.
    /// Funds are checked before the delivery is recorded. Returns the
    /// days until the (possibly merged) delivery arrives.
    pub fn place_order<R: Rng + ?Sized>(
        &mut self,
        item: &str,
        quantity: u32,
        cost: i64,
        ledger: &mut Ledger,
        rng: &mut R,
    ) -> SimResult<u32> {
        let supplier = self
            .current_supplier()
            .ok_or_else(|| SimError::ineligible("no supplier selected"))?
            .clone();
        let roll: f32 = rng.gen();
        if roll > supplier.reliability {
            warn!(item, supplier = %supplier.name, roll, "order failed reliability roll");
            self.outbox.push(Notification::OrderFailed {
                item: item.to_string(),
                supplier: supplier.name.clone(),
            });
            return Err(SimError::StochasticFailure(format!(
                "{} could not fill the order for {item}",
                supplier.name
            )));
        }
        ledger.try_spend(cost)?;
        let entry = self.pending.entry(item.to_string()).or_insert(PendingDelivery {
            days_remaining: 0,
            quantity: 0,
        });
        entry.days_remaining = entry.days_remaining.saturating_add(supplier.delivery_time_days);
        entry.quantity = entry.quantity.saturating_add(quantity);
        let days = entry.days_remaining;
        info!(item, quantity, cost, days, "order placed");
        self.outbox.push(Notification::OrderPlaced {
            item: item.to_string(),
            quantity,
            days,
        });
        Ok(days)
    }

    pub fn pending(&self, item: &str) -> Option<&PendingDelivery> {
        self.pending.get(item)
    }

    pub fn pending_deliveries(&self) -> impl Iterator<Item = (&str, &PendingDelivery)> {
        self.pending.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Deliver the pending order for `item` right away.
    pub fn complete_delivery(&mut self, item: &str) -> Option<u32> {
        let d = self.pending.remove(item)?;
        debug!(item, quantity = d.quantity, "delivery completed early");
        self.outbox.push(Notification::DeliveryArrived {
            item: item.to_string(),
            quantity: d.quantity,
        });
        Some(d.quantity)
    }

    /// Day boundary: count deliveries down, drift demand, age a running
    /// competitor sale. Returns the deliveries that arrived.
    pub fn process_day_end<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<(String, u32)> {
        for delivery in self.pending.values_mut() {
            delivery.days_remaining = delivery.days_remaining.saturating_sub(1);
        }
        let arrived: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, d)| d.days_remaining == 0)
            .map(|(k, _)| k.clone())
            .collect();
        let mut out = Vec::with_capacity(arrived.len());
        for item in arrived {
            if let Some(d) = self.pending.remove(&item) {
                debug!(item = %item, quantity = d.quantity, "delivery arrived");
                self.outbox.push(Notification::DeliveryArrived {
                    item: item.clone(),
                    quantity: d.quantity,
                });
                out.push((item, d.quantity));
            }
        }

        self.day = self.day.saturating_add(1);
        let step = if self.demand_volatility > 0.0 {
            rng.gen_range(-self.demand_volatility..=self.demand_volatility)
        } else {
            0.0
        };
        self.market_demand = (self.market_demand + step).clamp(DEMAND_BOUNDS.0, DEMAND_BOUNDS.1);
        self.seasonal_demand = seasonal_factor(self.day);

        if let Some(sale) = self.sale.as_mut() {
            sale.days_remaining = sale.days_remaining.saturating_sub(1);
            if sale.days_remaining == 0 {
                self.end_competitor_sale();
            }
        }
        out
    }

    /// Per-tick chance that a competitor starts a sale. Returns true if one began.
    pub fn roll_competitor_sale<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.sale.is_some() || self.competitors.is_empty() {
            return false;
        }
        if !rng.gen_bool(self.sale_chance_per_tick) {
            return false;
        }
        self.start_competitor_sale(rng)
    }

    /// Start a 3 to 7 day sale at a random competitor.
    pub fn start_competitor_sale<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.sale.is_some() || self.competitors.is_empty() {
            return false;
        }
        let idx = rng.gen_range(0..self.competitors.len());
        let days = rng.gen_range(3..=7);
        let comp = &mut self.competitors[idx];
        comp.is_having_sale = true;
        comp.sale_discount = rng.gen_range(0.1..0.3);
        let name = comp.name.clone();
        self.competitor_factor *= SALE_DEMAND_FACTOR;
        self.sale = Some(CompetitorSale {
            competitor: idx,
            days_remaining: days,
        });
        info!(competitor = %name, days, "competitor sale started");
        self.outbox.push(Notification::CompetitorSaleStarted {
            competitor: name,
            days,
        });
        true
    }

    fn end_competitor_sale(&mut self) {
        if let Some(sale) = self.sale.take() {
            if let Some(comp) = self.competitors.get_mut(sale.competitor) {
                comp.is_having_sale = false;
            }
            self.competitor_factor /= SALE_DEMAND_FACTOR;
            self.outbox.push(Notification::CompetitorSaleEnded);
        }
    }

    pub fn market_demand(&self) -> f32 {
        self.market_demand
    }

    pub fn seasonal_demand(&self) -> f32 {
        self.seasonal_demand
    }

    pub fn competitor_factor(&self) -> f32 {
        self.competitor_factor
    }

    pub fn sale_active(&self) -> bool {
        self.sale.is_some()
    }

    pub fn effective_demand(&self) -> f32 {
        self.market_demand * self.competitor_factor * self.seasonal_demand
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain()
    }
}

/// Yearly demand cycle, `1 + 0.2 sin(2 pi day / 365)`.
pub fn seasonal_factor(day: u32) -> f32 {
    (1.0 + 0.2 * (TAU * f64::from(day) / 365.0).sin()) as f32
}
