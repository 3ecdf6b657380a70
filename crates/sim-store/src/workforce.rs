//! Employee roster: hiring, morale, promotions and payroll.

use bevy_ecs::prelude::Resource;
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{
    clamp_chance, clamp_score, EmployeeId, EmployeeRole, Notification, Outbox, SimError, SimResult,
    WorkforceConfig,
};
use sim_econ::{to_units, Ledger};
use tracing::{info, warn};

/// Highest skill level an employee can reach.
pub const MAX_SKILL: u8 = 10;

/// A hired employee.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: EmployeeRole,
    /// Skill in `[1, 10]`.
    pub skill_level: u8,
    /// Monthly salary.
    pub salary: Decimal,
    pub desired_salary: Decimal,
    /// Retention, `[0, 100]`.
    pub loyalty: f32,
    /// Drives performance, `[0, 100]`.
    pub morale: f32,
    /// `(morale / 100) * (skill / 10)`.
    pub performance: f32,
    pub wants_promotion: bool,
    pub wants_partnership: bool,
}

impl Employee {
    fn recompute_performance(&mut self) {
        self.performance = (self.morale / 100.0) * (f32::from(self.skill_level) / 10.0);
    }

    /// Loyal and skilled enough to count toward staffing goals.
    pub fn is_qualified(&self) -> bool {
        self.loyalty >= 90.0 && self.skill_level >= 8
    }

    /// Eligible to be offered a partnership.
    pub fn partnership_eligible(&self) -> bool {
        self.skill_level >= 7 && self.loyalty >= 80.0
    }
}

#[derive(Debug, Resource)]
pub struct WorkforcePool {
    employees: Vec<Employee>,
    cfg: WorkforceConfig,
    next_id: u32,
    loyalty_bonus: f32,
    outbox: Outbox,
}

impl WorkforcePool {
    pub fn new(cfg: WorkforceConfig) -> Self {
        Self {
            employees: Vec::new(),
            cfg,
            next_id: 1,
            loyalty_bonus: 0.0,
            outbox: Outbox::default(),
        }
    }

    /// Extra starting loyalty for every subsequent hire.
    pub fn set_loyalty_bonus(&mut self, bonus: f32) {
        self.loyalty_bonus = if bonus.is_finite() { bonus.max(0.0) } else { 0.0 };
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn get(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: EmployeeId) -> SimResult<&mut Employee> {
        self.employees
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| SimError::unknown(format!("employee {id}")))
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Hire a new employee for `role` with randomized starting stats.
    pub fn hire_employee<R: Rng + ?Sized>(
        &mut self,
        role: EmployeeRole,
        ledger: &mut Ledger,
        rng: &mut R,
    ) -> SimResult<EmployeeId> {
        if self.employees.len() >= self.cfg.max_employees {
            return Err(SimError::CapacityExceeded(format!(
                "roster full at {}",
                self.cfg.max_employees
            )));
        }
        ledger.try_spend(self.cfg.hiring_cost)?;
        let base = role.base_salary();
        let markup = Decimal::from_f32(rng.gen_range(1.0f32..1.3)).unwrap_or(Decimal::ONE);
        let employee = Employee {
            id: EmployeeId(self.next_id),
            name: self.generate_name(rng),
            role,
            skill_level: rng.gen_range(1..=5),
            salary: base,
            desired_salary: (base * markup).round_dp(2),
            loyalty: rng.gen_range(40.0..70.0) + self.loyalty_bonus,
            morale: rng.gen_range(50.0..80.0),
            performance: 0.0,
            wants_promotion: false,
            wants_partnership: false,
        };
        Ok(self.add_employee(employee))
    }

    /// Put an already-built employee on the roster, assigning a fresh id.
    pub fn add_employee(&mut self, mut employee: Employee) -> EmployeeId {
        employee.id = EmployeeId(self.next_id);
        self.next_id += 1;
        employee.skill_level = employee.skill_level.clamp(1, MAX_SKILL);
        employee.loyalty = clamp_score(employee.loyalty);
        employee.morale = clamp_score(employee.morale);
        employee.recompute_performance();
        let id = employee.id;
        info!(employee = %id, name = %employee.name, role = ?employee.role, "employee hired");
        self.outbox.push(Notification::EmployeeHired {
            id,
            name: employee.name.clone(),
        });
        self.employees.push(employee);
        id
    }

    fn generate_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let first = &self.cfg.first_names;
        let last = &self.cfg.last_names;
        if first.is_empty() || last.is_empty() {
            return format!("Employee {}", self.next_id);
        }
        format!(
            "{} {}",
            first[rng.gen_range(0..first.len())],
            last[rng.gen_range(0..last.len())]
        )
    }

    /// Dismiss employee `id`.
    pub fn fire_employee(&mut self, id: EmployeeId) -> SimResult<Employee> {
        let pos = self
            .employees
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| SimError::unknown(format!("employee {id}")))?;
        let mut employee = self.employees.remove(pos);
        employee.loyalty = 0.0;
        info!(employee = %id, "employee fired");
        self.outbox.push(Notification::EmployeeFired {
            id,
            name: employee.name.clone(),
        });
        Ok(employee)
    }

    /// Raise skill by one level. At the skill cap nothing changes.
    pub fn promote_employee(&mut self, id: EmployeeId) -> SimResult<u8> {
        let e = self.get_mut(id)?;
        if e.skill_level >= MAX_SKILL {
            return Err(SimError::ineligible(format!("{id} is at max skill")));
        }
        e.skill_level += 1;
        e.salary = (e.salary * Decimal::new(12, 1)).round_dp(2);
        e.morale = clamp_score(e.morale + 20.0);
        e.loyalty = clamp_score(e.loyalty + 10.0);
        e.wants_promotion = false;
        e.recompute_performance();
        let level = e.skill_level;
        self.outbox.push(Notification::EmployeePromoted {
            id,
            skill_level: level,
        });
        Ok(level)
    }

    /// Pay a one-off raise of `amount` and add it to the salary.
    pub fn offer_raise(&mut self, id: EmployeeId, amount: Decimal, ledger: &mut Ledger) -> SimResult<()> {
        if amount <= Decimal::ZERO {
            return Err(SimError::ineligible("raise must be positive"));
        }
        // Look the employee up before charging so a bad id costs nothing.
        self.get_mut(id)?;
        ledger.try_spend(to_units(amount))?;
        let e = self.get_mut(id)?;
        e.salary += amount;
        e.loyalty = clamp_score(e.loyalty + 15.0);
        e.morale = clamp_score(e.morale + 10.0);
        e.recompute_performance();
        Ok(())
    }

    /// Form a partnership with a senior, loyal employee.
    pub fn offer_partnership(&mut self, id: EmployeeId) -> SimResult<()> {
        let e = self.get_mut(id)?;
        if !e.partnership_eligible() {
            return Err(SimError::ineligible(format!(
                "{id} needs skill >= 7 and loyalty >= 80"
            )));
        }
        e.wants_partnership = false;
        self.outbox.push(Notification::PartnershipFormed { id });
        Ok(())
    }

    /// Sum of every salary, in whole units.
    pub fn payroll_total(&self) -> i64 {
        to_units(self.employees.iter().map(|e| e.salary).sum())
    }

    /// Pay everyone in one debit. When funds are short nobody is paid.
    pub fn process_payroll(&mut self, ledger: &mut Ledger) -> SimResult<i64> {
        let total = self.payroll_total();
        if total == 0 {
            return Ok(0);
        }
        if let Err(e) = ledger.try_spend(total) {
            warn!(total, cash = ledger.cash(), "payroll missed");
            return Err(e);
        }
        self.outbox.push(Notification::PayrollProcessed { total });
        Ok(total)
    }

    /// Per-tick update: morale decays, performance follows, disloyal
    /// employees may walk out. Returns who quit.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) -> Vec<Employee> {
        if !dt.is_finite() || dt <= 0.0 {
            return Vec::new();
        }
        let decay = self.cfg.morale_decay_per_sec * dt as f32;
        let threshold = self.cfg.quit_loyalty_threshold;
        let chance = clamp_chance(self.cfg.quit_chance_per_tick);
        let mut quitters = Vec::new();
        let mut kept = Vec::with_capacity(self.employees.len());
        for mut e in self.employees.drain(..) {
            e.morale = clamp_score(e.morale - decay);
            e.recompute_performance();
            if e.loyalty < threshold && rng.gen_bool(chance) {
                quitters.push(e);
            } else {
                kept.push(e);
            }
        }
        self.employees = kept;
        for e in &quitters {
            info!(employee = %e.id, name = %e.name, "employee quit");
            self.outbox.push(Notification::EmployeeQuit {
                id: e.id,
                name: e.name.clone(),
            });
        }
        quitters
    }

    /// Daily check for raise requests and promotion or partnership wishes.
    pub fn check_employee_demands<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for e in &mut self.employees {
            if e.salary < e.desired_salary && rng.gen_bool(0.1) {
                self.outbox.push(Notification::RaiseRequested {
                    id: e.id,
                    desired: e.desired_salary,
                });
            }
            if e.skill_level < MAX_SKILL && rng.gen_bool(0.05) {
                e.wants_promotion = true;
            }
            if e.partnership_eligible() && rng.gen_bool(0.02) {
                e.wants_partnership = true;
            }
        }
    }

    /// Summed performance of the roster.
    pub fn total_efficiency(&self) -> f32 {
        self.employees.iter().map(|e| e.performance).sum()
    }

    /// Employees with loyalty >= 90 and skill >= 8.
    pub fn qualified_count(&self) -> u32 {
        self.employees.iter().filter(|e| e.is_qualified()).count() as u32
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn staff(skill: u8, loyalty: f32) -> Employee {
        Employee {
            id: EmployeeId(0),
            name: "Sam Lee".into(),
            role: EmployeeRole::Cashier,
            skill_level: skill,
            salary: Decimal::new(800, 0),
            desired_salary: Decimal::new(900, 0),
            loyalty,
            morale: 60.0,
            performance: 0.0,
            wants_promotion: false,
            wants_partnership: false,
        }
    }

    #[test]
    fn hire_respects_capacity_and_cost() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut pool = WorkforcePool::new(WorkforceConfig {
            max_employees: 1,
            ..WorkforceConfig::default()
        });
        let mut ledger = Ledger::new(1_200);
        let id = pool.hire_employee(EmployeeRole::Manager, &mut ledger, &mut rng).unwrap();
        assert_eq!(ledger.cash(), 700);
        let e = pool.get(id).unwrap();
        assert!((1..=5).contains(&e.skill_level));
        assert!((40.0..70.0).contains(&e.loyalty));
        assert!((50.0..80.0).contains(&e.morale));
        assert_eq!(e.salary, Decimal::new(1500, 0));
        assert!(matches!(
            pool.hire_employee(EmployeeRole::Cashier, &mut ledger, &mut rng),
            Err(SimError::CapacityExceeded(_))
        ));
        assert_eq!(ledger.cash(), 700);
    }

    #[test]
    fn broke_hire_changes_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut pool = WorkforcePool::new(WorkforceConfig::default());
        let mut ledger = Ledger::new(100);
        assert!(matches!(
            pool.hire_employee(EmployeeRole::Cashier, &mut ledger, &mut rng),
            Err(SimError::InsufficientFunds { .. })
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn promotion_is_idempotent_at_cap() {
        let mut pool = WorkforcePool::new(WorkforceConfig::default());
        let id = pool.add_employee(staff(9, 50.0));
        assert_eq!(pool.promote_employee(id).unwrap(), 10);
        let before = pool.get(id).cloned().unwrap();
        assert_eq!(before.salary, Decimal::new(960, 0));
        assert!(matches!(pool.promote_employee(id), Err(SimError::Ineligible(_))));
        assert_eq!(pool.get(id), Some(&before));
    }

    #[test]
    fn disloyal_employee_eventually_quits_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let mut pool = WorkforcePool::new(WorkforceConfig::default());
        let id = pool.add_employee(staff(3, 10.0));
        pool.drain_notifications();
        let mut ticks = 0;
        while pool.get(id).is_some() && ticks < 200_000 {
            pool.tick(1.0, &mut rng);
            ticks += 1;
        }
        assert!(pool.get(id).is_none());
        for _ in 0..100 {
            pool.tick(1.0, &mut rng);
        }
        let quits = pool
            .drain_notifications()
            .into_iter()
            .filter(|n| matches!(n, Notification::EmployeeQuit { id: q, .. } if *q == id))
            .count();
        assert_eq!(quits, 1);
    }

    #[test]
    fn nan_quit_chance_keeps_everyone() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut pool = WorkforcePool::new(WorkforceConfig {
            quit_chance_per_tick: f64::NAN,
            ..WorkforceConfig::default()
        });
        let id = pool.add_employee(staff(3, 0.0));
        for _ in 0..100 {
            assert!(pool.tick(1.0, &mut rng).is_empty());
        }
        assert!(pool.get(id).is_some());
    }

    #[test]
    fn loyalty_bonus_lifts_new_hires() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut pool = WorkforcePool::new(WorkforceConfig::default());
        pool.set_loyalty_bonus(15.0);
        let mut ledger = Ledger::new(5_000);
        for _ in 0..4 {
            let id = pool.hire_employee(EmployeeRole::StockClerk, &mut ledger, &mut rng).unwrap();
            let loyalty = pool.get(id).unwrap().loyalty;
            assert!((55.0..85.0).contains(&loyalty));
        }
    }

    #[test]
    fn efficiency_sums_performance() {
        let mut pool = WorkforcePool::new(WorkforceConfig::default());
        assert_eq!(pool.total_efficiency(), 0.0);
        pool.add_employee(staff(10, 50.0));
        pool.add_employee(staff(5, 50.0));
        // morale 60: 0.6 * 1.0 + 0.6 * 0.5
        assert!((pool.total_efficiency() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn payroll_is_all_or_nothing() {
        let mut pool = WorkforcePool::new(WorkforceConfig::default());
        pool.add_employee(staff(2, 50.0));
        pool.add_employee(staff(2, 50.0));
        let mut ledger = Ledger::new(1_000);
        assert!(matches!(
            pool.process_payroll(&mut ledger),
            Err(SimError::InsufficientFunds { .. })
        ));
        assert_eq!(ledger.cash(), 1_000);
        ledger.add_money(1_000);
        assert_eq!(pool.process_payroll(&mut ledger).unwrap(), 1_600);
        assert_eq!(ledger.cash(), 400);
    }

    #[test]
    fn raise_and_partnership() {
        let mut pool = WorkforcePool::new(WorkforceConfig::default());
        let id = pool.add_employee(staff(7, 70.0));
        let mut ledger = Ledger::new(500);
        assert!(matches!(pool.offer_partnership(id), Err(SimError::Ineligible(_))));
        pool.offer_raise(id, Decimal::new(100, 0), &mut ledger).unwrap();
        assert_eq!(ledger.cash(), 400);
        let e = pool.get(id).unwrap();
        assert_eq!(e.salary, Decimal::new(900, 0));
        assert_eq!(e.loyalty, 85.0);
        pool.offer_partnership(id).unwrap();
        assert!(matches!(
            pool.offer_raise(EmployeeId(99), Decimal::ONE, &mut ledger),
            Err(SimError::UnknownEntity(_))
        ));
        assert_eq!(ledger.cash(), 400);
    }

    #[test]
    fn fired_employee_leaves_roster() {
        let mut pool = WorkforcePool::new(WorkforceConfig::default());
        let id = pool.add_employee(staff(5, 50.0));
        let gone = pool.fire_employee(id).unwrap();
        assert_eq!(gone.loyalty, 0.0);
        assert!(pool.is_empty());
        assert!(matches!(pool.fire_employee(id), Err(SimError::UnknownEntity(_))));
    }

    proptest! {
        #[test]
        fn performance_tracks_morale_and_skill(skill in 1u8..=10, morale in 0.0f32..100.0, secs in 0.1f64..500.0) {
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            let mut pool = WorkforcePool::new(WorkforceConfig::default());
            let mut e = staff(skill, 60.0);
            e.morale = morale;
            let id = pool.add_employee(e);
            pool.tick(secs, &mut rng);
            let e = pool.get(id).unwrap();
            prop_assert!((0.0..=100.0).contains(&e.morale));
            let expected = (e.morale / 100.0) * (f32::from(e.skill_level) / 10.0);
            prop_assert!((e.performance - expected).abs() < 1e-6);
        }
    }
}
