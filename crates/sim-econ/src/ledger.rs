use bevy_ecs::prelude::Resource;
use sim_core::{Notification, Outbox, SimError, SimResult};
use tracing::debug;

/// The player's cash account.
///
/// No debit ever drives `cash` below zero: `try_spend` refuses, while
/// `add_money` with a negative amount and `debit_up_to` take at most what
/// is there.
#[derive(Debug, Default, Resource)]
pub struct Ledger {
    cash: i64,
    lifetime_income: i64,
    outbox: Outbox,
}

impl Ledger {
    /// New ledger holding `starting_cash` (negative values start at 0).
    pub fn new(starting_cash: i64) -> Self {
        Self {
            cash: starting_cash.max(0),
            lifetime_income: 0,
            outbox: Outbox::default(),
        }
    }

    pub fn cash(&self) -> i64 {
        self.cash
    }

    /// Sum of every positive credit since the ledger was created.
    pub fn lifetime_income(&self) -> i64 {
        self.lifetime_income
    }

    /// Credit `amount`. Negative amounts are debited but clamped at zero
    /// cash. Returns the signed amount actually applied.
    pub fn add_money(&mut self, amount: i64) -> i64 {
        let applied = if amount >= 0 {
            self.cash = self.cash.saturating_add(amount);
            self.lifetime_income = self.lifetime_income.saturating_add(amount);
            amount
        } else {
            let taken = amount.saturating_neg().min(self.cash);
            self.cash -= taken;
            -taken
        };
        if applied != 0 {
            self.changed();
        }
        applied
    }

    /// Debit exactly `amount` or refuse. Non-positive amounts succeed
    /// without touching the balance.
    pub fn try_spend(&mut self, amount: i64) -> SimResult<()> {
        if amount <= 0 {
            return Ok(());
        }
        if self.cash < amount {
            debug!(amount, cash = self.cash, "spend refused");
            return Err(SimError::InsufficientFunds {
                needed: amount,
                available: self.cash,
            });
        }
        self.cash -= amount;
        self.changed();
        Ok(())
    }

    /// Debit as much of `amount` as the balance allows; returns what was taken.
    pub fn debit_up_to(&mut self, amount: i64) -> i64 {
        if amount <= 0 {
            return 0;
        }
        let taken = amount.min(self.cash);
        if taken > 0 {
            self.cash -= taken;
            self.changed();
        }
        taken
    }

    /// Overwrite the balance, e.g. when restoring a save or entering prestige.
    pub fn set_cash(&mut self, cash: i64) {
        let cash = cash.max(0);
        if cash != self.cash {
            self.cash = cash;
            self.changed();
        }
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain()
    }

    fn changed(&mut self) {
        self.outbox.push(Notification::MoneyChanged { cash: self.cash });
    }
}
