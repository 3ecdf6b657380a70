#![deny(warnings)]

//! The store floor: customer flow and reputation, the employee roster, and
//! timed store events.

pub mod customers;
pub mod events;
pub mod workforce;

pub use customers::{ActiveCustomer, CustomerFlow, VisitOutcome};
pub use events::{ActiveEvent, EventEngine};
pub use workforce::{Employee, WorkforcePool, MAX_SKILL};
