#![deny(warnings)]

//! The player's life outside the store: personal needs, social hubs and
//! the premium currency shop.

pub mod monetization;
pub mod needs;
pub mod social;

pub use monetization::Monetization;
pub use needs::{NeedKind, PlayerNeeds};
pub use social::{ContactState, HubVisit, NetworkOutcome, SocialHubs, MAX_RELATIONSHIP};
