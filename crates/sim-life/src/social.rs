//! Social hubs: paid visits, random crowds and contact relationships.

use bevy_ecs::prelude::Resource;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{clamp_chance, Contact, HubKind, Notification, Outbox, SimError, SimResult, SocialConfig};
use sim_econ::Ledger;
use tracing::info;

/// Highest relationship level with a contact.
pub const MAX_RELATIONSHIP: u8 = 10;

/// A contact and how well the player knows them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactState {
    pub contact: Contact,
    /// 1 to [`MAX_RELATIONSHIP`].
    pub relationship: u8,
}

/// Result of entering a hub.
#[derive(Clone, Debug, PartialEq)]
pub struct HubVisit {
    pub hub: HubKind,
    pub visitors: usize,
    /// Contact met on this visit, if any.
    pub met: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetworkOutcome {
    pub relationship: u8,
    pub partnership_offered: bool,
}

#[derive(Debug, Resource)]
pub struct SocialHubs {
    contacts: Vec<ContactState>,
    cfg: SocialConfig,
    current: Option<HubKind>,
    /// Indexes into `contacts`, in arrival order.
    visitors: Vec<usize>,
    outbox: Outbox,
}

impl SocialHubs {
    pub fn new(contacts: Vec<Contact>, cfg: SocialConfig) -> Self {
        Self {
            contacts: contacts
                .into_iter()
                .map(|contact| ContactState {
                    contact,
                    relationship: 1,
                })
                .collect(),
            cfg,
            current: None,
            visitors: Vec::new(),
            outbox: Outbox::default(),
        }
    }

    pub fn contacts(&self) -> &[ContactState] {
        &self.contacts
    }

    pub fn contact(&self, name: &str) -> Option<&ContactState> {
        self.contacts.iter().find(|c| c.contact.name == name)
    }

    pub fn current_hub(&self) -> Option<HubKind> {
        self.current
    }

    pub fn visitors(&self) -> impl Iterator<Item = &ContactState> {
        self.visitors.iter().filter_map(|i| self.contacts.get(*i))
    }

    pub fn is_visiting(&self, name: &str) -> bool {
        self.visitors().any(|c| c.contact.name == name)
    }

    /// Pay the entry fee, draw a crowd and maybe meet a regular.
    ///
    /// Nothing changes when the fee cannot be paid.
    pub fn enter_hub<R: Rng + ?Sized>(&mut self, hub: HubKind, ledger: &mut Ledger, rng: &mut R) -> SimResult<HubVisit> {
        ledger.try_spend(self.cfg.entry_fee.max(0))?;
        self.current = Some(hub);
        self.populate(rng);
        let met = if rng.gen_bool(clamp_chance(self.cfg.contact_spawn_chance)) {
            self.meet_regular(hub, rng)
        } else {
            None
        };
        let visitors = self.visitors.len();
        info!(?hub, visitors, met = ?met, "entered social hub");
        self.outbox.push(Notification::HubEntered { hub, visitors });
        Ok(HubVisit { hub, visitors, met })
    }

    fn populate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.visitors.clear();
        if self.contacts.is_empty() {
            return;
        }
        let (low, high) = (self.cfg.min_occupants, self.cfg.max_occupants);
        let draws = if high > low { rng.gen_range(low..high) } else { low };
        for _ in 0..draws {
            let idx = rng.gen_range(0..self.contacts.len());
            if !self.visitors.contains(&idx) {
                self.visitors.push(idx);
            }
        }
    }

    fn meet_regular<R: Rng + ?Sized>(&mut self, hub: HubKind, rng: &mut R) -> Option<String> {
        let eligible: Vec<usize> = (0..self.contacts.len())
            .filter(|i| self.contacts[*i].contact.preferred_hub == hub && !self.visitors.contains(i))
            .collect();
        let idx = *eligible.choose(rng)?;
        self.visitors.push(idx);
        let name = self.contacts[idx].contact.name.clone();
        self.outbox.push(Notification::ContactMet { name: name.clone() });
        Some(name)
    }

    pub fn leave_hub(&mut self) {
        self.current = None;
        self.visitors.clear();
    }

    /// Deepen the relationship with a contact who is here right now.
    pub fn network_with<R: Rng + ?Sized>(&mut self, name: &str, rng: &mut R) -> SimResult<NetworkOutcome> {
        let idx = self
            .contacts
            .iter()
            .position(|c| c.contact.name == name)
            .ok_or_else(|| SimError::unknown(format!("contact {name}")))?;
        if !self.visitors.contains(&idx) {
            return Err(SimError::ineligible(format!("{name} is not here")));
        }
        let min_level = self.cfg.partnership_min_relationship;
        let chance = clamp_chance(self.cfg.partnership_chance);
        let state = &mut self.contacts[idx];
        state.relationship = state.relationship.saturating_add(1).min(MAX_RELATIONSHIP);
        let relationship = state.relationship;
        let partnership_offered =
            state.contact.can_offer_partnership && relationship >= min_level && rng.gen_bool(chance);
        if partnership_offered {
            info!(contact = name, relationship, "partnership offered");
            self.outbox.push(Notification::PartnershipOffered {
                contact: name.to_string(),
            });
        }
        Ok(NetworkOutcome {
            relationship,
            partnership_offered,
        })
    }

    /// Sum of `networking_value * relationship / 10` over current visitors.
    pub fn networking_bonus(&self) -> f32 {
        self.visitors()
            .map(|c| c.contact.networking_value * f32::from(c.relationship) / f32::from(MAX_RELATIONSHIP))
            .sum()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sim_core::Catalog;

    fn hubs(cfg: SocialConfig) -> SocialHubs {
        SocialHubs::new(Catalog::builtin().contacts, cfg)
    }

    fn always_meet() -> SocialConfig {
        SocialConfig {
            contact_spawn_chance: 1.0,
            min_occupants: 0,
            max_occupants: 1,
            ..SocialConfig::default()
        }
    }

    #[test]
    fn entry_fee_is_charged_or_nothing_happens() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut h = hubs(SocialConfig::default());
        let mut ledger = Ledger::new(40);
        assert!(matches!(
            h.enter_hub(HubKind::Gym, &mut ledger, &mut rng),
            Err(SimError::InsufficientFunds { .. })
        ));
        assert_eq!(h.current_hub(), None);
        assert!(h.drain_notifications().is_empty());
        ledger.add_money(60);
        let visit = h.enter_hub(HubKind::Gym, &mut ledger, &mut rng).unwrap();
        assert_eq!(ledger.cash(), 50);
        assert_eq!(visit.visitors, h.visitors().count());
        assert!((1..=4).contains(&visit.visitors));
    }

    #[test]
    fn regulars_are_met_at_their_hub() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut h = hubs(always_meet());
        let mut ledger = Ledger::new(1_000);
        let visit = h.enter_hub(HubKind::BusinessClub, &mut ledger, &mut rng).unwrap();
        assert_eq!(visit.met.as_deref(), Some("Marcus Chen"));
        assert!(h.is_visiting("Marcus Chen"));
        let visit = h.enter_hub(HubKind::LocalBar, &mut ledger, &mut rng).unwrap();
        assert_eq!(visit.met, None);
    }

    #[test]
    fn networking_needs_the_contact_present() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut h = hubs(always_meet());
        assert!(matches!(
            h.network_with("Nobody", &mut rng),
            Err(SimError::UnknownEntity(_))
        ));
        assert!(matches!(
            h.network_with("Marcus Chen", &mut rng),
            Err(SimError::Ineligible(_))
        ));
        let mut ledger = Ledger::new(1_000);
        h.enter_hub(HubKind::BusinessClub, &mut ledger, &mut rng).unwrap();
        assert_eq!(h.network_with("Marcus Chen", &mut rng).unwrap().relationship, 2);
        h.leave_hub();
        assert!(matches!(
            h.network_with("Marcus Chen", &mut rng),
            Err(SimError::Ineligible(_))
        ));
    }

    #[test]
    fn relationship_caps_and_partnerships_need_trust() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut h = hubs(SocialConfig {
            partnership_chance: 1.0,
            ..always_meet()
        });
        let mut ledger = Ledger::new(1_000);
        h.enter_hub(HubKind::NetworkingEvent, &mut ledger, &mut rng).unwrap();
        let mut offers = Vec::new();
        for _ in 0..12 {
            let out = h.network_with("Roberto Garcia", &mut rng).unwrap();
            offers.push((out.relationship, out.partnership_offered));
        }
        assert_eq!(h.contact("Roberto Garcia").unwrap().relationship, MAX_RELATIONSHIP);
        assert!(offers.iter().all(|(level, offered)| *offered == (*level >= 7)));
    }

    #[test]
    fn bonus_weights_value_by_relationship() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut h = hubs(always_meet());
        assert_eq!(h.networking_bonus(), 0.0);
        let mut ledger = Ledger::new(1_000);
        h.enter_hub(HubKind::BusinessClub, &mut ledger, &mut rng).unwrap();
        let base = h.networking_bonus();
        h.network_with("Marcus Chen", &mut rng).unwrap();
        // Marcus: 2.0 * (2 - 1) / 10
        assert!((h.networking_bonus() - base - 0.2).abs() < 1e-5);
    }
}
