use std::collections::btree_map::Entry;

use tracing::{debug, warn};

use crate::{
    actor::Actor,
    ids::{ContactId, NodeId},
    rng::SimRng,
};

pub const EFFECTIVENESS_MIN: u8 = 1;
pub const EFFECTIVENESS_MAX: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ContactStatus {
    #[default]
    Active,
    Inactive,
}

/// An informant at one location of an actor's network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    pub effectiveness: u8,
    pub status: ContactStatus,
}

impl Contact {
    pub fn new(id: ContactId, effectiveness: u8) -> Self {
        Self {
            id,
            effectiveness: effectiveness.clamp(EFFECTIVENESS_MIN, EFFECTIVENESS_MAX),
            status: ContactStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ContactStatus::Active
    }

    /// Number of slots this contact occupies in a draw pool.
    pub fn weight(&self) -> usize {
        usize::from(self.effectiveness.clamp(EFFECTIVENESS_MIN, EFFECTIVENESS_MAX))
    }
}

impl Actor {
    pub fn contacts(&self) -> impl Iterator<Item = (NodeId, &Contact)> {
        self.contacts.iter().map(|(location, contact)| (*location, contact))
    }

    pub fn contact_at(&self, location: NodeId) -> Option<&Contact> {
        self.contacts.get(&location)
    }

    /// One contact per location; an occupied location is left untouched.
    pub fn add_contact(&mut self, location: NodeId, contact: Contact) -> bool {
        match self.contacts.entry(location) {
            Entry::Vacant(slot) => {
                slot.insert(contact);
                true
            }
            Entry::Occupied(_) => {
                warn!(
                    target: "intrigue::contacts",
                    actor = %self.id,
                    node = %location,
                    contact = %contact.id,
                    "contact.add.location_occupied"
                );
                false
            }
        }
    }

    pub fn remove_contact(&mut self, location: NodeId) -> Option<Contact> {
        self.contacts.remove(&location)
    }

    pub fn set_contact_status(&mut self, location: NodeId, status: ContactStatus) -> bool {
        match self.contacts.get_mut(&location) {
            Some(contact) => {
                contact.status = status;
                true
            }
            None => false,
        }
    }

    /// Weighted draw over every active contact.
    pub fn random_contact(&self, rng: &mut SimRng) -> Option<(NodeId, &Contact)> {
        self.draw_contact(rng, None)
    }

    /// Weighted draw that skips the listed contacts. An empty list excludes
    /// nothing.
    pub fn random_contact_excluding(
        &self,
        rng: &mut SimRng,
        exclusions: &[ContactId],
    ) -> Option<(NodeId, &Contact)> {
        let exclusions = (!exclusions.is_empty()).then_some(exclusions);
        self.draw_contact(rng, exclusions)
    }

    fn draw_contact(
        &self,
        rng: &mut SimRng,
        exclusions: Option<&[ContactId]>,
    ) -> Option<(NodeId, &Contact)> {
        let mut pool: Vec<(NodeId, &Contact)> = Vec::new();
        for (location, contact) in &self.contacts {
            if !contact.is_active() {
                continue;
            }
            if exclusions.is_some_and(|list| list.contains(&contact.id)) {
                continue;
            }
            pool.extend(std::iter::repeat((*location, contact)).take(contact.weight()));
        }
        let picked = rng.pick(&pool).copied();
        if picked.is_none() {
            debug!(target: "intrigue::contacts", actor = %self.id, "contact.draw.empty_pool");
        }
        picked
    }
}
