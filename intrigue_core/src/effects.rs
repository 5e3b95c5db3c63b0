use std::collections::BTreeMap;

use bevy::prelude::Resource;
use tracing::{debug, warn};

use crate::{
    attributes::Attribute,
    ids::{ConnectionId, EffectId, NodeId},
};

/// Timed, signed modifier against one attribute of one entity.
///
/// This is a value type: ledgers always store their own copy, so two
/// entities handed the same template count down independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OngoingEffect {
    pub id: EffectId,
    pub attribute: Attribute,
    pub magnitude: i32,
    pub remaining_turns: i32,
    pub origin: String,
}

impl OngoingEffect {
    pub fn new(
        id: impl Into<String>,
        attribute: Attribute,
        magnitude: i32,
        remaining_turns: i32,
    ) -> Self {
        Self {
            id: EffectId::new(id),
            attribute,
            magnitude,
            remaining_turns,
            origin: String::new(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }
}

/// Entity a ledger belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffectOwner {
    Node(NodeId),
    Connection(ConnectionId),
}

/// How a ledger treats a correlation id that is already present.
///
/// Node ledgers accept duplicates, connection ledgers reject them. The two
/// policies are kept apart until the node behaviour is confirmed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicatePolicy {
    Allow,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectLedger {
    owner: EffectOwner,
    policy: DuplicatePolicy,
    entries: Vec<OngoingEffect>,
}

impl EffectLedger {
    pub fn for_node(node: NodeId) -> Self {
        Self {
            owner: EffectOwner::Node(node),
            policy: DuplicatePolicy::Allow,
            entries: Vec::new(),
        }
    }

    pub fn for_connection(connection: ConnectionId) -> Self {
        Self {
            owner: EffectOwner::Connection(connection),
            policy: DuplicatePolicy::Reject,
            entries: Vec::new(),
        }
    }

    pub fn owner(&self) -> EffectOwner {
        self.owner
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OngoingEffect> {
        self.entries.iter()
    }

    pub fn contains(&self, id: &EffectId) -> bool {
        self.entries.iter().any(|entry| &entry.id == id)
    }

    pub fn remaining_turns_for(&self, id: &EffectId) -> Option<i32> {
        self.entries
            .iter()
            .find(|entry| &entry.id == id)
            .map(|entry| entry.remaining_turns)
    }

    /// Stores a copy of `effect`. Returns `false` without touching the ledger
    /// when the owner rejects duplicates and the id is already present.
    pub fn add(&mut self, effect: &OngoingEffect, registry: &mut EffectAuditRegistry) -> bool {
        if self.policy == DuplicatePolicy::Reject && self.contains(&effect.id) {
            warn!(
                target: "intrigue::effects",
                owner = ?self.owner,
                effect = %effect.id,
                "effect.add.duplicate"
            );
            return false;
        }

        let stored = effect.clone();
        registry.register(self.owner, &stored);
        debug!(
            target: "intrigue::effects",
            owner = ?self.owner,
            effect = %stored.id,
            attribute = stored.attribute.as_str(),
            magnitude = stored.magnitude,
            remaining_turns = stored.remaining_turns,
            "effect.add"
        );
        self.entries.push(stored);
        true
    }

    /// Counts every entry down by one turn and drops the ones that reach
    /// zero. Must run once per turn; there is no guard against a second call.
    pub fn tick(&mut self, registry: &mut EffectAuditRegistry) -> Vec<OngoingEffect> {
        let owner = self.owner;
        let mut expired = Vec::new();
        self.entries.retain_mut(|entry| {
            entry.remaining_turns -= 1;
            if entry.remaining_turns > 0 {
                return true;
            }
            registry.deregister(owner, &entry.id);
            expired.push(entry.clone());
            false
        });

        for effect in &expired {
            debug!(
                target: "intrigue::effects",
                owner = ?owner,
                effect = %effect.id,
                "effect.expired"
            );
        }
        expired
    }

    /// Cancels every entry carrying `id` regardless of its timer.
    pub fn remove_by_id(&mut self, id: &EffectId, registry: &mut EffectAuditRegistry) -> usize {
        let before = self.entries.len();
        let owner = self.owner;
        self.entries.retain(|entry| {
            if &entry.id != id {
                return true;
            }
            registry.deregister(owner, &entry.id);
            false
        });
        let removed = before - self.entries.len();
        if removed == 0 {
            warn!(
                target: "intrigue::effects",
                owner = ?owner,
                effect = %id,
                "effect.remove.not_found"
            );
        }
        removed
    }

    pub fn sum_for(&self, attribute: Attribute) -> i32 {
        self.entries
            .iter()
            .filter(|entry| entry.attribute == attribute)
            .map(|entry| entry.magnitude)
            .sum()
    }

    /// Sum of all magnitudes regardless of attribute.
    pub fn sum(&self) -> i32 {
        self.entries.iter().map(|entry| entry.magnitude).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: EffectId,
    pub attribute: Attribute,
    pub magnitude: i32,
    pub origin: String,
}

/// Tooltip/audit view of every live ledger entry, keyed by owner.
#[derive(Resource, Debug, Default, Clone)]
pub struct EffectAuditRegistry {
    entries: BTreeMap<EffectOwner, Vec<AuditEntry>>,
}

impl EffectAuditRegistry {
    pub fn register(&mut self, owner: EffectOwner, effect: &OngoingEffect) {
        self.entries.entry(owner).or_default().push(AuditEntry {
            id: effect.id.clone(),
            attribute: effect.attribute,
            magnitude: effect.magnitude,
            origin: effect.origin.clone(),
        });
    }

    /// Removes one entry for `id`. Duplicate ids on node ledgers are
    /// deregistered one at a time, matching the ledger removal.
    pub fn deregister(&mut self, owner: EffectOwner, id: &EffectId) -> bool {
        let Some(list) = self.entries.get_mut(&owner) else {
            return false;
        };
        let Some(index) = list.iter().position(|entry| &entry.id == id) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.entries.remove(&owner);
        }
        true
    }

    pub fn entries_for(&self, owner: EffectOwner) -> &[AuditEntry] {
        self.entries
            .get(&owner)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    pub fn tooltip_lines(&self, owner: EffectOwner) -> Vec<String> {
        self.entries_for(owner)
            .iter()
            .map(|entry| {
                let origin = if entry.origin.is_empty() {
                    entry.id.as_str()
                } else {
                    entry.origin.as_str()
                };
                format!(
                    "{} {:+} ({})",
                    entry.attribute.as_str(),
                    entry.magnitude,
                    origin
                )
            })
            .collect()
    }

    pub fn clear_owner(&mut self, owner: EffectOwner) {
        self.entries.remove(&owner);
    }

    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
