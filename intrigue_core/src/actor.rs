use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::Component;
use tracing::warn;

use crate::{
    attributes::clamp_attribute,
    conditions::{Condition, TraitEffect},
    contacts::Contact,
    history::ActorHistory,
    ids::{ActorId, NodeId, SecretId, Side},
};

pub const COMPATIBILITY_MIN: i32 = -3;
pub const COMPATIBILITY_MAX: i32 = 3;

/// The three core numbers of an actor. `Opinion` can only be changed
/// through [`Actor::resolve_opinion`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Datapoint {
    Influence,
    Opinion,
    Discretion,
}

impl Datapoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Datapoint::Influence => "Influence",
            Datapoint::Opinion => "Opinion",
            Datapoint::Discretion => "Discretion",
        }
    }
}

/// Non-player character working for one side.
#[derive(Component, Debug, Clone)]
pub struct Actor {
    pub(crate) id: ActorId,
    pub(crate) name: String,
    pub(crate) side: Side,
    pub(crate) influence: i32,
    pub(crate) opinion: i32,
    pub(crate) discretion: i32,
    pub(crate) compatibility: i32,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) trait_effects: BTreeSet<TraitEffect>,
    pub(crate) secrets: Vec<SecretId>,
    pub(crate) contacts: BTreeMap<NodeId, Contact>,
    pub(crate) threatening: bool,
    pub(crate) blackmail_timer: i32,
    pub(crate) history: ActorHistory,
}

impl Actor {
    pub fn new(id: ActorId, name: impl Into<String>, side: Side) -> Self {
        Self {
            id,
            name: name.into(),
            side,
            influence: 0,
            opinion: 0,
            discretion: 0,
            compatibility: 0,
            conditions: Vec::new(),
            trait_effects: BTreeSet::new(),
            secrets: Vec::new(),
            contacts: BTreeMap::new(),
            threatening: false,
            blackmail_timer: 0,
            history: ActorHistory::default(),
        }
    }

    /// Recruitment-time setup of all three datapoints.
    pub fn with_datapoints(mut self, influence: i32, opinion: i32, discretion: i32) -> Self {
        self.influence = clamp_attribute(influence);
        self.opinion = clamp_attribute(opinion);
        self.discretion = clamp_attribute(discretion);
        self
    }

    pub fn with_compatibility(mut self, compatibility: i32) -> Self {
        self.set_compatibility(compatibility);
        self
    }

    pub fn with_trait_effects(mut self, effects: impl IntoIterator<Item = TraitEffect>) -> Self {
        self.trait_effects.extend(effects);
        self
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn datapoint(&self, datapoint: Datapoint) -> i32 {
        match datapoint {
            Datapoint::Influence => self.influence,
            Datapoint::Opinion => self.opinion,
            Datapoint::Discretion => self.discretion,
        }
    }

    pub fn opinion(&self) -> i32 {
        self.opinion
    }

    /// Sets one of the ungated datapoints, clamped to `0..=3`.
    pub fn set_datapoint(&mut self, datapoint: Datapoint, value: i32) -> bool {
        let slot = match datapoint {
            Datapoint::Influence => &mut self.influence,
            Datapoint::Discretion => &mut self.discretion,
            Datapoint::Opinion => {
                warn!(
                    target: "intrigue::actors",
                    actor = %self.id,
                    "actor.set_datapoint.opinion_is_gated"
                );
                return false;
            }
        };
        let clamped = clamp_attribute(value);
        if *slot == clamped {
            warn!(
                target: "intrigue::actors",
                actor = %self.id,
                datapoint = datapoint.as_str(),
                value = clamped,
                "actor.set_datapoint.redundant"
            );
            return false;
        }
        *slot = clamped;
        true
    }

    pub fn compatibility(&self) -> i32 {
        self.compatibility
    }

    pub fn set_compatibility(&mut self, compatibility: i32) {
        if !(COMPATIBILITY_MIN..=COMPATIBILITY_MAX).contains(&compatibility) {
            warn!(
                target: "intrigue::actors",
                actor = %self.id,
                compatibility,
                "actor.compatibility.clamped"
            );
        }
        self.compatibility = compatibility.clamp(COMPATIBILITY_MIN, COMPATIBILITY_MAX);
    }

    pub fn trait_effects(&self) -> impl Iterator<Item = TraitEffect> + '_ {
        self.trait_effects.iter().copied()
    }

    pub fn has_trait_effect(&self, effect: TraitEffect) -> bool {
        self.trait_effects.contains(&effect)
    }

    pub fn add_trait_effect(&mut self, effect: TraitEffect) -> bool {
        self.trait_effects.insert(effect)
    }

    pub fn remove_trait_effect(&mut self, effect: TraitEffect) -> bool {
        self.trait_effects.remove(&effect)
    }

    pub fn secrets(&self) -> &[SecretId] {
        &self.secrets
    }

    pub fn learn_secret(&mut self, secret: SecretId) -> bool {
        if self.secrets.contains(&secret) {
            warn!(
                target: "intrigue::actors",
                actor = %self.id,
                secret = secret.0,
                "actor.secret.already_known"
            );
            return false;
        }
        self.secrets.push(secret);
        true
    }

    pub fn forget_secret(&mut self, secret: SecretId) -> bool {
        let before = self.secrets.len();
        self.secrets.retain(|known| *known != secret);
        before != self.secrets.len()
    }

    pub fn is_threatening(&self) -> bool {
        self.threatening
    }

    pub fn blackmail_timer(&self) -> i32 {
        self.blackmail_timer
    }

    pub fn history(&self) -> &ActorHistory {
        &self.history
    }
}
