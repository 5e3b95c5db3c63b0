//! Conversion between live components and the `sim_schema` contracts.
//!
//! Capture is read-only. Restore validates every record before touching the
//! world, so a bad save leaves the running state intact.

use std::collections::BTreeSet;

use bevy::prelude::*;
use sim_schema::{
    ActorState, ConditionState, ConnectionState, ContactState, HistoryEventState,
    HistoryOpinionState, NodeState, OngoingEffectState, WorldHeader, WorldState,
};
use thiserror::Error;
use tracing::info;

use crate::{
    actor::Actor,
    attributes::{Attribute, ParseTagError},
    conditions::{Condition, ConditionTag, TraitEffect},
    connection::{Connection, SecurityLevel, SecurityStyle},
    contacts::{Contact, ContactStatus, EFFECTIVENESS_MAX, EFFECTIVENESS_MIN},
    effects::{EffectAuditRegistry, OngoingEffect},
    engine_config::{AttributeConfig, EngineConfigHandle},
    history::{ActorHistory, HistoryEvent, HistoryOpinion},
    ids::{ActorId, ConnectionId, ContactId, EffectId, NodeId, SecretId, Side},
    node::{Node, TeamPresence},
    resources::TurnState,
};

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error(transparent)]
    UnknownTag(#[from] ParseTagError),
    #[error("invalid security level ordinal {0}")]
    InvalidSecurityLevel(u8),
    #[error("invalid side {0}")]
    InvalidSide(u8),
    #[error("unknown team flags {0:#x}")]
    InvalidTeamFlags(u32),
    #[error("contact {contact} has effectiveness {value}, expected 1..=3")]
    InvalidEffectiveness { contact: u32, value: u8 },
    #[error("connection {connection} carries effect `{effect}` more than once")]
    DuplicateEffect { connection: u32, effect: String },
    #[error("duplicate {kind} id {id}")]
    DuplicateEntity { kind: &'static str, id: u32 },
}

fn effect_state(effect: &OngoingEffect) -> OngoingEffectState {
    OngoingEffectState {
        id: effect.id.as_str().to_string(),
        attribute: effect.attribute.as_str().to_string(),
        magnitude: effect.magnitude,
        remaining_turns: effect.remaining_turns,
        origin: effect.origin.clone(),
    }
}

fn effect_from_state(state: &OngoingEffectState) -> Result<OngoingEffect, RestoreError> {
    let attribute: Attribute = state.attribute.parse()?;
    Ok(OngoingEffect {
        id: EffectId::new(state.id.clone()),
        attribute,
        magnitude: state.magnitude,
        remaining_turns: state.remaining_turns,
        origin: state.origin.clone(),
    })
}

fn security_level(ordinal: u8) -> Result<SecurityLevel, RestoreError> {
    SecurityLevel::from_ordinal(ordinal).ok_or(RestoreError::InvalidSecurityLevel(ordinal))
}

impl Node {
    pub fn to_state(&self) -> NodeState {
        NodeState {
            id: self.id.0,
            name: self.name.clone(),
            stability: self.stability,
            support: self.support,
            security: self.security,
            team_flags: self.teams.bits(),
            effects: self.ledger.iter().map(effect_state).collect(),
        }
    }

    /// Rebuilds a node and registers its ledger entries with `registry`.
    pub fn from_state(
        state: &NodeState,
        config: &AttributeConfig,
        registry: &mut EffectAuditRegistry,
    ) -> Result<Self, RestoreError> {
        let teams = TeamPresence::from_bits(state.team_flags)
            .ok_or(RestoreError::InvalidTeamFlags(state.team_flags))?;
        let effects = state
            .effects
            .iter()
            .map(effect_from_state)
            .collect::<Result<Vec<_>, _>>()?;

        let mut node = Node::with_config(NodeId(state.id), state.name.clone(), config).with_base(
            state.stability,
            state.support,
            state.security,
        );
        node.teams = teams;
        for effect in &effects {
            node.ledger.add(effect, registry);
        }
        Ok(node)
    }
}

impl Connection {
    pub fn to_state(&self) -> ConnectionState {
        ConnectionState {
            id: self.id.0,
            from_node: self.from.0,
            to_node: self.to.0,
            security_level: self.level.ordinal(),
            saved_level: self.saved_level.map(SecurityLevel::ordinal),
            adjusted_this_resolution: self.adjusted,
            effects: self.ledger.iter().map(effect_state).collect(),
        }
    }

    pub fn from_state(
        state: &ConnectionState,
        registry: &mut EffectAuditRegistry,
    ) -> Result<Self, RestoreError> {
        let level = security_level(state.security_level)?;
        let saved_level = state.saved_level.map(security_level).transpose()?;
        let effects = state
            .effects
            .iter()
            .map(effect_from_state)
            .collect::<Result<Vec<_>, _>>()?;

        let mut connection = Connection::new(
            ConnectionId(state.id),
            NodeId(state.from_node),
            NodeId(state.to_node),
            level,
        );
        connection.saved_level = saved_level;
        connection.adjusted = state.adjusted_this_resolution;
        for effect in &effects {
            if !connection.ledger.add(effect, registry) {
                return Err(RestoreError::DuplicateEffect {
                    connection: state.id,
                    effect: effect.id.to_string(),
                });
            }
        }
        connection.style = SecurityStyle::for_level(connection.effective_level());
        Ok(connection)
    }
}

impl Actor {
    pub fn to_state(&self) -> ActorState {
        ActorState {
            id: self.id.0,
            name: self.name.clone(),
            side: self.side.as_u8(),
            influence: self.influence,
            opinion: self.opinion,
            discretion: self.discretion,
            compatibility: self.compatibility,
            conditions: self
                .conditions
                .iter()
                .map(|condition| ConditionState {
                    tag: condition.tag.as_str().to_string(),
                    is_now_a: condition.is_now_a,
                })
                .collect(),
            traits: self
                .trait_effects
                .iter()
                .map(|effect| effect.as_str().to_string())
                .collect(),
            secrets: self.secrets.iter().map(|secret| secret.0).collect(),
            contacts: self
                .contacts
                .iter()
                .map(|(location, contact)| ContactState {
                    location: location.0,
                    contact_id: contact.id.0,
                    effectiveness: contact.effectiveness,
                    active: contact.is_active(),
                })
                .collect(),
            threatening: self.threatening,
            blackmail_timer: self.blackmail_timer,
            opinion_history: self
                .history
                .opinions
                .iter()
                .map(|record| HistoryOpinionState {
                    turn: record.turn,
                    requested_change: record.requested_change,
                    resulting_value: record.resulting_value,
                    accepted: record.accepted,
                    descriptor: record.descriptor.clone(),
                })
                .collect(),
            history: self
                .history
                .events
                .iter()
                .map(|event| HistoryEventState {
                    turn: event.turn,
                    text: event.text.clone(),
                })
                .collect(),
        }
    }

    pub fn from_state(state: &ActorState) -> Result<Self, RestoreError> {
        let side = Side::from_u8(state.side).ok_or(RestoreError::InvalidSide(state.side))?;
        let mut actor = Actor::new(ActorId(state.id), state.name.clone(), side).with_datapoints(
            state.influence,
            state.opinion,
            state.discretion,
        );
        actor.compatibility = state.compatibility;

        for condition in &state.conditions {
            let tag: ConditionTag = condition.tag.parse()?;
            if !actor.check_condition_present(tag) {
                actor
                    .conditions
                    .push(Condition::with_grammar(tag, condition.is_now_a));
            }
        }
        for name in &state.traits {
            let effect: TraitEffect = name.parse()?;
            actor.trait_effects.insert(effect);
        }
        for secret in &state.secrets {
            if !actor.secrets.contains(&SecretId(*secret)) {
                actor.secrets.push(SecretId(*secret));
            }
        }
        for contact in &state.contacts {
            if !(EFFECTIVENESS_MIN..=EFFECTIVENESS_MAX).contains(&contact.effectiveness) {
                return Err(RestoreError::InvalidEffectiveness {
                    contact: contact.contact_id,
                    value: contact.effectiveness,
                });
            }
            let mut restored = Contact::new(ContactId(contact.contact_id), contact.effectiveness);
            if !contact.active {
                restored.status = ContactStatus::Inactive;
            }
            actor.contacts.insert(NodeId(contact.location), restored);
        }
        actor.threatening = state.threatening;
        actor.blackmail_timer = state.blackmail_timer;
        actor.history = ActorHistory {
            opinions: state
                .opinion_history
                .iter()
                .map(|record| HistoryOpinion {
                    turn: record.turn,
                    requested_change: record.requested_change,
                    resulting_value: record.resulting_value,
                    accepted: record.accepted,
                    descriptor: record.descriptor.clone(),
                })
                .collect(),
            events: state
                .history
                .iter()
                .map(|event| HistoryEvent {
                    turn: event.turn,
                    text: event.text.clone(),
                })
                .collect(),
        };
        Ok(actor)
    }
}

/// Snapshot of every node, connection and actor, sorted by id.
pub fn capture_world_state(world: &mut World) -> WorldState {
    let turn = world
        .get_resource::<TurnState>()
        .map(|state| state.turn)
        .unwrap_or_default();

    let mut nodes: Vec<NodeState> = world
        .query::<&Node>()
        .iter(world)
        .map(Node::to_state)
        .collect();
    nodes.sort_unstable_by_key(|state| state.id);

    let mut connections: Vec<ConnectionState> = world
        .query::<&Connection>()
        .iter(world)
        .map(Connection::to_state)
        .collect();
    connections.sort_unstable_by_key(|state| state.id);

    let mut actors: Vec<ActorState> = world
        .query::<&Actor>()
        .iter(world)
        .map(Actor::to_state)
        .collect();
    actors.sort_unstable_by_key(|state| state.id);

    WorldState {
        header: WorldHeader::new(turn, nodes.len(), connections.len(), actors.len()),
        nodes,
        connections,
        actors,
    }
    .finalize()
}

fn ensure_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a u32>,
) -> Result<(), RestoreError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(*id) {
            return Err(RestoreError::DuplicateEntity { kind, id: *id });
        }
    }
    Ok(())
}

/// Replaces every node, connection and actor with the ones in `state` and
/// rebuilds the audit registry from their ledgers.
pub fn restore_world_from_state(world: &mut World, state: &WorldState) -> Result<(), RestoreError> {
    ensure_unique("node", state.nodes.iter().map(|node| &node.id))?;
    ensure_unique("connection", state.connections.iter().map(|c| &c.id))?;
    ensure_unique("actor", state.actors.iter().map(|actor| &actor.id))?;

    let attributes = world
        .get_resource::<EngineConfigHandle>()
        .map(|handle| handle.get().attributes().clone())
        .unwrap_or_default();

    let mut registry = EffectAuditRegistry::default();
    let nodes = state
        .nodes
        .iter()
        .map(|node| Node::from_state(node, &attributes, &mut registry))
        .collect::<Result<Vec<_>, _>>()?;
    let connections = state
        .connections
        .iter()
        .map(|connection| Connection::from_state(connection, &mut registry))
        .collect::<Result<Vec<_>, _>>()?;
    let actors = state
        .actors
        .iter()
        .map(Actor::from_state)
        .collect::<Result<Vec<_>, _>>()?;

    let stale: Vec<Entity> = world
        .query_filtered::<Entity, Or<(With<Node>, With<Connection>, With<Actor>)>>()
        .iter(world)
        .collect();
    for entity in stale {
        world.despawn(entity);
    }

    world.spawn_batch(nodes);
    world.spawn_batch(connections);
    world.spawn_batch(actors);
    world.insert_resource(registry);

    world
        .get_resource_or_insert_with(TurnState::default)
        .turn = state.header.turn;

    info!(
        target: "intrigue::snapshot",
        turn = state.header.turn,
        nodes = state.nodes.len(),
        connections = state.connections.len(),
        actors = state.actors.len(),
        "snapshot.restored"
    );
    Ok(())
}
