//! Entry points for the gameplay-effect resolver.
//!
//! Content execution lives outside this crate. It addresses entities by id
//! and hands over plain values; these helpers look the entity up, wire in the
//! shared resources and forward to the component method. A missing entity is
//! a caller bug: it is logged and answered with the method's sentinel.

use bevy::{ecs::system::SystemState, prelude::*};
use tracing::warn;

use crate::{
    actor::Actor,
    attributes::Attribute,
    conditions::{Condition, ConditionContext, ConditionTag},
    connection::{Connection, SecurityLevel},
    effects::{EffectAuditRegistry, OngoingEffect},
    engine_config::EngineConfigHandle,
    ids::{ActorId, ConnectionId, EffectId, NodeId},
    messages::MessageLog,
    node::Node,
    opinion::{OpinionContext, OpinionStatistics},
    resources::TurnState,
    rng::SimRng,
};

type OpinionParams<'w, 's> = (
    Res<'w, EngineConfigHandle>,
    Res<'w, TurnState>,
    ResMut<'w, SimRng>,
    ResMut<'w, OpinionStatistics>,
    ResMut<'w, MessageLog>,
    Query<'w, 's, &'static mut Actor>,
);

type ConditionParams<'w, 's> = (
    Res<'w, EngineConfigHandle>,
    Res<'w, TurnState>,
    ResMut<'w, MessageLog>,
    Query<'w, 's, &'static mut Actor>,
);

fn missing(kind: &'static str, id: u32) {
    warn!(target: "intrigue::resolution", kind, id, "resolution.entity_missing");
}

/// Spawns `node` with the bounds and team modifiers of the loaded config.
pub fn spawn_node(world: &mut World, mut node: Node) -> Entity {
    let config = world.resource::<EngineConfigHandle>().get();
    node.apply_config(config.attributes());
    world.spawn(node).id()
}

pub fn add_node_effect(world: &mut World, node: NodeId, effect: &OngoingEffect) -> bool {
    world.resource_scope(|world, mut registry: Mut<EffectAuditRegistry>| {
        let mut query = world.query::<&mut Node>();
        match query.iter_mut(world).find(|candidate| candidate.id == node) {
            Some(mut target) => target.add_ongoing_effect(effect, &mut registry),
            None => {
                missing("node", node.0);
                false
            }
        }
    })
}

pub fn cancel_node_effect(world: &mut World, node: NodeId, effect: &str) -> usize {
    let id = EffectId::new(effect);
    world.resource_scope(|world, mut registry: Mut<EffectAuditRegistry>| {
        let mut query = world.query::<&mut Node>();
        match query.iter_mut(world).find(|candidate| candidate.id == node) {
            Some(mut target) => target.cancel_effect(&id, &mut registry),
            None => {
                missing("node", node.0);
                0
            }
        }
    })
}

pub fn add_connection_effect(
    world: &mut World,
    connection: ConnectionId,
    effect: &OngoingEffect,
) -> bool {
    world.resource_scope(|world, mut registry: Mut<EffectAuditRegistry>| {
        let mut query = world.query::<&mut Connection>();
        match query.iter_mut(world).find(|candidate| candidate.id == connection) {
            Some(mut target) => target.add_ongoing_effect(effect, &mut registry),
            None => {
                missing("connection", connection.0);
                false
            }
        }
    })
}

pub fn change_connection_security(world: &mut World, connection: ConnectionId, delta: i32) -> bool {
    let mut query = world.query::<&mut Connection>();
    match query.iter_mut(world).find(|candidate| candidate.id == connection) {
        Some(mut target) => target.change_security_level(delta),
        None => {
            missing("connection", connection.0);
            false
        }
    }
}

pub fn connection_effective_level(
    world: &mut World,
    connection: ConnectionId,
) -> Option<SecurityLevel> {
    let mut query = world.query::<&Connection>();
    let found = query
        .iter(world)
        .find(|candidate| candidate.id == connection)
        .map(Connection::effective_level);
    if found.is_none() {
        missing("connection", connection.0);
    }
    found
}

pub fn node_effective_value(world: &mut World, node: NodeId, attribute: Attribute) -> Option<i32> {
    let mut query = world.query::<&Node>();
    match query.iter(world).find(|candidate| candidate.id == node) {
        Some(target) => target.effective_value(attribute),
        None => {
            missing("node", node.0);
            None
        }
    }
}

/// `None` when the actor does not exist, otherwise whether the proposal was
/// accepted.
pub fn resolve_actor_opinion(
    world: &mut World,
    actor: ActorId,
    proposed: i32,
    reason: &str,
) -> Option<bool> {
    let mut system_state: SystemState<OpinionParams> = SystemState::new(world);
    let (config, turn, mut rng, mut statistics, mut messages, mut actors) =
        system_state.get_mut(world);
    let config = config.get();

    let Some(mut target) = actors.iter_mut().find(|candidate| candidate.id == actor) else {
        missing("actor", actor.0);
        return None;
    };
    let mut ctx = OpinionContext {
        turn: turn.turn,
        acting_side: turn.acting_side,
        config: config.opinion(),
        rng: &mut rng,
        statistics: &mut statistics,
        messages: &mut messages,
    };
    Some(target.resolve_opinion(proposed, reason, &mut ctx))
}

pub fn add_actor_condition(
    world: &mut World,
    actor: ActorId,
    condition: Condition,
    reason: &str,
) -> bool {
    let mut system_state: SystemState<ConditionParams> = SystemState::new(world);
    let (config, turn, mut messages, mut actors) = system_state.get_mut(world);
    let config = config.get();

    let Some(mut target) = actors.iter_mut().find(|candidate| candidate.id == actor) else {
        missing("actor", actor.0);
        return false;
    };
    let mut ctx = ConditionContext {
        turn: turn.turn,
        config: config.conditions(),
        messages: &mut messages,
    };
    target.add_condition(condition, reason, &mut ctx)
}

pub fn remove_actor_condition(
    world: &mut World,
    actor: ActorId,
    tag: ConditionTag,
    reason: &str,
) -> bool {
    let mut system_state: SystemState<ConditionParams> = SystemState::new(world);
    let (config, turn, mut messages, mut actors) = system_state.get_mut(world);
    let config = config.get();

    let Some(mut target) = actors.iter_mut().find(|candidate| candidate.id == actor) else {
        missing("actor", actor.0);
        return false;
    };
    let mut ctx = ConditionContext {
        turn: turn.turn,
        config: config.conditions(),
        messages: &mut messages,
    };
    target.remove_condition(tag, reason, &mut ctx)
}
