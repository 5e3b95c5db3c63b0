//! Dynamic state and timed-effect engine for the intrigue prototype.
//!
//! Nodes, connections and actors are ECS components. A turn is one pass of
//! the chained systems configured in [`build_headless_app`]; everything else
//! is mutated synchronously by the gameplay-effect resolver through the
//! component methods or the helpers in [`resolution`].

pub mod actor;
pub mod attributes;
pub mod conditions;
pub mod connection;
pub mod contacts;
pub mod effects;
pub mod engine_config;
pub mod history;
pub mod ids;
pub mod messages;
pub mod node;
pub mod opinion;
pub mod resolution;
mod resources;
pub mod rng;
mod snapshot;
mod systems;

use std::sync::Arc;

use bevy::prelude::*;

pub use actor::{Actor, Datapoint};
pub use attributes::{Attribute, ParseTagError, ATTRIBUTE_MAX, ATTRIBUTE_MIN};
pub use conditions::{Condition, ConditionContext, ConditionTag, TraitEffect};
pub use connection::{Connection, SecurityLevel, SecurityStyle};
pub use contacts::{Contact, ContactStatus};
pub use effects::{DuplicatePolicy, EffectAuditRegistry, EffectLedger, EffectOwner, OngoingEffect};
pub use engine_config::{
    load_engine_config_from_env, EngineConfig, EngineConfigError, EngineConfigHandle,
    EngineConfigMetadata,
};
pub use history::{ActorHistory, HistoryEvent, HistoryOpinion};
pub use ids::{ActorId, ConnectionId, ContactId, EffectId, NodeId, SecretId, Side};
pub use messages::{MessageLog, Notice, NoticeKind, NoticeSubject};
pub use node::{Node, TeamPresence};
pub use opinion::{OpinionContext, OpinionStatistics};
pub use resources::TurnState;
pub use rng::SimRng;
pub use snapshot::{capture_world_state, restore_world_from_state, RestoreError};
pub use systems::{
    advance_turn, reset_security_adjustments, tick_connection_effects, tick_node_effects,
};

/// Construct a Bevy [`App`] with the configuration picked up from the
/// environment.
pub fn build_headless_app() -> App {
    let (config, metadata) = load_engine_config_from_env();
    let mut app = build_headless_app_with_config(config);
    app.insert_resource(metadata);
    app
}

/// Construct a Bevy [`App`] wired with the engine resources and the turn
/// pipeline.
pub fn build_headless_app_with_config(config: Arc<EngineConfig>) -> App {
    let mut app = App::new();
    let seed = config.rng().seed;

    app.insert_resource(EngineConfigHandle::new(config))
        .insert_resource(EngineConfigMetadata::new(None))
        .insert_resource(TurnState::default())
        .insert_resource(SimRng::seeded(seed))
        .insert_resource(EffectAuditRegistry::default())
        .insert_resource(MessageLog::default())
        .insert_resource(OpinionStatistics::default())
        .add_plugins(MinimalPlugins)
        .add_systems(
            Update,
            (
                systems::tick_node_effects,
                systems::tick_connection_effects,
                systems::reset_security_adjustments,
                systems::advance_turn,
            )
                .chain(),
        );

    app
}

/// Execute a single turn.
///
/// Each call processes the chained systems configured in
/// [`build_headless_app_with_config`] (node ledgers → connection ledgers →
/// security guard reset → turn increment).
pub fn run_turn(app: &mut App) {
    app.update();
}
