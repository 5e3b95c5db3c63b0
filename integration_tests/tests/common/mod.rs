#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use bevy::app::App;
use intrigue_core::resolution::{
    add_actor_condition, add_connection_effect, add_node_effect, change_connection_security,
    resolve_actor_opinion, spawn_node,
};
use intrigue_core::{
    build_headless_app, Actor, ActorId, Attribute, Condition, ConditionTag, Connection,
    ConnectionId, Contact, ContactId, Node, NodeId, OngoingEffect, SecretId, SecurityLevel, Side,
    TeamPresence, TurnState,
};

static INIT: Once = Once::new();

pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("test_engine_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test engine config at {}",
            config_path.display()
        );

        std::env::set_var("INTRIGUE_ENGINE_CONFIG_PATH", &config_path);
    });
}

/// Headless app with a three-node map, two connections and two actors.
pub fn seeded_app() -> App {
    ensure_test_config();
    let mut app = build_headless_app();
    let world = &mut app.world;

    let mut square = Node::new(NodeId(1), "Square").with_base(2, 2, 1);
    square.set_team_present(TeamPresence::MEDIA, true);
    spawn_node(world, square);
    spawn_node(world, Node::new(NodeId(2), "Station").with_base(1, 1, 2));
    spawn_node(world, Node::new(NodeId(3), "Docks").with_base(3, 0, 0));

    world.spawn(Connection::new(
        ConnectionId(1),
        NodeId(1),
        NodeId(2),
        SecurityLevel::Medium,
    ));
    world.spawn(Connection::new(
        ConnectionId(2),
        NodeId(2),
        NodeId(3),
        SecurityLevel::None,
    ));

    world.spawn(
        Actor::new(ActorId(1), "Commissioner Vale", Side::Authority)
            .with_datapoints(2, 3, 1)
            .with_compatibility(3),
    );
    let mut agent = Actor::new(ActorId(2), "Wren", Side::Authority)
        .with_datapoints(1, 1, 2)
        .with_compatibility(-2);
    agent.learn_secret(SecretId(4));
    agent.add_contact(NodeId(3), Contact::new(ContactId(1), 2));
    world.spawn(agent);

    app
}

/// Gameplay calls made every turn, so runs exercise the random source.
pub fn resolve_scripted_turn(app: &mut App) {
    let world = &mut app.world;
    let turn = world.resource::<TurnState>().turn;

    add_node_effect(
        world,
        NodeId((turn % 3) as u32 + 1),
        &OngoingEffect::new(format!("unrest-{turn}"), Attribute::Stability, -1, 2),
    );
    add_connection_effect(
        world,
        ConnectionId(2),
        &OngoingEffect::new(format!("patrol-{turn}"), Attribute::Security, 1, 1),
    );
    change_connection_security(world, ConnectionId(1), if turn % 2 == 0 { 1 } else { -1 });
    resolve_actor_opinion(world, ActorId(1), if turn % 2 == 0 { 1 } else { 3 }, "Briefing");
    resolve_actor_opinion(world, ActorId(2), if turn % 2 == 0 { 3 } else { 0 }, "Rumours");
    add_actor_condition(world, ActorId(2), Condition::new(ConditionTag::Blackmailer), "");
}
