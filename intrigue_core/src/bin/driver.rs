use std::env;

use tracing::{info, warn};

use intrigue_core::resolution::{
    add_actor_condition, add_connection_effect, add_node_effect, change_connection_security,
    resolve_actor_opinion, spawn_node,
};
use intrigue_core::{
    build_headless_app, capture_world_state, run_turn, Actor, ActorId, Attribute, Condition,
    ConditionTag, Connection, ConnectionId, Contact, ContactId, MessageLog, Node, NodeId,
    OngoingEffect, OpinionStatistics, SecretId, SecurityLevel, Side, TeamPresence,
};

const DEFAULT_TURNS: u32 = 3;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let turns = match env::args().nth(1) {
        Some(raw) => raw.parse::<u32>().unwrap_or_else(|_| {
            warn!(target: "intrigue::driver", value = %raw, "driver.turns.invalid");
            DEFAULT_TURNS
        }),
        None => DEFAULT_TURNS,
    };

    let mut app = build_headless_app();
    seed_demo_world(&mut app);
    let notices = app.world.resource_mut::<MessageLog>().subscribe();

    // Setup happens on turn 0; the first resolved turn follows it.
    run_turn(&mut app);

    for _ in 0..turns {
        let world = &mut app.world;
        add_node_effect(
            world,
            NodeId(2),
            &OngoingEffect::new("crackdown", Attribute::Security, 1, 2).with_origin("Crackdown"),
        );
        change_connection_security(world, ConnectionId(1), -1);
        resolve_actor_opinion(world, ActorId(1), 1, "Passed over");
        add_actor_condition(world, ActorId(2), Condition::new(ConditionTag::Blackmailer), "");

        run_turn(&mut app);

        let state = capture_world_state(&mut app.world);
        for node in &state.nodes {
            info!(
                target: "intrigue::driver",
                turn = state.header.turn,
                node = node.id,
                effects = node.effects.len(),
                "driver.node"
            );
        }
        for connection in &state.connections {
            info!(
                target: "intrigue::driver",
                turn = state.header.turn,
                connection = connection.id,
                level = connection.security_level,
                "driver.connection"
            );
        }
        info!(
            target: "intrigue::driver",
            turn = state.header.turn,
            hash = state.header.hash,
            "driver.turn_complete"
        );
    }

    for notice in notices.try_iter() {
        info!(target: "intrigue::driver", turn = notice.turn, kind = ?notice.kind, "{}", notice.text);
    }
    let statistics = *app.world.resource::<OpinionStatistics>();
    info!(
        target: "intrigue::driver",
        resolutions = statistics.resolutions,
        good_negations = statistics.good_negations,
        bad_negations = statistics.bad_negations,
        "driver.opinion_statistics"
    );
}

fn seed_demo_world(app: &mut bevy::app::App) {
    let world = &mut app.world;

    let mut market = Node::new(NodeId(1), "Market").with_base(2, 1, 1);
    market.set_team_present(TeamPresence::CIVIL, true);
    spawn_node(world, market);
    spawn_node(world, Node::new(NodeId(2), "Barracks").with_base(3, 0, 2));
    spawn_node(world, Node::new(NodeId(3), "Harbour").with_base(1, 2, 0));

    world.spawn(Connection::new(ConnectionId(1), NodeId(1), NodeId(2), SecurityLevel::Medium));
    world.spawn(Connection::new(ConnectionId(2), NodeId(2), NodeId(3), SecurityLevel::Low));

    world.spawn(
        Actor::new(ActorId(1), "Director Hale", Side::Authority)
            .with_datapoints(2, 3, 1)
            .with_compatibility(2),
    );
    let mut informant = Actor::new(ActorId(2), "Sable", Side::Resistance).with_datapoints(1, 2, 2);
    informant.learn_secret(SecretId(7));
    informant.add_contact(NodeId(3), Contact::new(ContactId(1), 3));
    world.spawn(informant);

    add_connection_effect(
        world,
        ConnectionId(2),
        &OngoingEffect::new("checkpoint", Attribute::Security, 1, 3).with_origin("Checkpoint"),
    );
}
