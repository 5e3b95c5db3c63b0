use std::sync::Arc;

use intrigue_core::resolution::{
    add_connection_effect, add_node_effect, change_connection_security,
    connection_effective_level, node_effective_value,
};
use intrigue_core::{
    build_headless_app_with_config, run_turn, Attribute, Connection, ConnectionId,
    EffectAuditRegistry, EffectOwner, EngineConfig, MessageLog, Node, NodeId, NoticeKind,
    OngoingEffect, SecurityLevel,
};

fn app() -> bevy::app::App {
    let mut app = build_headless_app_with_config(Arc::new(EngineConfig::default()));
    app.world
        .spawn(Node::new(NodeId(1), "Checkpoint").with_base(1, 1, 2));
    app.world.spawn(Connection::new(
        ConnectionId(1),
        NodeId(1),
        NodeId(2),
        SecurityLevel::Medium,
    ));
    app
}

#[test]
fn timed_security_penalty_expires_after_two_turns() {
    let mut app = app();
    let effect = OngoingEffect::new("sabotage", Attribute::Security, -1, 2);
    assert!(add_node_effect(&mut app.world, NodeId(1), &effect));

    let security = |app: &mut bevy::app::App| {
        node_effective_value(&mut app.world, NodeId(1), Attribute::Security)
    };
    assert_eq!(security(&mut app), Some(1));

    run_turn(&mut app);
    assert_eq!(security(&mut app), Some(1), "entry survives the first tick");
    assert_eq!(
        app.world
            .resource::<EffectAuditRegistry>()
            .entries_for(EffectOwner::Node(NodeId(1)))
            .len(),
        1
    );

    run_turn(&mut app);
    assert_eq!(security(&mut app), Some(2), "entry removed on the second tick");
    assert!(app
        .world
        .resource::<EffectAuditRegistry>()
        .entries_for(EffectOwner::Node(NodeId(1)))
        .is_empty());
    assert_eq!(
        app.world.resource::<MessageLog>().count_of(NoticeKind::EffectExpired),
        1
    );
}

#[test]
fn connection_ledger_rejects_repeat_ids_and_node_ledger_does_not() {
    let mut app = app();
    let effect = OngoingEffect::new("patrol", Attribute::Security, 1, 3);

    assert!(add_connection_effect(&mut app.world, ConnectionId(1), &effect));
    assert!(!add_connection_effect(&mut app.world, ConnectionId(1), &effect));
    assert!(add_node_effect(&mut app.world, NodeId(1), &effect));
    assert!(add_node_effect(&mut app.world, NodeId(1), &effect));

    assert_eq!(
        connection_effective_level(&mut app.world, ConnectionId(1)),
        Some(SecurityLevel::High)
    );
    assert_eq!(app.world.resource::<EffectAuditRegistry>().total(), 3);
}

#[test]
fn security_guard_resets_each_turn() {
    let mut app = app();
    assert!(change_connection_security(&mut app.world, ConnectionId(1), -1));
    assert!(!change_connection_security(&mut app.world, ConnectionId(1), -1));
    assert_eq!(
        connection_effective_level(&mut app.world, ConnectionId(1)),
        Some(SecurityLevel::Low)
    );

    run_turn(&mut app);
    assert!(change_connection_security(&mut app.world, ConnectionId(1), -1));
    assert_eq!(
        connection_effective_level(&mut app.world, ConnectionId(1)),
        Some(SecurityLevel::None)
    );
}
