mod common;

use intrigue_core::resolution::{add_connection_effect, add_node_effect};
use intrigue_core::{
    run_turn, Attribute, ConnectionId, MessageLog, NodeId, NoticeKind, NoticeSubject,
    OngoingEffect,
};

#[test]
fn expiries_are_reported_nodes_first_in_id_order() {
    let mut app = common::seeded_app();
    let receiver = app.world.resource_mut::<MessageLog>().subscribe();

    let expiring = |id: &str, attribute| OngoingEffect::new(id, attribute, 1, 1);
    add_connection_effect(&mut app.world, ConnectionId(2), &expiring("c2", Attribute::Security));
    add_node_effect(&mut app.world, NodeId(3), &expiring("n3", Attribute::Support));
    add_connection_effect(&mut app.world, ConnectionId(1), &expiring("c1", Attribute::Security));
    add_node_effect(&mut app.world, NodeId(1), &expiring("n1", Attribute::Stability));

    run_turn(&mut app);

    let subjects: Vec<NoticeSubject> = receiver
        .try_iter()
        .filter(|notice| notice.kind == NoticeKind::EffectExpired)
        .map(|notice| notice.subject)
        .collect();
    assert_eq!(
        subjects,
        vec![
            NoticeSubject::Node(NodeId(1)),
            NoticeSubject::Node(NodeId(3)),
            NoticeSubject::Connection(ConnectionId(1)),
            NoticeSubject::Connection(ConnectionId(2)),
        ]
    );
}

#[test]
fn idle_turns_emit_nothing() {
    let mut app = common::seeded_app();
    for _ in 0..3 {
        run_turn(&mut app);
    }
    assert!(app.world.resource::<MessageLog>().is_empty());
}
