use bevy::prelude::*;
use tracing::{debug, info};

use crate::{
    connection::Connection,
    effects::{EffectAuditRegistry, OngoingEffect},
    messages::{MessageLog, Notice, NoticeKind, NoticeSubject},
    node::Node,
    resources::TurnState,
};

fn expiry_text(effect: &OngoingEffect, owner: &str) -> String {
    let label = if effect.origin.is_empty() {
        effect.id.as_str()
    } else {
        effect.origin.as_str()
    };
    format!("{label} at {owner} has ended")
}

/// Decrement every node ledger once, in ascending `NodeId` order.
pub fn tick_node_effects(
    turn: Res<TurnState>,
    mut nodes: Query<&mut Node>,
    mut registry: ResMut<EffectAuditRegistry>,
    mut messages: ResMut<MessageLog>,
) {
    let mut ordered: Vec<Mut<Node>> = nodes.iter_mut().collect();
    ordered.sort_unstable_by_key(|node| node.id);

    for mut node in ordered {
        if node.ledger.is_empty() {
            continue;
        }
        let expired = node.tick_effects(&mut registry);
        for effect in expired {
            messages.push(Notice {
                turn: turn.turn,
                kind: NoticeKind::EffectExpired,
                subject: NoticeSubject::Node(node.id),
                text: expiry_text(&effect, &node.name),
                magnitude: effect.magnitude,
            });
        }
    }
}

/// Decrement every connection ledger once, in ascending `ConnectionId`
/// order. Runs after the nodes.
pub fn tick_connection_effects(
    turn: Res<TurnState>,
    mut connections: Query<&mut Connection>,
    mut registry: ResMut<EffectAuditRegistry>,
    mut messages: ResMut<MessageLog>,
) {
    let mut ordered: Vec<Mut<Connection>> = connections.iter_mut().collect();
    ordered.sort_unstable_by_key(|connection| connection.id);

    for mut connection in ordered {
        if connection.ledger.is_empty() {
            continue;
        }
        let expired = connection.tick_effects(&mut registry);
        for effect in expired {
            messages.push(Notice {
                turn: turn.turn,
                kind: NoticeKind::EffectExpired,
                subject: NoticeSubject::Connection(connection.id),
                text: expiry_text(&effect, &format!("connection {}", connection.id)),
                magnitude: effect.magnitude,
            });
        }
    }
}

/// Clears the once-per-resolution guard on every connection.
pub fn reset_security_adjustments(mut connections: Query<&mut Connection>) {
    for mut connection in connections.iter_mut() {
        if connection.adjusted {
            connection.reset_adjustment();
        }
    }
}

pub fn advance_turn(mut turn: ResMut<TurnState>, messages: Res<MessageLog>) {
    debug!(
        target: "intrigue::turn",
        turn = turn.turn,
        notices = messages.notices_for_turn(turn.turn).count(),
        "turn.notices"
    );
    turn.turn = turn.turn.wrapping_add(1);
    info!(target: "intrigue::turn", turn = turn.turn, "turn.advanced");
}
