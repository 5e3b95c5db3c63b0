use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use intrigue_core::{
    build_headless_app_with_config, run_turn, Attribute, Connection, ConnectionId,
    EffectAuditRegistry, EngineConfig, Node, NodeId, OngoingEffect, SecurityLevel,
};

const NODES: u32 = 64;

fn populated_app(effects_per_entity: u32) -> bevy::app::App {
    let mut app = build_headless_app_with_config(Arc::new(EngineConfig::default()));
    let mut registry = EffectAuditRegistry::default();

    for index in 0..NODES {
        let mut node = Node::new(NodeId(index), format!("node-{index}")).with_base(1, 2, 1);
        let mut connection = Connection::new(
            ConnectionId(index),
            NodeId(index),
            NodeId((index + 1) % NODES),
            SecurityLevel::Medium,
        );
        for effect in 0..effects_per_entity {
            let turns = 1 + (effect % 5) as i32;
            node.add_ongoing_effect(
                &OngoingEffect::new(format!("n{effect}"), Attribute::Stability, 1, turns),
                &mut registry,
            );
            connection.add_ongoing_effect(
                &OngoingEffect::new(format!("c{effect}"), Attribute::Security, -1, turns),
                &mut registry,
            );
        }
        app.world.spawn(node);
        app.world.spawn(connection);
    }
    app.world.insert_resource(registry);
    app
}

fn bench_turn(c: &mut Criterion) {
    let mut group = c.benchmark_group("turn");

    for size in [0u32, 4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("ledger", size), &size, |b, &size| {
            b.iter_batched(
                || populated_app(size),
                |mut app| {
                    run_turn(&mut app);
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(turn_benches, bench_turn);
criterion_main!(turn_benches);
