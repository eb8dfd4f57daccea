use btree::{ActionStatus, BehaviourTree, Node, TreeOptions};
use btree_core::MemoryBlackboard;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_sequence_tick(c: &mut Criterion) {
    let mut board = MemoryBlackboard::new().with_condition("alwaysTrue", |_| true);

    let conditions = (0..32).map(|_| Node::condition("alwaysTrue")).collect();
    let mut tree = BehaviourTree::new(Node::sequence(conditions)).with_options(TreeOptions {
        restart_on_completion: true,
        ..TreeOptions::default()
    });

    let mut now: u64 = 0;
    c.bench_function("btree/tick(conditions=32)", |b| {
        b.iter(|| {
            let state = tree.tick(&mut board, now);
            black_box(state.ok());
            now = now.wrapping_add(1);
        })
    });
}

fn bench_lotto_tick(c: &mut Criterion) {
    let mut board = MemoryBlackboard::new().with_operation("work", |_, _| ActionStatus::Success);

    let children = (0..16).map(|_| Node::action("work")).collect();
    let tickets = (1..=16).collect();
    let mut tree = BehaviourTree::new(Node::lotto(tickets, children)).with_options(TreeOptions {
        seed: 7,
        restart_on_completion: true,
    });

    let mut now: u64 = 0;
    c.bench_function("btree/tick(lotto=16)", |b| {
        b.iter(|| {
            black_box(tree.tick(&mut board, now).ok());
            now = now.wrapping_add(1);
        })
    });
}

criterion_group!(benches, bench_sequence_tick, bench_lotto_tick);
criterion_main!(benches);
