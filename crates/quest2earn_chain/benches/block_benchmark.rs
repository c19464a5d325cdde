//! Benchmark for block execution.
//!
//! Run with: cargo bench --package quest2earn_chain --bench block_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quest2earn_chain::{ChainState, ContractCall, Transaction};
use quest2earn_engine::{GameConfig, GameEngine};
use quest2earn_shared::Principal;

fn benchmark_block(c: &mut Criterion) {
    let owner: Principal = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".parse().unwrap();
    let mut config = GameConfig::default();
    config.limits.max_characters_per_player = 1_000;
    let engine = GameEngine::new(config, owner.clone()).unwrap();

    let block: Vec<Transaction> = (0..100)
        .map(|i| {
            Transaction::new(
                owner.clone(),
                ContractCall::CreateCharacter {
                    name: format!("Hero{i}"),
                    class: (i % 4 + 1) as u8,
                },
            )
        })
        .collect();

    let genesis = ChainState::genesis(&engine).unwrap();
    c.bench_function("execute_block_100_characters", |b| {
        b.iter(|| {
            let mut state = genesis.clone();
            black_box(state.execute_block(&engine, &block).unwrap())
        });
    });
}

criterion_group!(benches, benchmark_block);
criterion_main!(benches);
