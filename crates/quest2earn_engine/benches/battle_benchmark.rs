//! Benchmark for battle resolution.
//!
//! Run with: cargo bench --package quest2earn_engine --bench battle_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quest2earn_engine::battle::{battle_roll, BlockSalt};
use quest2earn_engine::{CallContext, GameConfig, GameEngine};
use quest2earn_shared::Principal;

fn benchmark_roll(c: &mut Criterion) {
    let salt = BlockSalt::test_salt();
    c.bench_function("battle_roll", |b| {
        let mut nonce = 0u64;
        b.iter(|| {
            nonce = nonce.wrapping_add(1);
            black_box(battle_roll(salt, 1, 2, 100, nonce))
        });
    });
}

fn benchmark_battle(c: &mut Criterion) {
    let owner: Principal = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".parse().unwrap();
    let player: Principal = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG".parse().unwrap();
    let rival: Principal = "ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC".parse().unwrap();

    let engine = GameEngine::new(GameConfig::default(), owner).unwrap();
    let mut state = engine.genesis_state().unwrap();
    engine
        .create_character(&mut state, &CallContext::new(player.clone(), 0), "Hero", 1)
        .unwrap();
    engine
        .create_character(&mut state, &CallContext::new(rival, 0), "Rival", 2)
        .unwrap();

    let ctx = CallContext::new(player, 1).with_salt(BlockSalt::test_salt());
    c.bench_function("battle_character", |b| {
        b.iter(|| {
            let mut trial = state.clone();
            black_box(engine.battle_character(&mut trial, &ctx, 1, 2))
        });
    });
}

criterion_group!(benches, benchmark_roll, benchmark_battle);
criterion_main!(benches);
