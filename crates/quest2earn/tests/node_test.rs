//! End-to-end run of the bundled scenario.

use std::path::PathBuf;

use quest2earn::chain::{ChainConfig, ContractCall, GameChain, Receipt, Transaction};
use quest2earn::engine::GameEngine;
use quest2earn::shared::{Principal, DEFAULT_CONTRACT_OWNER};
use quest2earn::{load_config, load_script, run_script};

fn data(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../data")
        .join(file)
}

fn chain() -> GameChain {
    let config = load_config(Some(&data("game.toml"))).unwrap();
    let owner: Principal = DEFAULT_CONTRACT_OWNER.parse().unwrap();
    GameChain::new(GameEngine::new(config, owner).unwrap(), &ChainConfig::default()).unwrap()
}

#[test]
fn test_bundled_scenario() {
    let blocks = load_script(&data("scenario.json")).unwrap();
    let chain = chain();
    let mut out = Vec::new();

    let summary = run_script(&chain, &blocks, &mut out).unwrap();

    assert_eq!(summary.height, 13);
    assert_eq!(summary.transactions, 14);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.characters, 2);
    assert_eq!(summary.quests, 1);
    // The potion is burned, the sword stays.
    assert_eq!(summary.items, 1);
    assert_eq!(summary.tip, chain.tip().to_string());

    let text = String::from_utf8(out).unwrap();
    let receipts: Vec<Receipt> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(receipts.len(), 14);

    let failed: Vec<&str> = receipts
        .iter()
        .filter_map(|r| r.error.as_ref().map(|e| e.name.as_str()))
        .collect();
    assert_eq!(failed, ["ERR-QUEST-NOT-READY", "ERR-INVALID-AMOUNT"]);

    chain.read(|state| {
        let minted: u64 = state.ledger().holders().map(|(_, v)| v).sum();
        assert_eq!(minted, summary.total_supply);
    });
}

#[test]
fn test_same_script_same_output() {
    let blocks = load_script(&data("scenario.json")).unwrap();
    let mut first = Vec::new();
    let mut second = Vec::new();

    let a = run_script(&chain(), &blocks, &mut first).unwrap();
    let b = run_script(&chain(), &blocks, &mut second).unwrap();

    assert_eq!(a, b);
    assert_eq!(first, second);
}

#[test]
fn test_output_complete_with_small_channels() {
    let owner: Principal = DEFAULT_CONTRACT_OWNER.parse().unwrap();
    let engine = GameEngine::new(load_config(None).unwrap(), owner.clone()).unwrap();
    let chain = GameChain::new(engine, &ChainConfig { channel_buffer: 2 }).unwrap();
    let block: Vec<Transaction> = (0..5)
        .map(|i| {
            Transaction::new(
                owner.clone(),
                ContractCall::CreateCharacter {
                    name: format!("Hero{i}"),
                    class: 1,
                },
            )
        })
        .collect();
    let mut out = Vec::new();

    let summary = run_script(&chain, &[block], &mut out).unwrap();

    assert_eq!(summary.characters, 5);
    assert_eq!(summary.transactions, 5);
    assert_eq!(summary.failed, 0);
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 5);
}
