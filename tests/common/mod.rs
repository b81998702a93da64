#![allow(dead_code)]

use anyhow::{Result, ensure};
use hashring::HashRing;

/// Keys whose placement is pinned by the vector tests.
pub const KEYS: [&str; 8] = ["test", "test1", "test2", "test3", "test4", "test5", "aaaa", "bbbb"];

pub fn init_tracing() {
    let _ = hashring::telemetry::init();
}

pub fn ring(nodes: &[&str]) -> HashRing {
    init_tracing();
    HashRing::new(nodes.iter().copied())
}

/// Checks `get_node` for every key in [`KEYS`] against `expected`, position by
/// position.
pub fn check_nodes(ring: &HashRing, expected: [&str; 8]) -> Result<()> {
    for (key, want) in KEYS.iter().zip(expected) {
        let got = ring.get_node(key);
        ensure!(got == want, "get_node({key:?}) = {got:?}, expected {want:?}");
    }
    Ok(())
}

/// Checks `get_nodes(key, 2)` for every key in [`KEYS`].
pub fn check_pairs(ring: &HashRing, expected: [[&str; 2]; 8]) -> Result<()> {
    for (key, want) in KEYS.iter().zip(expected) {
        let got = ring.get_nodes(key, 2);
        ensure!(got == want, "get_nodes({key:?}, 2) = {got:?}, expected {want:?}");
    }
    Ok(())
}

pub const ABC_NODES: [&str; 8] = ["a", "b", "b", "c", "c", "a", "b", "a"];

pub const ABC_PAIRS: [[&str; 2]; 8] = [
    ["a", "b"],
    ["b", "c"],
    ["b", "a"],
    ["c", "a"],
    ["c", "b"],
    ["a", "c"],
    ["b", "a"],
    ["a", "b"],
];

pub const AC_NODES: [&str; 8] = ["a", "c", "a", "c", "c", "a", "a", "a"];

pub const AC_PAIRS: [[&str; 2]; 8] = [
    ["a", "c"],
    ["c", "a"],
    ["a", "c"],
    ["c", "a"],
    ["c", "a"],
    ["a", "c"],
    ["a", "c"],
    ["a", "c"],
];

pub const ABCD_PAIRS: [[&str; 2]; 8] = [
    ["a", "b"],
    ["b", "d"],
    ["b", "d"],
    ["c", "d"],
    ["c", "b"],
    ["a", "d"],
    ["b", "a"],
    ["a", "b"],
];

pub const WEIGHTED_NODES: [&str; 8] = ["b", "b", "b", "c", "b", "b", "b", "a"];

pub const WEIGHTED_PAIRS: [[&str; 2]; 8] = [
    ["b", "a"],
    ["b", "c"],
    ["b", "a"],
    ["c", "b"],
    ["b", "a"],
    ["b", "a"],
    ["b", "a"],
    ["a", "b"],
];
