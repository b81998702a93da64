use crate::HashRing;

pub fn abc_ring() -> HashRing {
    let _ = crate::telemetry::init();
    HashRing::new(["a", "b", "c"])
}

#[track_caller]
pub fn expect_node(ring: &HashRing, key: &str, expected: &str) {
    assert_eq!(ring.get_node(key), expected, "key {key:?}");
}

#[track_caller]
pub fn expect_nodes(ring: &HashRing, key: &str, expected: &[&str]) {
    assert_eq!(ring.get_nodes(key, expected.len()), expected, "key {key:?}");
}
