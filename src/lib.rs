//! Weighted consistent-hashing ring.
//!
//! Keys and node replicas are placed on a 32-bit circle using MD5; a key is
//! owned by the first replica point strictly after its own point. Placement is
//! bit-compatible with other ketama-style rings that hash `"<node>-<index>"`
//! and take three little-endian points per digest.

pub mod circle;
pub mod config;
pub mod hasher;
pub mod registry;
mod ring;
pub mod telemetry;

#[cfg(test)]
mod test_utils;

pub use crate::circle::Circle;
pub use crate::config::{ConfigError, NodeSpec, RingConfig};
pub use crate::registry::{DEFAULT_WEIGHT, Node, Registry, RegistryError, Weight};
pub use crate::ring::HashRing;
