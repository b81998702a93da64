use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::HashRing;
use crate::registry::{Registry, Weight};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read ring config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serde JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Node '{node}' has non-positive weight {weight}")]
    InvalidWeight { node: String, weight: Weight },
}

/// Static description of a ring's membership.
///
/// ```json
/// { "nodes": ["a", "b", "c"] }
/// { "nodes": { "a": 1, "b": 2, "c": 1 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingConfig {
    #[serde(default)]
    pub nodes: NodeSpec,
}

/// Either a plain list of node ids (weight 1 each) or node ids with weights.
///
/// Weighted entries keep the order in which they appear in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpec {
    Ids(Vec<String>),
    Weighted(Vec<(String, Weight)>),
}

impl Default for NodeSpec {
    fn default() -> Self {
        NodeSpec::Ids(Vec::new())
    }
}

impl RingConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let NodeSpec::Weighted(weights) = &self.nodes {
            if let Some((node, weight)) = weights.iter().find(|(_, weight)| *weight <= 0) {
                return Err(ConfigError::InvalidWeight {
                    node: node.clone(),
                    weight: *weight,
                });
            }
        }
        Ok(())
    }

    pub fn registry(&self) -> Registry {
        match &self.nodes {
            NodeSpec::Ids(ids) => Registry::from_ids(ids.iter().cloned()),
            NodeSpec::Weighted(weights) => Registry::from_weights(weights.iter().cloned()),
        }
    }

    pub fn build(&self) -> HashRing {
        HashRing::from_registry(self.registry())
    }
}

impl Serialize for NodeSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NodeSpec::Ids(ids) => serializer.collect_seq(ids),
            NodeSpec::Weighted(weights) => serializer.collect_map(weights.iter().map(|(node, weight)| (node, weight))),
        }
    }
}

impl<'de> Deserialize<'de> for NodeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeSpecVisitor)
    }
}

struct NodeSpecVisitor;

impl<'de> Visitor<'de> for NodeSpecVisitor {
    type Value = NodeSpec;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a list of node ids or a map of node id to weight")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<NodeSpec, A::Error> {
        let mut ids = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(id) = seq.next_element::<String>()? {
            ids.push(id);
        }
        Ok(NodeSpec::Ids(ids))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<NodeSpec, A::Error> {
        let mut weights = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((node, weight)) = map.next_entry::<String, Weight>()? {
            weights.push((node, weight));
        }
        Ok(NodeSpec::Weighted(weights))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_parse_node_list() {
        let config = RingConfig::from_json(r#"{ "nodes": ["a", "b", "c"] }"#).unwrap();
        assert_eq!(config.nodes, NodeSpec::Ids(vec!["a".into(), "b".into(), "c".into()]));
    }

    #[test]
    fn test_parse_weighted_nodes_keeps_document_order() {
        let config = RingConfig::from_json(r#"{ "nodes": { "c": 1, "a": 3, "b": 2 } }"#).unwrap();
        assert_eq!(
            config.nodes,
            NodeSpec::Weighted(vec![("c".into(), 1), ("a".into(), 3), ("b".into(), 2)])
        );
        assert_eq!(config.build().nodes(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_missing_nodes_is_empty_ring() {
        let config = RingConfig::from_json("{}").unwrap();
        assert!(config.build().is_empty());
    }

    #[test]
    fn test_rejects_non_positive_weight() {
        let err = RingConfig::from_json(r#"{ "nodes": { "a": 1, "b": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWeight { ref node, weight: 0 } if node == "b"));
    }

    #[test]
    fn test_rejects_malformed_nodes() {
        let err = RingConfig::from_json(r#"{ "nodes": "a" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SerdeJsonError(_)));

        let err = RingConfig::from_json(r#"{ "nodes": { "a": "heavy" } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SerdeJsonError(_)));
    }

    #[test]
    fn test_serialize_round_trips_weighted_order() {
        let config = RingConfig {
            nodes: NodeSpec::Weighted(vec![("b".into(), 2), ("a".into(), 1)]),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"nodes":{"b":2,"a":1}}"#);
        assert_eq!(RingConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "nodes": {{ "a": 1, "b": 2, "c": 1 }} }}"#).unwrap();

        let ring = RingConfig::from_path(file.path()).unwrap().build();
        assert_eq!(ring.get_node("test"), "b");
        assert_eq!(ring.get_node("test3"), "c");
    }

    #[test]
    fn test_from_missing_path() {
        let err = RingConfig::from_path("/nonexistent/ring.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
