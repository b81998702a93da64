use std::collections::HashSet;

use thiserror::Error;

/// Node weights. Only values greater than zero are ever stored.
pub type Weight = i64;

pub const DEFAULT_WEIGHT: Weight = 1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Weight must be positive, got {0}")]
    InvalidWeight(Weight),

    #[error("Node '{0}' is already registered")]
    DuplicateNode(String),

    #[error("Node '{0}' is not registered")]
    NodeNotFound(String),

    #[error("Node '{node}' already has weight {weight}")]
    WeightUnchanged { node: String, weight: Weight },

    #[error("Supplied weights differ from the registered weights")]
    WeightsMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub weight: Weight,
}

/// Ordered set of nodes and their weights.
///
/// Insertion order is significant: the circle is generated by walking the
/// nodes in this order, and when two replicas land on the same point the one
/// processed last owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    nodes: Vec<Node>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from `(id, weight)` pairs.
    ///
    /// A repeated id keeps the position of its first occurrence and the weight
    /// of its last. Non-positive weights fall back to [`DEFAULT_WEIGHT`], so
    /// every stored weight is positive. Other ketama-style rings only default
    /// a zero weight and let a negative one yield no replicas; here a negative
    /// weight places the node like weight 1.
    pub fn from_weights<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, Weight)>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for (id, weight) in weights {
            let id = id.into();
            let weight = if weight > 0 { weight } else { DEFAULT_WEIGHT };
            match registry.index_of(&id) {
                Some(idx) => registry.nodes[idx].weight = weight,
                None => registry.nodes.push(Node { id, weight }),
            }
        }
        registry
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_weights(ids.into_iter().map(|id| (id, DEFAULT_WEIGHT)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn weight(&self, id: &str) -> Option<Weight> {
        self.index_of(id).map(|idx| self.nodes[idx].weight)
    }

    pub fn total_weight(&self) -> u128 {
        self.nodes.iter().map(|node| node.weight as u128).sum()
    }

    pub fn add(&mut self, id: &str, weight: Weight) -> Result<(), RegistryError> {
        if weight <= 0 {
            return Err(RegistryError::InvalidWeight(weight));
        }
        if self.contains(id) {
            return Err(RegistryError::DuplicateNode(id.to_string()));
        }
        self.nodes.push(Node {
            id: id.to_string(),
            weight,
        });
        Ok(())
    }

    pub fn update(&mut self, id: &str, weight: Weight) -> Result<(), RegistryError> {
        if weight <= 0 {
            return Err(RegistryError::InvalidWeight(weight));
        }
        let idx = self
            .index_of(id)
            .ok_or_else(|| RegistryError::NodeNotFound(id.to_string()))?;
        let node = &mut self.nodes[idx];
        if node.weight == weight {
            return Err(RegistryError::WeightUnchanged {
                node: id.to_string(),
                weight,
            });
        }
        node.weight = weight;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<(), RegistryError> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| RegistryError::NodeNotFound(id.to_string()))?;
        self.nodes.remove(idx);
        Ok(())
    }

    /// Replaces the registry with `weights`, but only when `weights` holds
    /// exactly the registered `(id, weight)` pairs. The comparison ignores
    /// order; on success the supplied order becomes the registry order.
    pub fn replace_if_unchanged(&mut self, weights: &[(String, Weight)]) -> Result<(), RegistryError> {
        if !self.same_weights(weights) {
            return Err(RegistryError::WeightsMismatch);
        }
        self.nodes = weights
            .iter()
            .map(|(id, weight)| Node {
                id: id.clone(),
                weight: *weight,
            })
            .collect();
        Ok(())
    }

    fn same_weights(&self, weights: &[(String, Weight)]) -> bool {
        let mut seen = HashSet::with_capacity(weights.len());
        weights.len() == self.nodes.len()
            && weights
                .iter()
                .all(|(id, weight)| seen.insert(id.as_str()) && self.weight(id) == Some(*weight))
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }
}
