use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::circle::Circle;
use crate::registry::{DEFAULT_WEIGHT, Registry, RegistryError, Weight};

/// A weighted consistent-hashing ring.
///
/// Lookups run against an immutable [`Circle`] snapshot. Every successful
/// mutation regenerates the circle from the registry and publishes it with a
/// single pointer swap, so a reader sees either the old or the new circle and
/// never a partial one. Mutations are serialised on the registry lock; readers
/// never wait for a rebuild.
///
/// Cloning a `HashRing` yields another handle to the same ring.
#[derive(Debug, Clone, Default)]
pub struct HashRing {
    registry: Arc<Mutex<Registry>>,
    circle: Arc<Mutex<Arc<Circle>>>,
}

impl HashRing {
    /// Creates a ring where every node has weight 1.
    pub fn new<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_registry(Registry::from_ids(nodes))
    }

    /// Creates a ring from `(node, weight)` pairs, in order.
    pub fn with_weights<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, Weight)>,
        S: Into<String>,
    {
        Self::from_registry(Registry::from_weights(weights))
    }

    pub fn from_registry(registry: Registry) -> Self {
        let circle = Arc::new(Circle::build(&registry));
        Self {
            registry: Arc::new(Mutex::new(registry)),
            circle: Arc::new(Mutex::new(circle)),
        }
    }

    /// Returns the circle currently used for lookups.
    pub fn snapshot(&self) -> Arc<Circle> {
        lock(&self.circle).clone()
    }

    /// Returns the node for `key`, or an empty string if the ring is empty.
    pub fn get_node(&self, key: &str) -> String {
        let node = self.snapshot().get_node(key);
        trace!(key, node = %node, "Resolved key");
        node
    }

    /// Returns `size` distinct nodes for `key`, starting with its owner.
    ///
    /// The result is empty when the ring is empty or when `size` exceeds the
    /// number of registered nodes. `size == 0` returns every node on the ring.
    pub fn get_nodes(&self, key: &str, size: usize) -> Vec<String> {
        let nodes = self.snapshot().get_nodes(key, size);
        trace!(key, size, nodes = ?nodes, "Resolved key to node set");
        nodes
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.snapshot().position(key)
    }

    pub fn add_node(&self, node: &str) -> bool {
        self.try_add_node(node).is_ok()
    }

    pub fn add_weighted_node(&self, node: &str, weight: Weight) -> bool {
        self.try_add_weighted_node(node, weight).is_ok()
    }

    pub fn update_weighted_node(&self, node: &str, weight: Weight) -> bool {
        self.try_update_weighted_node(node, weight).is_ok()
    }

    pub fn remove_node(&self, node: &str) -> bool {
        self.try_remove_node(node).is_ok()
    }

    /// Succeeds only when `weights` matches the registered weights exactly;
    /// see [`HashRing::try_update_with_weights`].
    pub fn update_with_weights<I, S>(&self, weights: I) -> bool
    where
        I: IntoIterator<Item = (S, Weight)>,
        S: Into<String>,
    {
        self.try_update_with_weights(weights).is_ok()
    }

    pub fn try_add_node(&self, node: &str) -> Result<(), RegistryError> {
        self.try_add_weighted_node(node, DEFAULT_WEIGHT)
    }

    pub fn try_add_weighted_node(&self, node: &str, weight: Weight) -> Result<(), RegistryError> {
        self.mutate("add", |registry| registry.add(node, weight))
    }

    pub fn try_update_weighted_node(&self, node: &str, weight: Weight) -> Result<(), RegistryError> {
        self.mutate("update", |registry| registry.update(node, weight))
    }

    pub fn try_remove_node(&self, node: &str) -> Result<(), RegistryError> {
        self.mutate("remove", |registry| registry.remove(node))
    }

    /// Replaces the registry with `weights` and rebuilds, but only if
    /// `weights` holds exactly the currently registered `(node, weight)`
    /// pairs. Any other input fails with [`RegistryError::WeightsMismatch`].
    ///
    /// Effective weights therefore never change through this call; only the
    /// node order can, and with it the owner of colliding points.
    pub fn try_update_with_weights<I, S>(&self, weights: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (S, Weight)>,
        S: Into<String>,
    {
        let weights: Vec<(String, Weight)> = weights.into_iter().map(|(node, weight)| (node.into(), weight)).collect();
        self.mutate("replace", |registry| registry.replace_if_unchanged(&weights))
    }

    /// Registered nodes in registry order.
    pub fn nodes(&self) -> Vec<String> {
        lock(&self.registry).iter().map(|node| node.id.clone()).collect()
    }

    pub fn weights(&self) -> Vec<(String, Weight)> {
        lock(&self.registry)
            .iter()
            .map(|node| (node.id.clone(), node.weight))
            .collect()
    }

    pub fn weight(&self, node: &str) -> Option<Weight> {
        lock(&self.registry).weight(node)
    }

    pub fn contains(&self, node: &str) -> bool {
        lock(&self.registry).contains(node)
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.registry).is_empty()
    }

    /// Applies `op` to the registry and, if it succeeds, publishes a freshly
    /// built circle. The registry lock is held across the rebuild so writers
    /// publish in the order they mutated.
    fn mutate<F>(&self, op: &'static str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut Registry) -> Result<(), RegistryError>,
    {
        let mut registry = lock(&self.registry);
        if let Err(e) = f(&mut registry) {
            debug!(op, error = %e, "Rejected ring mutation");
            return Err(e);
        }

        let circle = Arc::new(Circle::build(&registry));
        *lock(&self.circle) = circle;
        debug!(op, nodes = registry.len(), "Published new hash circle");
        Ok(())
    }
}

// Registry and circle are only replaced wholesale, so a panic while a guard
// was held cannot leave either half-written.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
