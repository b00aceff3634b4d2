//! Combine-property manager module.
//!
//! A keyed registry of combine nodes for bulk lookup and enumeration,
//! plus static whole-graph validation of the wiring between nodes.

use crate::combine::CombineProperty;
use crate::error::StatError;
use crate::graph::DependencyGraph;
use crate::property_id::PropertyId;
use std::collections::HashMap;

/// Registry of combine-property nodes keyed by id.
///
/// # Examples
///
/// ```rust
/// use modstat::{CombineProperty, CombinePropertyManager, EngineContext};
///
/// let ctx = EngineContext::with_seed(0).into_shared();
/// let mut manager = CombinePropertyManager::new();
///
/// manager.add_or_update(CombineProperty::new(&ctx, "FinalAtk", |_| Ok(0.0)));
/// manager.add_or_update(CombineProperty::new(&ctx, "FinalDef", |_| Ok(0.0)));
///
/// assert_eq!(manager.len(), 2);
/// assert!(manager.get("FinalAtk").is_some());
/// assert!(manager.get("FinalCrit").is_none());
/// ```
pub struct CombinePropertyManager {
    nodes: HashMap<PropertyId, CombineProperty>,
}

impl CombinePropertyManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Insert a node keyed by its id, replacing any node with the same id.
    pub fn add_or_update(&mut self, node: CombineProperty) {
        let id = node.id();
        if self.nodes.insert(id.clone(), node).is_some() {
            log::debug!("combine manager: replaced node {}", id);
        }
    }

    /// Look up a node by id.
    pub fn get(&self, id: &str) -> Option<&CombineProperty> {
        self.nodes.get(id)
    }

    /// Remove a node by id, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<CombineProperty> {
        self.nodes.remove(id)
    }

    /// Every registered node, in no particular order.
    pub fn get_all(&self) -> Vec<&CombineProperty> {
        self.nodes.values().collect()
    }

    /// The number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the manager holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build the static dependency graph of the registered nodes.
    ///
    /// Each node depends on every child registered with it; children that
    /// are other nodes' result holders link the graph across levels.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for node in self.nodes.values() {
            let node_id = node.id();
            graph.add_node(node_id.clone());
            for child in node.child_ids() {
                graph.add_edge(node_id.clone(), child);
            }
        }
        graph
    }

    /// Validate that the registered wiring is acyclic.
    ///
    /// Use this before play to reject a miswired graph up front instead
    /// of hitting [`StatError::CycleDetected`] during evaluation.
    pub fn ensure_acyclic(&self) -> Result<(), StatError> {
        self.dependency_graph().detect_cycles()
    }
}

impl Default for CombinePropertyManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EngineContext;
    use crate::property::Property;
    use std::rc::Rc;

    fn ctx() -> Rc<EngineContext> {
        EngineContext::with_seed(0).into_shared()
    }

    #[test]
    fn test_add_get_remove() {
        let ctx = ctx();
        let mut manager = CombinePropertyManager::new();
        assert!(manager.is_empty());

        manager.add_or_update(CombineProperty::new(&ctx, "A", |_| Ok(1.0)));
        manager.add_or_update(CombineProperty::new(&ctx, "B", |_| Ok(2.0)));
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.get_all().len(), 2);

        assert_eq!(manager.get("A").unwrap().get_value().unwrap(), 1.0);
        assert!(manager.remove("A").is_some());
        assert!(manager.get("A").is_none());
        assert!(manager.remove("A").is_none());
    }

    #[test]
    fn test_add_or_update_replaces() {
        let ctx = ctx();
        let mut manager = CombinePropertyManager::new();

        manager.add_or_update(CombineProperty::new(&ctx, "A", |_| Ok(1.0)));
        manager.add_or_update(CombineProperty::new(&ctx, "A", |_| Ok(9.0)));

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.get("A").unwrap().get_value().unwrap(), 9.0);
    }

    #[test]
    fn test_dependency_graph_spans_levels() {
        let ctx = ctx();
        let leaf = Property::new(&ctx, "Leaf", 1.0);

        let lower = CombineProperty::new(&ctx, "Lower", |n| n.child_value("Leaf"));
        lower.register_property(&leaf);

        let upper = CombineProperty::new(&ctx, "Upper", |n| n.child_value("Lower"));
        upper.register_property(&lower.result_property());

        let mut manager = CombinePropertyManager::new();
        manager.add_or_update(lower);
        manager.add_or_update(upper);

        let graph = manager.dependency_graph();
        assert!(graph.contains_node(&PropertyId::from_str("Leaf")));
        assert!(graph.contains_node(&PropertyId::from_str("Lower")));
        assert!(graph.contains_node(&PropertyId::from_str("Upper")));
        assert!(manager.ensure_acyclic().is_ok());

        let order = graph.topological_sort().unwrap();
        let pos = |name: &str| {
            order
                .iter()
                .position(|id| id.as_str() == name)
                .unwrap()
        };
        assert!(pos("Leaf") < pos("Lower"));
        assert!(pos("Lower") < pos("Upper"));
    }

    #[test]
    fn test_ensure_acyclic_rejects_mutual_reads() {
        let ctx = ctx();
        let a = CombineProperty::new(&ctx, "A", |n| n.child_value("B"));
        let b = CombineProperty::new(&ctx, "B", |n| n.child_value("A"));
        a.register_property(&b.result_property());
        b.register_property(&a.result_property());

        let mut manager = CombinePropertyManager::new();
        manager.add_or_update(a);
        manager.add_or_update(b);

        assert!(manager.ensure_acyclic().is_err());
    }
}
