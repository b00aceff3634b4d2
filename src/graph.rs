//! Dependency graph module.
//!
//! Provides the `DependencyGraph` type, a directed acyclic graph of
//! property ids used to validate a whole combine-property wiring before
//! play. The runtime guard in `Property::get_value` catches cycles during
//! evaluation; this graph catches them statically, without evaluating
//! anything.

use crate::error::StatError;
use crate::property_id::PropertyId;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// A directed graph of property dependencies.
///
/// Nodes are property ids; an edge added with
/// [`add_edge(dependent, dependency)`](DependencyGraph::add_edge) records
/// that `dependent` reads `dependency`, so a topological sort lists
/// dependencies before their dependents.
///
/// # Examples
///
/// ```rust
/// use modstat::{DependencyGraph, PropertyId};
///
/// let mut graph = DependencyGraph::new();
/// let atk = PropertyId::from_str("FinalAtk");
/// let base = PropertyId::from_str("Base");
///
/// graph.add_edge(atk.clone(), base.clone());
/// assert!(graph.detect_cycles().is_ok());
///
/// let order = graph.topological_sort().unwrap();
/// assert_eq!(order, vec![base, atk]);
/// ```
pub struct DependencyGraph {
    graph: DiGraph<PropertyId, ()>,
    indices: HashMap<PropertyId, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            indices: HashMap::new(),
        }
    }

    /// Add a node, returning the existing index if it is already present.
    pub fn add_node(&mut self, id: PropertyId) -> NodeIndex {
        if let Some(&idx) = self.indices.get(&id) {
            idx
        } else {
            let idx = self.graph.add_node(id.clone());
            self.indices.insert(id, idx);
            idx
        }
    }

    /// Record that `dependent` reads `dependency`.
    ///
    /// Both nodes are added if missing. The stored edge runs
    /// dependency → dependent so that traversal order matches evaluation
    /// order.
    pub fn add_edge(&mut self, dependent: PropertyId, dependency: PropertyId) {
        let dependent_idx = self.add_node(dependent);
        let dependency_idx = self.add_node(dependency);
        self.graph.add_edge(dependency_idx, dependent_idx, ());
    }

    /// Check whether a node exists in the graph.
    pub fn contains_node(&self, id: &PropertyId) -> bool {
        self.indices.contains_key(id)
    }

    /// All property ids in the graph.
    pub fn nodes(&self) -> Vec<PropertyId> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Detect cycles by depth-first search.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the graph is acyclic
    /// * `Err(StatError::CycleDetected)` with the closed cycle path
    ///   otherwise
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modstat::{DependencyGraph, PropertyId};
    ///
    /// let mut graph = DependencyGraph::new();
    /// let a = PropertyId::from_str("A");
    /// let b = PropertyId::from_str("B");
    ///
    /// graph.add_edge(a.clone(), b.clone());
    /// graph.add_edge(b, a);
    /// assert!(graph.detect_cycles().is_err());
    /// ```
    pub fn detect_cycles(&self) -> Result<(), StatError> {
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();
        let mut path = Vec::new();

        for start in self.graph.node_indices() {
            if !visited.contains(&start) {
                self.dfs(start, &mut visited, &mut on_stack, &mut path)?;
            }
        }
        Ok(())
    }

    fn dfs(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        on_stack: &mut HashSet<NodeIndex>,
        path: &mut Vec<PropertyId>,
    ) -> Result<(), StatError> {
        visited.insert(node);
        on_stack.insert(node);
        path.push(self.graph[node].clone());

        for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
            if !visited.contains(&next) {
                self.dfs(next, visited, on_stack, path)?;
            } else if on_stack.contains(&next) {
                let entry = self.graph[next].clone();
                // Keep only the cycle portion of the walk, closed at both ends.
                let start = path.iter().position(|id| *id == entry).unwrap_or(0);
                let mut cycle: Vec<PropertyId> = path[start..].to_vec();
                cycle.push(entry);
                return Err(StatError::CycleDetected { path: cycle });
            }
        }

        on_stack.remove(&node);
        path.pop();
        Ok(())
    }

    /// Topologically sort the graph, dependencies first.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PropertyId>)` with a valid evaluation order
    /// * `Err(StatError::CycleDetected)` if the graph has a cycle
    pub fn topological_sort(&self) -> Result<Vec<PropertyId>, StatError> {
        self.detect_cycles()?;

        match toposort(&self.graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect()),
            Err(cycle) => Err(StatError::CycleDetected {
                path: vec![self.graph[cycle.node_id()].clone()],
            }),
        }
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
