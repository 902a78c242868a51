//! Dependency graph over logical ids.
//!
//! Nodes are kept in insertion order. Sorting uses Kahn's algorithm and always picks
//! the earliest-inserted ready node, so the emission order is a pure function of the
//! construction sequence. When no order exists, the strongly connected components
//! that contain a cycle are reported.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::types::{DependencyEdge, EdgeOrigin, LogicalId};

pub(crate) struct DependencyGraph {
    /// Edges point from a dependency to its dependent.
    graph: DiGraph<LogicalId, EdgeOrigin>,
    indices: HashMap<LogicalId, NodeIndex>,
}

impl DependencyGraph {
    pub(crate) fn new<'a>(nodes: impl IntoIterator<Item = &'a LogicalId>) -> Self {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        for id in nodes {
            if !indices.contains_key(id) {
                let idx = graph.add_node(id.clone());
                indices.insert(id.clone(), idx);
            }
        }
        DependencyGraph { graph, indices }
    }

    pub(crate) fn contains(&self, id: &LogicalId) -> bool {
        self.indices.contains_key(id)
    }

    /// Record that `from` depends on `to`. The first origin recorded for a pair wins.
    ///
    /// Returns false if either endpoint is unknown.
    pub(crate) fn add_edge(
        &mut self,
        from: &LogicalId,
        to: &LogicalId,
        origin: EdgeOrigin,
    ) -> bool {
        let (Some(&from_idx), Some(&to_idx)) = (self.indices.get(from), self.indices.get(to))
        else {
            return false;
        };
        if self.graph.find_edge(to_idx, from_idx).is_none() {
            self.graph.add_edge(to_idx, from_idx, origin);
        }
        true
    }

    pub(crate) fn edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<DependencyEdge> = self
            .graph
            .raw_edges()
            .iter()
            .map(|e| DependencyEdge {
                from: self.graph[e.target()].clone(),
                to: self.graph[e.source()].clone(),
                origin: e.weight,
            })
            .collect();
        edges.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));
        edges
    }

    /// A dependency-respecting order, or the ids taking part in cycles.
    pub(crate) fn sort(&self) -> Result<Vec<LogicalId>, Vec<LogicalId>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.graph.neighbors_directed(idx, Direction::Incoming).count())
            .collect();

        let mut ready: BTreeSet<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| in_degree[idx.index()] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(idx) = ready.pop_first() {
            order.push(self.graph[idx].clone());
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                let degree = &mut in_degree[next.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(next);
                }
            }
        }

        if order.len() == self.graph.node_count() {
            return Ok(order);
        }
        Err(self.cycle_members())
    }

    fn cycle_members(&self) -> Vec<LogicalId> {
        let mut members: Vec<NodeIndex> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .flatten()
            .collect();
        members.sort();
        members.into_iter().map(|idx| self.graph[idx].clone()).collect()
    }
}
