use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::build::IndexBuild;
use super::types::{Expansion, GraphEdge, GraphElements, GraphNode, Point};

/// Every node and edge currently materialised, plus the last known position
/// of every placed id. Grows monotonically within one epoch.
#[derive(Debug, Default)]
pub struct GraphState {
    epoch: u64,
    nodes: Vec<GraphNode>,
    index_by_id: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    edge_ids: HashSet<String>,
    positions: HashMap<String, Point>,
}

impl GraphState {
    pub fn from_index(epoch: u64, build: IndexBuild) -> Self {
        let mut state = Self {
            epoch,
            positions: build.positions,
            ..Self::default()
        };
        state.merge(build.elements);
        state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_ids.contains(id)
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds the part of `batch` whose ids are not present yet and returns
    /// exactly what was added.
    pub(super) fn merge(&mut self, batch: GraphElements) -> GraphElements {
        let incoming_nodes = batch.nodes.len();
        let incoming_edges = batch.edges.len();
        let mut added = GraphElements::default();

        for node in batch.nodes {
            if self.index_by_id.contains_key(&node.id) {
                continue;
            }

            self.index_by_id.insert(node.id.clone(), self.nodes.len());
            self.positions.insert(node.id.clone(), node.position);
            self.nodes.push(node.clone());
            added.nodes.push(node);
        }

        for edge in batch.edges {
            if !self.edge_ids.insert(edge.id.clone()) {
                continue;
            }

            self.edges.push(edge.clone());
            added.edges.push(edge);
        }

        let dropped_nodes = incoming_nodes - added.nodes.len();
        let dropped_edges = incoming_edges - added.edges.len();
        if dropped_nodes > 0 || dropped_edges > 0 {
            debug!(
                dropped_nodes,
                dropped_edges, "merge skipped elements already in the graph"
            );
        }

        added
    }

    pub(super) fn set_expansion(&mut self, id: &str, expansion: Expansion) {
        if let Some(&index) = self.index_by_id.get(id) {
            self.nodes[index].expansion = expansion;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build::{build_child_graph, build_index_graph};
    use crate::taxonomy::{CategoryRecord, LeafRecord};

    fn sample_state() -> GraphState {
        let records = ["06", "061", "0613"]
            .into_iter()
            .map(|id| CategoryRecord::new(id, "ICT"))
            .collect::<Vec<_>>();
        GraphState::from_index(1, build_index_graph(&records))
    }

    #[test]
    fn index_build_populates_nodes_edges_and_positions() {
        let state = sample_state();

        assert_eq!(state.epoch(), 1);
        assert_eq!(state.node_count(), 4);
        assert_eq!(state.edge_count(), 3);
        assert_eq!(state.position("r"), Some(Point::ORIGIN));
        assert_eq!(
            state.position("0613"),
            state.node("0613").map(|node| node.position)
        );
        assert!(state.contains_edge("061->0613"));
    }

    #[test]
    fn merge_drops_ids_that_already_exist() {
        let mut state = sample_state();
        let leaves = ["Rust", "Go", "Zig"].map(LeafRecord::named);
        let parent = state.position("0613").unwrap();
        let mut batch = build_child_graph(&leaves, "0613", parent, Point::ORIGIN);

        // One node of the batch is already materialised.
        let existing = batch.nodes[1].clone();
        state.merge(GraphElements {
            nodes: vec![existing],
            edges: Vec::new(),
        });
        let before = state.node_count();

        batch.edges.push(batch.edges[0].clone());
        let added = state.merge(batch.clone());

        assert_eq!(state.node_count(), before + batch.nodes.len() - 1);
        assert_eq!(added.nodes.len(), 2);
        assert_eq!(added.edges.len(), 3);
        assert_eq!(state.edge_count(), 3 + 3);
    }

    #[test]
    fn merge_records_positions_of_new_nodes() {
        let mut state = sample_state();
        let parent = state.position("0613").unwrap();
        let batch = build_child_graph(&[LeafRecord::named("Rust")], "0613", parent, Point::ORIGIN);
        let leaf = batch.nodes[0].clone();

        state.merge(batch);

        assert_eq!(state.position(&leaf.id), Some(leaf.position));
        assert_eq!(state.node(&leaf.id), Some(&leaf));
    }
}
