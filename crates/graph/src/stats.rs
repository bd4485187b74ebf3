use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::view::GraphView;

/// Shape of the story graph at a glance: how much is left dangling or unfinished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    /// Referenced ids with no situation behind them, placeholders included.
    pub missing_targets: usize,
    /// Situations with no way forward.
    pub dead_ends: usize,
    /// Situations nothing points at, in node order.
    pub roots: Vec<String>,
    pub has_cycles: bool,
}

/// Id-indexed directed graph over a view.
struct GraphIndex<'a> {
    graph: DiGraph<&'a str, ()>,
    id_to_idx: HashMap<&'a str, NodeIndex>,
}

impl<'a> GraphIndex<'a> {
    fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_to_idx: HashMap::new(),
        }
    }

    fn add_node(&mut self, id: &'a str) -> NodeIndex {
        if let Some(&idx) = self.id_to_idx.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id);
        self.id_to_idx.insert(id, idx);
        idx
    }

    fn get(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_idx.get(id).copied()
    }
}

pub fn graph_stats(view: &GraphView) -> GraphStats {
    let mut index = GraphIndex::new();
    for node in &view.nodes {
        index.add_node(&node.id);
    }

    let mut dangling: HashSet<&str> = HashSet::new();
    for edge in &view.edges {
        match (index.get(&edge.source), index.get(&edge.target)) {
            (Some(source), Some(target)) => {
                index.graph.add_edge(source, target, ());
            }
            (_, None) => {
                dangling.insert(&edge.target);
            }
            _ => {}
        }
    }

    let placeholders = view.nodes.iter().filter(|n| n.is_missing()).count();
    let mut dead_ends = 0;
    let mut roots = Vec::new();

    for node in view.nodes.iter().filter(|n| !n.is_missing()) {
        let Some(idx) = index.get(&node.id) else {
            continue;
        };
        let graph = &index.graph;
        if graph.neighbors_directed(idx, Direction::Outgoing).next().is_none() {
            dead_ends += 1;
        }
        if graph.neighbors_directed(idx, Direction::Incoming).next().is_none() {
            roots.push(node.id.clone());
        }
    }

    GraphStats {
        nodes: view.nodes.len(),
        edges: view.edges.len(),
        missing_targets: placeholders + dangling.len(),
        dead_ends,
        roots,
        has_cycles: is_cyclic_directed(&index.graph),
    }
}
