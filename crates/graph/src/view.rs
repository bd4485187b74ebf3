use serde::{Deserialize, Serialize};

/// Row placeholder nodes are laid out on.
pub const MISSING_ROW_Y: f32 = 400.0;
/// Horizontal gap between placeholder nodes.
pub const MISSING_SPACING: f32 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Situation,
    /// Synthesized for a referenced id that has no record.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    /// Only set for placeholders; situation nodes are left to the layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl GraphNode {
    pub fn situation(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: NodeKind::Situation,
            position: None,
        }
    }

    /// Placeholder for the `slot`-th missing target, in first-reference order.
    pub fn missing(id: impl Into<String>, slot: usize) -> Self {
        let id = id.into();
        Self {
            label: format!("MISSING: {}", id),
            id,
            kind: NodeKind::Missing,
            position: Some(Position {
                x: MISSING_SPACING * slot as f32,
                y: MISSING_ROW_Y,
            }),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.kind == NodeKind::Missing
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Renderable projection of a save: node ids are unique, edge ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphView {
    /// True when there is nothing to draw; callers show their "no data" state.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }
}
