pub mod mermaid;
pub mod presenter;
pub mod stats;
pub mod view;

pub use mermaid::to_mermaid;
pub use presenter::{GraphPresenter, LabelPolicy, MissingTargets, PresenterOptions};
pub use stats::{GraphStats, graph_stats};
pub use view::{GraphEdge, GraphNode, GraphView, NodeKind, Position};
