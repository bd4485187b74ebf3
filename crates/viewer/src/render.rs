use graph::{GraphStats, GraphView};
use std::fmt::Write;

use crate::client::GraphPayload;
use crate::session::{GraphStatus, ViewerSession};

pub const SELECT_FILE_MESSAGE: &str = "Select a save file to view the situation graph";
pub const LOADING_MESSAGE: &str = "Loading situation graph...";
pub const NO_DATA_MESSAGE: &str = "No situation data found in this save";

/// What the graph pane shows for the session's current state.
pub fn render_session(session: &ViewerSession) -> String {
    match (session.status(), session.graph()) {
        (GraphStatus::Ready, Some(payload)) => render_payload(payload),
        (GraphStatus::Loading, _) => LOADING_MESSAGE.to_string(),
        (GraphStatus::NoData, _) => match session.last_error() {
            Some(error) => format!("{}\n({})", NO_DATA_MESSAGE, error),
            None => NO_DATA_MESSAGE.to_string(),
        },
        _ => SELECT_FILE_MESSAGE.to_string(),
    }
}

pub fn render_payload(payload: &GraphPayload) -> String {
    let mut out = String::new();
    let shape = payload
        .shape
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unrecognized".to_string());
    let _ = writeln!(out, "{} [{}]", payload.path, shape);
    let _ = writeln!(out, "{}", render_stats(&payload.stats));
    out.push('\n');
    out.push_str(&render_graph(&payload.graph));
    out
}

pub fn render_stats(stats: &GraphStats) -> String {
    format!(
        "{} situations, {} transitions, {} missing, {} dead ends, roots: {}{}",
        stats.nodes,
        stats.edges,
        stats.missing_targets,
        stats.dead_ends,
        if stats.roots.is_empty() {
            "none".to_string()
        } else {
            stats.roots.join(", ")
        },
        if stats.has_cycles { ", has cycles" } else { "" }
    )
}

/// One block per node with its outgoing transitions underneath.
pub fn render_graph(view: &GraphView) -> String {
    if view.is_empty() {
        return NO_DATA_MESSAGE.to_string();
    }

    let mut out = String::new();
    for node in &view.nodes {
        let _ = writeln!(out, "[{}] {}", node.id, node.label);
        for edge in view.outgoing(&node.id) {
            let target = match view.node(&edge.target) {
                Some(t) => format!("[{}] {}", t.id, t.label),
                None => format!("[{}] (dangling)", edge.target),
            };
            match edge.label.as_deref() {
                Some(label) => {
                    let _ = writeln!(out, "    -- {} --> {}", label, target);
                }
                None => {
                    let _ = writeln!(out, "    --> {}", target);
                }
            }
        }
    }
    out
}
