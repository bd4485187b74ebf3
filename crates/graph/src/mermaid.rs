use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::view::GraphView;

static NON_ID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Words Mermaid's flowchart parser treats as syntax when used as a node id.
const RESERVED_IDS: [&str; 1] = ["end"];

const EMPTY_FLOWCHART: &str = "flowchart TD\n    A[No situations found]";

/// Render a view as a Mermaid flowchart.
///
/// Edges whose target has no node are left out, so call this on a view built
/// with placeholder synthesis if dangling references should show up.
pub fn to_mermaid(view: &GraphView) -> String {
    if view.is_empty() {
        return EMPTY_FLOWCHART.to_string();
    }

    let mut ids: HashMap<&str, String> = HashMap::new();
    let mut taken: HashSet<String> = RESERVED_IDS.iter().map(|id| id.to_string()).collect();
    let mut lines = vec!["flowchart TD".to_string()];

    for node in &view.nodes {
        if ids.contains_key(node.id.as_str()) {
            continue;
        }
        let base = sanitize_node_id(&node.id);
        let mut mermaid_id = base.clone();
        let mut counter = 1;
        while taken.contains(&mermaid_id) {
            mermaid_id = format!("{}_{}", base, counter);
            counter += 1;
        }
        taken.insert(mermaid_id.clone());

        let class = if node.is_missing() { ":::missing" } else { "" };
        lines.push(format!(
            "    {}[\"{}\"]{}",
            mermaid_id,
            sanitize_text(&node.label),
            class
        ));
        ids.insert(&node.id, mermaid_id);
    }

    for edge in &view.edges {
        let (Some(source), Some(target)) = (ids.get(edge.source.as_str()), ids.get(edge.target.as_str()))
        else {
            continue;
        };
        match edge.label.as_deref() {
            Some(label) => lines.push(format!(
                "    {} -->|{}| {}",
                source,
                sanitize_text(label).replace('|', "/"),
                target
            )),
            None => lines.push(format!("    {} --> {}", source, target)),
        }
    }

    if view.nodes.iter().any(|n| n.is_missing()) {
        lines.push("    classDef missing stroke-dasharray: 5 5".to_string());
    }

    lines.join("\n")
}

/// Mermaid node ids must start with a letter and hold no punctuation.
pub fn sanitize_node_id(text: &str) -> String {
    let stripped = NON_ID_CHARS.replace_all(text, "");
    let mut sanitized = WHITESPACE.replace_all(stripped.trim(), "_").to_string();
    if sanitized.is_empty() {
        return "node".to_string();
    }
    if !sanitized.starts_with(|c: char| c.is_ascii_alphabetic()) {
        sanitized = format!("node_{}", sanitized);
    }
    sanitized.to_lowercase()
}

fn sanitize_text(text: &str) -> String {
    text.replace('"', "'").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{GraphEdge, GraphNode};

    #[test]
    fn test_sanitize_node_id() {
        assert_eq!(sanitize_node_id("Checkpoint at Dawn!"), "checkpoint_at_dawn");
        assert_eq!(sanitize_node_id("42 steps"), "node_42_steps");
        assert_eq!(sanitize_node_id("?!"), "node");
    }

    #[test]
    fn test_end_id_is_suffixed() {
        let view = GraphView {
            nodes: vec![
                GraphNode::situation("start", "Start"),
                GraphNode::situation("End", "The end"),
            ],
            edges: vec![GraphEdge {
                id: "start-End".to_string(),
                source: "start".to_string(),
                target: "End".to_string(),
                label: None,
            }],
        };

        let chart = to_mermaid(&view);
        assert!(chart.contains("    end_1[\"The end\"]"));
        assert!(chart.contains("    start --> end_1"));
        assert!(!chart.lines().any(|l| l.trim_start().starts_with("end[")));
    }

    #[test]
    fn test_empty_view() {
        assert_eq!(to_mermaid(&GraphView::default()), EMPTY_FLOWCHART);
    }

    #[test]
    fn test_flowchart_lines() {
        let view = GraphView {
            nodes: vec![
                GraphNode::situation("s 1", "Say \"hi\""),
                GraphNode::situation("s1", "Other"),
                GraphNode::missing("gone", 0),
            ],
            edges: vec![
                GraphEdge {
                    id: "s 1-s1".to_string(),
                    source: "s 1".to_string(),
                    target: "s1".to_string(),
                    label: Some("Walk | run".to_string()),
                },
                GraphEdge {
                    id: "s1-gone".to_string(),
                    source: "s1".to_string(),
                    target: "gone".to_string(),
                    label: None,
                },
                GraphEdge {
                    id: "s1-nowhere".to_string(),
                    source: "s1".to_string(),
                    target: "nowhere".to_string(),
                    label: None,
                },
            ],
        };

        let chart = to_mermaid(&view);
        let lines: Vec<_> = chart.lines().collect();
        assert_eq!(
            lines,
            vec![
                "flowchart TD",
                "    s_1[\"Say 'hi'\"]",
                "    s1[\"Other\"]",
                "    gone[\"MISSING: gone\"]:::missing",
                "    s_1 -->|Walk / run| s1",
                "    s1 --> gone",
                "    classDef missing stroke-dasharray: 5 5",
            ]
        );
    }
}
