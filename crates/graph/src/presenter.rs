use extract::{DocumentShape, Extraction};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use unicode_segmentation::UnicodeSegmentation;

use crate::view::{GraphEdge, GraphNode, GraphView};

/// How a situation name becomes a node label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    Full,
    FirstSentence,
    /// Truncate to this many characters, ending in `...` when there is room for it.
    MaxChars(usize),
}

impl LabelPolicy {
    pub fn apply(&self, name: &str) -> String {
        match self {
            LabelPolicy::Full => name.to_string(),
            LabelPolicy::FirstSentence => first_sentence(name).to_string(),
            LabelPolicy::MaxChars(max) => truncate(name, *max),
        }
    }
}

impl FromStr for LabelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(LabelPolicy::Full),
            "first_sentence" => Ok(LabelPolicy::FirstSentence),
            other => other
                .strip_prefix("max_chars:")
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .map(LabelPolicy::MaxChars)
                .ok_or_else(|| format!("unknown label policy: {}", other)),
        }
    }
}

impl fmt::Display for LabelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelPolicy::Full => f.write_str("full"),
            LabelPolicy::FirstSentence => f.write_str("first_sentence"),
            LabelPolicy::MaxChars(n) => write!(f, "max_chars:{}", n),
        }
    }
}

/// What to do with edges whose target has no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTargets {
    /// Synthesize for arc exports, leave dangling otherwise.
    Auto,
    /// Add a `MISSING: <id>` placeholder node so the edge is visible.
    Synthesize,
    /// Emit the edge and let the renderer cope.
    Dangling,
}

impl MissingTargets {
    fn synthesize_for(&self, shape: Option<DocumentShape>) -> bool {
        match self {
            MissingTargets::Auto => shape == Some(DocumentShape::ArcExport),
            MissingTargets::Synthesize => true,
            MissingTargets::Dangling => false,
        }
    }
}

impl FromStr for MissingTargets {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(MissingTargets::Auto),
            "synthesize" => Ok(MissingTargets::Synthesize),
            "dangling" => Ok(MissingTargets::Dangling),
            other => Err(format!("unknown missing-target policy: {}", other)),
        }
    }
}

impl fmt::Display for MissingTargets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MissingTargets::Auto => "auto",
            MissingTargets::Synthesize => "synthesize",
            MissingTargets::Dangling => "dangling",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenterOptions {
    pub labels: LabelPolicy,
    pub missing_targets: MissingTargets,
}

impl Default for PresenterOptions {
    fn default() -> Self {
        Self {
            labels: LabelPolicy::FirstSentence,
            missing_targets: MissingTargets::Auto,
        }
    }
}

/// Projects extracted situation records onto a [`GraphView`].
#[derive(Debug, Clone, Default)]
pub struct GraphPresenter {
    options: PresenterOptions,
}

impl GraphPresenter {
    pub fn new(options: PresenterOptions) -> Self {
        Self { options }
    }

    pub fn present(&self, extraction: &Extraction) -> GraphView {
        let synthesize = self.options.missing_targets.synthesize_for(extraction.shape);
        let mut view = GraphView::default();

        // Step 1: one node per record, first occurrence of an id wins
        let mut known: HashSet<&str> = HashSet::new();
        let mut sources = Vec::new();
        for record in &extraction.records {
            if known.insert(record.id.as_str()) {
                view.nodes
                    .push(GraphNode::situation(record.id.clone(), self.options.labels.apply(&record.name)));
                sources.push(record);
            }
        }

        // Step 2: one edge per forward reference
        let mut edge_ids = EdgeIds::default();
        let mut missing: Vec<&str> = Vec::new();
        let mut missing_seen: HashSet<&str> = HashSet::new();

        for record in sources {
            for (target, label) in record.transitions() {
                if synthesize && !known.contains(target) && missing_seen.insert(target) {
                    missing.push(target);
                }
                view.edges.push(GraphEdge {
                    id: edge_ids.next(&record.id, target),
                    source: record.id.clone(),
                    target: target.to_string(),
                    label: label.map(str::to_string),
                });
            }
        }

        // Step 3: placeholders for dangling targets
        for (slot, id) in missing.into_iter().enumerate() {
            view.nodes.push(GraphNode::missing(id, slot));
        }

        tracing::debug!(
            nodes = view.nodes.len(),
            edges = view.edges.len(),
            shape = ?extraction.shape,
            "Built graph view"
        );
        view
    }
}

/// Hands out `source-target` edge ids, suffixing `-N` on collisions.
#[derive(Default)]
struct EdgeIds {
    used: HashSet<String>,
    counters: HashMap<String, usize>,
}

impl EdgeIds {
    fn next(&mut self, source: &str, target: &str) -> String {
        let base = format!("{}-{}", source, target);
        let mut candidate = base.clone();
        while self.used.contains(&candidate) {
            let counter = self.counters.entry(base.clone()).or_insert(0);
            *counter += 1;
            candidate = format!("{}-{}", base, counter);
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

fn first_sentence(name: &str) -> &str {
    let first = name.split_sentence_bounds().next().unwrap_or(name);
    let trimmed = first.trim_end().trim_end_matches(['.', '!', '?']).trim_end();
    if trimmed.is_empty() { name } else { trimmed }
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    if max <= 3 {
        return name.chars().take(max).collect();
    }
    let kept: String = name.chars().take(max - 3).collect();
    format!("{}...", kept)
}
