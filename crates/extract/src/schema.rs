use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One situation, normalized out of whatever shape the save used.
///
/// `next_situation_ids` are forward references and may name situations that are
/// not part of the same document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SituationRecord {
    pub id: String,
    pub name: String,
    pub next_situation_ids: Vec<String>,
    /// Display text per transition, parallel to `next_situation_ids`.
    /// Empty when the shape carries no transition text.
    #[serde(default, skip_serializing_if = "no_labels")]
    pub choice_labels: Vec<Option<String>>,
}

fn no_labels(labels: &[Option<String>]) -> bool {
    labels.iter().all(Option::is_none)
}

impl SituationRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            next_situation_ids: Vec::new(),
            choice_labels: Vec::new(),
        }
    }

    pub fn with_next(mut self, targets: impl IntoIterator<Item = String>) -> Self {
        for target in targets {
            self.push_transition(target, None);
        }
        self
    }

    pub fn push_transition(&mut self, target: String, label: Option<String>) {
        // Keep labels aligned even if the record was built without them.
        self.choice_labels.resize(self.next_situation_ids.len(), None);
        self.next_situation_ids.push(target);
        self.choice_labels.push(label);
    }

    /// `(target, label)` pairs in declaration order.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.next_situation_ids.iter().enumerate().map(|(i, target)| {
            let label = self.choice_labels.get(i).and_then(|l| l.as_deref());
            (target.as_str(), label)
        })
    }
}

/// The save layouts the extractor understands, in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentShape {
    SituationMap,
    ValidatedGraph,
    NodeGraph,
    WorldContext,
    ArcExport,
}

impl DocumentShape {
    pub const PRIORITY: [DocumentShape; 5] = [
        DocumentShape::SituationMap,
        DocumentShape::ValidatedGraph,
        DocumentShape::NodeGraph,
        DocumentShape::WorldContext,
        DocumentShape::ArcExport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentShape::SituationMap => "situation_map",
            DocumentShape::ValidatedGraph => "validated_graph",
            DocumentShape::NodeGraph => "node_graph",
            DocumentShape::WorldContext => "world_context",
            DocumentShape::ArcExport => "arc_export",
        }
    }
}

impl fmt::Display for DocumentShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentShape::PRIORITY
            .into_iter()
            .find(|shape| shape.as_str() == s)
            .ok_or_else(|| format!("unknown document shape: {}", s))
    }
}

/// Result of running the extractor over one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// `None` when no shape matched.
    pub shape: Option<DocumentShape>,
    pub records: Vec<SituationRecord>,
}

impl Extraction {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_pad_missing_labels() {
        let mut record = SituationRecord::new("a", "A").with_next(vec!["b".to_string()]);
        record.push_transition("c".to_string(), Some("Go to C".to_string()));

        let transitions: Vec<_> = record.transitions().collect();
        assert_eq!(transitions, vec![("b", None), ("c", Some("Go to C"))]);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = SituationRecord::new("a", "A").with_next(vec!["b".to_string()]);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["nextSituationIds"][0], "b");
        assert!(json.get("choiceLabels").is_none());
    }

    #[test]
    fn test_shape_names_round_trip() {
        for shape in DocumentShape::PRIORITY {
            assert_eq!(shape.as_str().parse::<DocumentShape>().unwrap(), shape);
        }
        assert!("graph".parse::<DocumentShape>().is_err());
    }
}
