//! Decoders for documents that already describe a node/edge graph.

use serde_json::Value;
use std::collections::HashMap;

use crate::error::ShapeMismatch;
use crate::schema::SituationRecord;
use crate::value::{Object, as_object, first_str, id_field, id_value, require_array};

/// `nodes: [{id, label}]` plus a top-level `edges: [{source, target}]` list.
pub fn decode_validated(doc: &Value) -> Result<Vec<SituationRecord>, ShapeMismatch> {
    let obj = as_object(doc)?;
    let nodes = require_array(obj, "nodes")?;
    let edges = require_array(obj, "edges")?;

    // source -> [(target, label)] in edge order
    let mut outgoing: HashMap<String, Vec<(String, Option<String>)>> = HashMap::new();
    for edge in edges.iter().filter_map(Value::as_object) {
        let (Some(source), Some(target)) = (id_field(edge, "source"), id_field(edge, "target"))
        else {
            continue;
        };
        outgoing
            .entry(source)
            .or_default()
            .push((target, first_str(edge, &["label"])));
    }

    let records = node_records(nodes, |id, _| outgoing.get(id).cloned().unwrap_or_default())?;
    Ok(records)
}

/// `nodes: [{id, label?, edges?: [{target}]}]` with no top-level edge list.
pub fn decode_nested(doc: &Value) -> Result<Vec<SituationRecord>, ShapeMismatch> {
    let obj = as_object(doc)?;
    if obj.contains_key("edges") {
        return Err(ShapeMismatch::UnexpectedField("edges"));
    }
    let nodes = require_array(obj, "nodes")?;

    node_records(nodes, |_, node| {
        node.get("edges")
            .and_then(Value::as_array)
            .map(|edges| edges.iter().filter_map(nested_edge).collect())
            .unwrap_or_default()
    })
}

fn nested_edge(edge: &Value) -> Option<(String, Option<String>)> {
    match edge {
        Value::Object(edge) => Some((id_field(edge, "target")?, first_str(edge, &["label"]))),
        other => Some((id_value(other)?, None)),
    }
}

fn node_records<F>(nodes: &[Value], mut transitions: F) -> Result<Vec<SituationRecord>, ShapeMismatch>
where
    F: FnMut(&str, &Object) -> Vec<(String, Option<String>)>,
{
    let records: Vec<SituationRecord> = nodes
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|node| {
            let id = id_field(node, "id")?;
            let name = first_str(node, &["label"]).unwrap_or_else(|| id.clone());
            let mut record = SituationRecord::new(id.clone(), name);
            for (target, label) in transitions(&id, node) {
                record.push_transition(target, label);
            }
            Some(record)
        })
        .collect();

    if records.is_empty() {
        return Err(ShapeMismatch::NoQualifyingEntries("nodes"));
    }
    Ok(records)
}
