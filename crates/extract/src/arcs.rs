use serde_json::Value;
use std::collections::HashSet;

use crate::error::ShapeMismatch;
use crate::schema::SituationRecord;
use crate::value::{Object, as_object, choice_transitions, first_str, id_field, require_array};

/// Flatten every arc's situations into one list.
///
/// Situation ids are unique in the result: the first arc to define an id wins
/// and later definitions are dropped.
pub fn decode(doc: &Value) -> Result<Vec<SituationRecord>, ShapeMismatch> {
    let obj = as_object(doc)?;
    let arcs = require_array(obj, "arcs")?;

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for arc in arcs.iter().filter_map(Value::as_object) {
        for (id, situation) in arc_situations(arc) {
            if !seen.insert(id.clone()) {
                tracing::trace!(situation = %id, "Dropping duplicate situation");
                continue;
            }
            records.push(to_record(id, situation));
        }
    }

    Ok(records)
}

/// Situations of one arc; normally a map keyed by id, but arrays are accepted too.
fn arc_situations(arc: &Object) -> Vec<(String, &Object)> {
    match arc.get("situations") {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(id, s)| Some((id.clone(), s.as_object()?)))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|s| Some((id_field(s, "id")?, s)))
            .collect(),
        _ => Vec::new(),
    }
}

fn to_record(id: String, situation: &Object) -> SituationRecord {
    let name = first_str(situation, &["title", "description"]).unwrap_or_else(|| id.clone());
    let mut record = SituationRecord::new(id, name);
    for (target, label) in choice_transitions(situation) {
        record.push_transition(target, label);
    }
    record
}
