use serde_json::Value;

use crate::error::ShapeMismatch;
use crate::schema::SituationRecord;
use crate::value::{Object, as_object, choice_transitions, first_str, id_field, str_field};

/// Decode a flat situation map.
///
/// Two layouts are accepted: a `situations` field holding either an array of
/// situation objects or an object keyed by situation id, and a document that is
/// itself keyed by situation id. The second is only trusted for entries that
/// carry a string `title` and a `choices` array, since any object has keys.
pub fn decode(doc: &Value) -> Result<Vec<SituationRecord>, ShapeMismatch> {
    let obj = as_object(doc)?;

    if let Some(situations) = obj.get("situations") {
        return decode_field(situations);
    }

    let records: Vec<SituationRecord> = obj
        .iter()
        .filter_map(|(id, entry)| {
            let situation = entry.as_object()?;
            let titled = str_field(situation, "title").is_some();
            let has_choices = situation.get("choices").is_some_and(Value::is_array);
            (titled && has_choices).then(|| to_record(id.clone(), situation))
        })
        .collect();

    if records.is_empty() {
        return Err(ShapeMismatch::MissingField("situations"));
    }
    Ok(records)
}

fn decode_field(situations: &Value) -> Result<Vec<SituationRecord>, ShapeMismatch> {
    let records: Vec<SituationRecord> = match situations {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let situation = item.as_object()?;
                let id = id_field(situation, "id")?;
                is_situation(situation).then(|| to_record(id, situation))
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(id, item)| {
                let situation = item.as_object()?;
                is_situation(situation).then(|| to_record(id.clone(), situation))
            })
            .collect(),
        _ => {
            return Err(ShapeMismatch::WrongType {
                field: "situations",
                expected: "an array or an object",
            });
        }
    };

    if records.is_empty() {
        return Err(ShapeMismatch::NoQualifyingEntries("situations"));
    }
    Ok(records)
}

fn is_situation(situation: &Object) -> bool {
    str_field(situation, "title").is_some() || str_field(situation, "name").is_some()
}

fn to_record(id: String, situation: &Object) -> SituationRecord {
    let name = first_str(situation, &["title", "name"]).unwrap_or_else(|| id.clone());
    let mut record = SituationRecord::new(id, name);
    for (target, label) in choice_transitions(situation) {
        record.push_transition(target, label);
    }
    record
}
