use serde_json::Value;

use crate::error::ShapeMismatch;
use crate::schema::SituationRecord;
use crate::value::{Object, as_object, first_str, id_field, id_value};

const SECTIONS: [&str; 3] = ["districts", "factions", "npcs"];

/// Decode a `world_context` export into district, faction and NPC records.
///
/// Districts point at their factions, factions at the keys of their
/// `relationships` map. NPCs are always leaves.
pub fn decode(doc: &Value) -> Result<Vec<SituationRecord>, ShapeMismatch> {
    let obj = as_object(doc)?;
    let world = obj
        .get("world_context")
        .ok_or(ShapeMismatch::MissingField("world_context"))?
        .as_object()
        .ok_or(ShapeMismatch::WrongType {
            field: "world_context",
            expected: "an object",
        })?;

    if !SECTIONS.iter().any(|s| world.contains_key(*s)) {
        return Err(ShapeMismatch::MissingField("districts"));
    }

    let mut records = Vec::new();

    for district in section(world, "districts") {
        if let Some(mut record) = entity_record(district) {
            let factions = district
                .get("factions")
                .and_then(Value::as_array)
                .map(|f| f.iter().filter_map(id_value).collect::<Vec<_>>())
                .unwrap_or_default();
            record = record.with_next(factions);
            records.push(record);
        }
    }

    for faction in section(world, "factions") {
        if let Some(mut record) = entity_record(faction) {
            let related = faction
                .get("relationships")
                .and_then(Value::as_object)
                .map(|r| r.keys().cloned().collect::<Vec<_>>())
                .unwrap_or_default();
            record = record.with_next(related);
            records.push(record);
        }
    }

    records.extend(section(world, "npcs").filter_map(entity_record));

    if records.is_empty() {
        return Err(ShapeMismatch::NoQualifyingEntries("world_context"));
    }
    Ok(records)
}

fn section<'a>(world: &'a Object, name: &str) -> impl Iterator<Item = &'a Object> + 'a {
    world
        .get(name)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Id is `id`, falling back to `name`; display name the other way round.
fn entity_record(entity: &Object) -> Option<SituationRecord> {
    let id = id_field(entity, "id").or_else(|| id_field(entity, "name"))?;
    let name = first_str(entity, &["name"]).unwrap_or_else(|| id.clone());
    Some(SituationRecord::new(id, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_district() {
        let doc = json!({"world_context": {"districts": [{"id": "D1", "factions": ["F1"]}]}});
        let records = decode(&doc).unwrap();
        assert_eq!(
            records,
            vec![SituationRecord::new("D1", "D1").with_next(vec!["F1".to_string()])]
        );
    }

    #[test]
    fn test_factions_and_npcs() {
        let doc = json!({
            "world_context": {
                "districts": [{"name": "Lower Quarter", "factions": ["Vextros"]}],
                "factions": [
                    {"name": "Vextros", "relationships": {"The Open Blocks": -5}},
                    {"name": "Phobos Consultancy"}
                ],
                "npcs": [{"name": "Alan Carlsile", "faction": "Vextros"}, {"role": "nameless"}]
            }
        });
        let records = decode(&doc).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].id, "Lower Quarter");
        assert_eq!(records[0].next_situation_ids, vec!["Vextros"]);
        assert_eq!(records[1].next_situation_ids, vec!["The Open Blocks"]);
        assert!(records[2].next_situation_ids.is_empty());
        assert_eq!(records[3].id, "Alan Carlsile");
        assert!(records[3].next_situation_ids.is_empty());
    }

    #[test]
    fn test_requires_a_known_section() {
        let doc = json!({"world_context": {"seed": 3}});
        assert_eq!(decode(&doc), Err(ShapeMismatch::MissingField("districts")));
        assert_eq!(
            decode(&json!({"world_context": []})),
            Err(ShapeMismatch::WrongType {
                field: "world_context",
                expected: "an object"
            })
        );
        assert_eq!(
            decode(&json!({"world_context": {"districts": [], "npcs": [{"role": "nameless"}]}})),
            Err(ShapeMismatch::NoQualifyingEntries("world_context"))
        );
    }
}
