//! Lenient accessors over `serde_json` values.

use serde_json::{Map, Value};

use crate::error::ShapeMismatch;

pub(crate) type Object = Map<String, Value>;

pub(crate) fn as_object(doc: &Value) -> Result<&Object, ShapeMismatch> {
    doc.as_object().ok_or(ShapeMismatch::NotAnObject)
}

pub(crate) fn require_array<'a>(
    obj: &'a Object,
    field: &'static str,
) -> Result<&'a Vec<Value>, ShapeMismatch> {
    obj.get(field)
        .ok_or(ShapeMismatch::MissingField(field))?
        .as_array()
        .ok_or(ShapeMismatch::WrongType {
            field,
            expected: "an array",
        })
}

pub(crate) fn str_field<'a>(obj: &'a Object, field: &str) -> Option<&'a str> {
    obj.get(field).and_then(Value::as_str)
}

/// Ids are usually strings, but numeric ids show up in hand-written graphs.
pub(crate) fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn id_field(obj: &Object, field: &str) -> Option<String> {
    obj.get(field).and_then(id_value)
}

/// First present string among `fields`.
pub(crate) fn first_str(obj: &Object, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|f| str_field(obj, f))
        .map(str::to_string)
}

/// `(next_situation_id, text)` for every choice that points somewhere.
pub(crate) fn choice_transitions(situation: &Object) -> Vec<(String, Option<String>)> {
    let Some(choices) = situation.get("choices").and_then(Value::as_array) else {
        return Vec::new();
    };

    choices
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|choice| {
            let target = id_field(choice, "next_situation_id")?;
            Some((target, first_str(choice, &["text"])))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_choice_transitions_skip_open_choices() {
        let situation = json!({
            "choices": [
                {"id": "c1", "text": "Run", "next_situation_id": "s2"},
                {"id": "c2", "text": "Wait", "next_situation_id": null},
                "garbage",
                {"id": "c3", "next_situation_id": "s3"}
            ]
        });
        let transitions = choice_transitions(situation.as_object().unwrap());
        assert_eq!(
            transitions,
            vec![
                ("s2".to_string(), Some("Run".to_string())),
                ("s3".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_id_value_accepts_numbers() {
        assert_eq!(id_value(&json!(7)), Some("7".to_string()));
        assert_eq!(id_value(&json!("")), None);
        assert_eq!(id_value(&json!(null)), None);
    }
}
