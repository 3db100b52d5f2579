use serde_json::{Map, Value};

/// Finds the first usable answer text in an agent response.
///
/// The search is depth-first and the first match wins. Within an object a
/// `content` array of text parts beats a plain `text` field, which beats
/// the nested `response` and `data` envelopes. A blank string or `text`
/// field never counts as an answer.
pub fn extract_answer(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => non_blank(text),
        Value::Array(items) => items.iter().find_map(extract_answer),
        Value::Object(object) => extract_from_object(object),
        Value::Null | Value::Bool(_) | Value::Number(_) => None,
    }
}

fn extract_from_object(object: &Map<String, Value>) -> Option<String> {
    if let Some(Value::Array(parts)) = object.get("content") {
        let texts: Vec<&str> = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();
        if !texts.is_empty() {
            return Some(texts.join("\n"));
        }
    }

    if let Some(text) = object.get("text").and_then(Value::as_str).and_then(non_blank) {
        return Some(text);
    }

    ["response", "data"]
        .iter()
        .filter_map(|key| object.get(*key))
        .find_map(extract_answer)
}

fn non_blank(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
