use serde_json::{Map, Value};

/// A JSON object as carried through routing and normalization.
pub type Fields = Map<String, Value>;

/// Returns `value` unless it is missing, `null`, `false`, `0` or `""`.
pub fn truthy(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Takes the first truthy field among `keys`, cloned.
pub fn first_truthy(fields: &Fields, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .find_map(|key| truthy(fields.get(*key)))
        .cloned()
}

/// Shallow-merges `entries` into the object under `key`; incoming keys win.
///
/// A missing or non-object value under `key` is replaced.
pub fn merge_object(fields: &mut Fields, key: &str, entries: Fields) {
    let mut merged = match fields.remove(key) {
        Some(Value::Object(existing)) => existing,
        _ => Map::new(),
    };
    merged.extend(entries);
    fields.insert(key.to_string(), Value::Object(merged));
}
