use serde_json::Value;
use std::collections::BTreeMap;

/// Summarizes the shape of a set of schema-less save blobs: each
/// top-level field maps to its JSON type name, or `mixed` when saves
/// disagree.
///
/// Save payloads are intentionally unconstrained; this is a read-only
/// dashboard aid, never validation.
pub fn infer_fields(payloads: &[Value]) -> BTreeMap<String, String> {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();

    for payload in payloads {
        let Some(object) = payload.as_object() else {
            continue;
        };
        for (key, value) in object {
            let ty = json_type_name(value);
            fields
                .entry(key.clone())
                .and_modify(|existing| {
                    if existing != ty {
                        *existing = "mixed".to_string();
                    }
                })
                .or_insert_with(|| ty.to_string());
        }
    }

    fields
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
