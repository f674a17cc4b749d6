use serde_json::{Map, Value};
use tracing::instrument;

/// Merges `source` into `target` without ever replacing a value that is
/// already there.
///
/// - objects are unioned key by key, recursing into keys present on both sides
/// - arrays are merged position by position up to the shorter length
/// - everything else (scalars, `null`, mismatched kinds) keeps the target
///
/// Merging the same `source` twice leaves the tree as a single merge did.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (_, Value::Null) => {}
        (Value::Object(target_map), Value::Object(source_map)) => {
            deep_merge_objects(target_map, source_map);
        }
        (Value::Array(target_arr), Value::Array(source_arr)) => {
            for (target_val, source_val) in target_arr.iter_mut().zip(source_arr) {
                deep_merge(target_val, source_val);
            }
        }
        _ => {}
    }
}

#[instrument(
    level = "trace",
    skip_all,
    fields(
        target_type = %target_map.get("__typename").and_then(|v| v.as_str()).unwrap_or("unknown"),
        keys = source_map.len()
    )
)]
pub fn deep_merge_objects(target_map: &mut Map<String, Value>, source_map: Map<String, Value>) {
    if source_map.is_empty() {
        return;
    }
    if target_map.is_empty() {
        *target_map = source_map;
        return;
    }
    for (key, source_val) in source_map {
        match target_map.get_mut(&key) {
            Some(target_val) => deep_merge(target_val, source_val),
            None => {
                target_map.insert(key, source_val);
            }
        }
    }
}
