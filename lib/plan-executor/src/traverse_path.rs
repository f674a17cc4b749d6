use serde_json::Value;
use tracing::instrument;

use crate::{plan::FlattenNodePathSegment, response::graphql_error::GraphQLErrorPathSegment};

/// A concrete position in the response tree.
pub type ResponsePath = Vec<GraphQLErrorPathSegment>;

/// Walks `remaining_path` from `current_data` and calls `callback` for every
/// location it reaches, together with the concrete path of that location.
///
/// `null`, missing fields and kind mismatches end the walk for that branch. A
/// list reached at the end of the path is expanded into its elements.
#[instrument(level = "trace", skip_all, fields(
    current_path = ?current_path,
    remaining_path = ?remaining_path
))]
pub fn traverse_path<'a, Callback>(
    current_data: &'a Value,
    current_path: ResponsePath,
    remaining_path: &[FlattenNodePathSegment],
    callback: &mut Callback,
) where
    Callback: FnMut(ResponsePath, &'a Value),
{
    let Some((next_segment, next_remaining_path)) = remaining_path.split_first() else {
        return match current_data {
            Value::Null => {}
            Value::Array(arr) => {
                for (index, item) in arr.iter().enumerate() {
                    let mut path_with_index = current_path.clone();
                    path_with_index.push(GraphQLErrorPathSegment::Index(index));
                    traverse_path(item, path_with_index, &[], callback);
                }
            }
            _ => callback(current_path, current_data),
        };
    };

    match (next_segment, current_data) {
        (_, Value::Null) => {}
        (FlattenNodePathSegment::List, Value::Array(array)) => {
            for (index, item) in array.iter().enumerate() {
                let mut path_with_index = current_path.clone();
                path_with_index.push(GraphQLErrorPathSegment::Index(index));
                traverse_path(item, path_with_index, next_remaining_path, callback);
            }
        }
        (FlattenNodePathSegment::Field(field_name), Value::Object(map)) => {
            if let Some(next_value) = map.get(field_name) {
                let mut path_with_field = current_path;
                path_with_field.push(GraphQLErrorPathSegment::Field(field_name.clone()));
                traverse_path(next_value, path_with_field, next_remaining_path, callback);
            }
        }
        (segment, data) => {
            tracing::warn!(
                "Cannot follow path segment '{}' at {:?}, found: {}",
                segment,
                current_path,
                value_kind(data)
            );
        }
    }
}

/// Every concrete location `path` denotes in `data` right now.
pub fn resolve_locations(data: &Value, path: &[FlattenNodePathSegment]) -> Vec<ResponsePath> {
    let mut locations = vec![];
    traverse_path(data, vec![], path, &mut |location, _| {
        locations.push(location);
    });
    locations
}

/// Follows a concrete path to the value it points at.
pub fn value_at_path_mut<'a>(data: &'a mut Value, path: &[GraphQLErrorPathSegment]) -> Option<&'a mut Value> {
    path.iter().try_fold(data, |current, segment| match segment {
        GraphQLErrorPathSegment::Field(field) => current.as_object_mut()?.get_mut(field),
        GraphQLErrorPathSegment::Index(index) => current.as_array_mut()?.get_mut(*index),
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
