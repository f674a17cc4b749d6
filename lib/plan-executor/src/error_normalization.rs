use crate::{
    plan::FlattenNodePathSegment,
    response::graphql_error::{GraphQLError, GraphQLErrorPathSegment},
    traverse_path::ResponsePath,
};

const ENTITIES_FIELD: &str = "_entities";

/// The part of a flatten path that is the same for every location it
/// resolves to: its field segments up to the first list wildcard.
pub fn static_prefix(path: &[FlattenNodePathSegment]) -> ResponsePath {
    path.iter()
        .map_while(|segment| match segment {
            FlattenNodePathSegment::Field(field_name) => {
                Some(GraphQLErrorPathSegment::Field(field_name.clone()))
            }
            FlattenNodePathSegment::List => None,
        })
        .collect()
}

/// Rewrites the paths of errors a root fetch reported relative to its own
/// response so they point into the merged response.
pub fn normalize_errors_for_root(prefix: &[GraphQLErrorPathSegment], errors: Vec<GraphQLError>) -> Vec<GraphQLError> {
    errors
        .into_iter()
        .map(|mut error| {
            let mut real_path = prefix.to_vec();
            if let Some(path_in_error) = error.path.take() {
                real_path.extend(path_in_error);
            }
            error.path = (!real_path.is_empty()).then_some(real_path);
            error
        })
        .collect()
}

/// Map `["_entities", i, ...rest]` to the location representation `i` came
/// from, followed by `rest`.
///
/// For example if the error path is `["_entities", 1, "name"]` and the second
/// representation was built at `["topReviews", 1, "author"]`, it becomes
/// `["topReviews", 1, "author", "name"]`. Errors that don't point at an entity
/// fall back to `unlocated_path`.
pub fn normalize_errors_for_representations(
    locations: &[ResponsePath],
    unlocated_path: &[GraphQLErrorPathSegment],
    errors: Vec<GraphQLError>,
) -> Vec<GraphQLError> {
    errors
        .into_iter()
        .map(|mut error| {
            let located = error.path.as_deref().and_then(|path_in_error| {
                let (entities, rest) = path_in_error.split_first()?;
                if !matches!(entities, GraphQLErrorPathSegment::Field(field) if field == ENTITIES_FIELD) {
                    return None;
                }
                let (entity_index, rest) = rest.split_first()?;
                let GraphQLErrorPathSegment::Index(entity_index) = entity_index else {
                    return None;
                };
                let location = locations.get(*entity_index)?;
                let mut real_path = Vec::with_capacity(location.len() + rest.len());
                real_path.extend_from_slice(location);
                real_path.extend_from_slice(rest);
                Some(real_path)
            });

            let real_path = located.unwrap_or_else(|| unlocated_path.to_vec());
            error.path = (!real_path.is_empty()).then_some(real_path);
            error
        })
        .collect()
}
