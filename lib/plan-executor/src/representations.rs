use serde_json::{Map, Value};

use crate::{
    plan::{FieldSelection, Selection},
    schema_metadata::SchemaMetadata,
    TYPENAME_FIELD,
};

/// Builds the representation of one entity for an entity fetch.
///
/// Returns `None` when the entity can't take part in the batch: it is not an
/// object, has no `__typename`, does not satisfy `type_condition`, or lacks a
/// field `requires` asks for.
pub fn project_requires(
    entity: &Value,
    requires: &[Selection],
    type_condition: Option<&str>,
    schema_metadata: &SchemaMetadata,
) -> Option<Value> {
    let entity_obj = entity.as_object()?;
    let type_name = entity_obj.get(TYPENAME_FIELD)?.as_str()?;
    if let Some(type_condition) = type_condition {
        if !schema_metadata.entity_satisfies_type_condition(type_name, type_condition) {
            return None;
        }
    }

    let mut representation = Map::with_capacity(requires.len() + 1);
    representation.insert(
        TYPENAME_FIELD.to_string(),
        Value::String(type_name.to_string()),
    );
    project_selections_into(entity_obj, requires, schema_metadata, &mut representation)?;
    Some(Value::Object(representation))
}

fn project_selections_into(
    entity_obj: &Map<String, Value>,
    selections: &[Selection],
    schema_metadata: &SchemaMetadata,
    output: &mut Map<String, Value>,
) -> Option<()> {
    let type_name = entity_obj.get(TYPENAME_FIELD).and_then(Value::as_str);
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                let projected = project_field(entity_obj, field, schema_metadata)?;
                match output.get_mut(field.response_key()) {
                    Some(existing) => crate::response::merge::deep_merge(existing, projected),
                    None => {
                        output.insert(field.response_key().to_string(), projected);
                    }
                }
            }
            Selection::InlineFragment(fragment) => {
                let applies = match (&fragment.type_condition, type_name) {
                    (None, _) => true,
                    (Some(type_condition), Some(type_name)) => {
                        schema_metadata.entity_satisfies_type_condition(type_name, type_condition)
                    }
                    (Some(_), None) => false,
                };
                if applies {
                    project_selections_into(
                        entity_obj,
                        &fragment.selections,
                        schema_metadata,
                        output,
                    )?;
                }
            }
        }
    }
    Some(())
}

fn project_field(
    entity_obj: &Map<String, Value>,
    field: &FieldSelection,
    schema_metadata: &SchemaMetadata,
) -> Option<Value> {
    let value = entity_obj.get(field.response_key())?;
    match &field.selections {
        Some(selections) => project_nested(value, selections, schema_metadata),
        None => Some(value.clone()),
    }
}

fn project_nested(
    value: &Value,
    selections: &[Selection],
    schema_metadata: &SchemaMetadata,
) -> Option<Value> {
    match value {
        Value::Null => Some(Value::Null),
        Value::Array(items) => items
            .iter()
            .map(|item| project_nested(item, selections, schema_metadata))
            .collect::<Option<Vec<Value>>>()
            .map(Value::Array),
        Value::Object(obj) => {
            let mut nested = Map::with_capacity(selections.len());
            project_selections_into(obj, selections, schema_metadata, &mut nested)?;
            Some(Value::Object(nested))
        }
        scalar => Some(scalar.clone()),
    }
}
