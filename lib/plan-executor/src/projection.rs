use std::collections::HashMap;

use graphql_parser::query::{
    Definition, Directive, Document, FragmentDefinition, OperationDefinition, Selection,
    SelectionSet, TypeCondition, Value as AstValue,
};
use serde_json::{Map, Value};
use tracing::{instrument, warn};

use crate::{response::merge::deep_merge, schema_metadata::SchemaMetadata, TYPENAME_FIELD};

struct ProjectionContext<'b, 'a> {
    fragments: HashMap<&'b str, &'b FragmentDefinition<'a, String>>,
    schema_metadata: &'b SchemaMetadata,
    variables: Option<&'b Map<String, Value>>,
}

/// Shapes the merged response tree after the client's operation.
///
/// Fields the operation didn't select are dropped, selected fields missing
/// from the tree become `null`. When the operation can't be found the tree is
/// returned untouched.
#[instrument(level = "debug", skip_all, name = "project_by_operation", fields(operation_name = ?operation_name))]
pub fn project_by_operation<'a>(
    data: Value,
    document: &Document<'a, String>,
    operation_name: Option<&str>,
    schema_metadata: &SchemaMetadata,
    variables: Option<&Map<String, Value>>,
) -> Value {
    let Some((root_type, selection_set)) = find_operation(document, operation_name, schema_metadata)
    else {
        warn!(
            "Operation {:?} not found in the document, response left unprojected",
            operation_name
        );
        return data;
    };

    let ctx = ProjectionContext {
        fragments: document
            .definitions
            .iter()
            .filter_map(|definition| match definition {
                Definition::Fragment(fragment) => Some((fragment.name.as_str(), fragment)),
                Definition::Operation(_) => None,
            })
            .collect(),
        schema_metadata,
        variables,
    };

    match data {
        Value::Object(root) => {
            let mut projected = Map::with_capacity(selection_set.items.len());
            project_selection_set(&root, None, &selection_set.items, root_type, &mut projected, &ctx);
            Value::Object(projected)
        }
        other => other,
    }
}

fn find_operation<'b, 'a>(
    document: &'b Document<'a, String>,
    operation_name: Option<&str>,
    schema_metadata: &'b SchemaMetadata,
) -> Option<(&'b str, &'b SelectionSet<'a, String>)> {
    let root_types = &schema_metadata.root_types;
    let mut operations = document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            Definition::Operation(operation) => Some(match operation {
                OperationDefinition::SelectionSet(selection_set) => {
                    (None, root_types.query.as_str(), selection_set)
                }
                OperationDefinition::Query(query) => (
                    query.name.as_deref(),
                    root_types.query.as_str(),
                    &query.selection_set,
                ),
                OperationDefinition::Mutation(mutation) => (
                    mutation.name.as_deref(),
                    root_types.mutation.as_str(),
                    &mutation.selection_set,
                ),
                OperationDefinition::Subscription(subscription) => (
                    subscription.name.as_deref(),
                    root_types.subscription.as_str(),
                    &subscription.selection_set,
                ),
            }),
            Definition::Fragment(_) => None,
        });

    match operation_name {
        Some(operation_name) => operations
            .find(|(name, _, _)| *name == Some(operation_name))
            .map(|(_, root_type, selection_set)| (root_type, selection_set)),
        None => {
            let (_, root_type, selection_set) = operations.next()?;
            // Without a name the document must hold exactly one operation.
            match operations.next() {
                Some(_) => None,
                None => Some((root_type, selection_set)),
            }
        }
    }
}

fn project_selection_set<'a>(
    source: &Map<String, Value>,
    object_type: Option<&str>,
    items: &[Selection<'a, String>],
    parent_type: &str,
    projected: &mut Map<String, Value>,
    ctx: &ProjectionContext<'_, 'a>,
) {
    for item in items {
        match item {
            Selection::Field(field) => {
                if !should_include(&field.directives, ctx.variables) {
                    continue;
                }
                let response_key = field.alias.as_deref().unwrap_or(&field.name);

                let value = if field.name == TYPENAME_FIELD {
                    match source.get(TYPENAME_FIELD) {
                        Some(Value::String(type_name)) => Value::String(type_name.clone()),
                        _ => Value::String(object_type.unwrap_or(parent_type).to_string()),
                    }
                } else if field.selection_set.items.is_empty() {
                    source.get(response_key).cloned().unwrap_or(Value::Null)
                } else {
                    let field_type = ctx
                        .schema_metadata
                        .field_type(object_type.unwrap_or(parent_type), &field.name)
                        .unwrap_or_default();
                    project_value(
                        source.get(response_key),
                        &field.selection_set.items,
                        field_type,
                        ctx,
                    )
                };

                match projected.get_mut(response_key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        projected.insert(response_key.to_string(), value);
                    }
                }
            }
            Selection::InlineFragment(inline_fragment) => {
                if !should_include(&inline_fragment.directives, ctx.variables) {
                    continue;
                }
                let applies = match &inline_fragment.type_condition {
                    Some(TypeCondition::On(type_condition)) => {
                        type_condition_applies(object_type, type_condition, ctx.schema_metadata)
                    }
                    None => true,
                };
                if applies {
                    project_selection_set(
                        source,
                        object_type,
                        &inline_fragment.selection_set.items,
                        parent_type,
                        projected,
                        ctx,
                    );
                }
            }
            Selection::FragmentSpread(fragment_spread) => {
                if !should_include(&fragment_spread.directives, ctx.variables) {
                    continue;
                }
                let Some(fragment) = ctx.fragments.get(fragment_spread.fragment_name.as_str()) else {
                    warn!("Fragment {} not found", fragment_spread.fragment_name);
                    continue;
                };
                let TypeCondition::On(type_condition) = &fragment.type_condition;
                if type_condition_applies(object_type, type_condition, ctx.schema_metadata) {
                    project_selection_set(
                        source,
                        object_type,
                        &fragment.selection_set.items,
                        parent_type,
                        projected,
                        ctx,
                    );
                }
            }
        }
    }
}

fn project_value<'a>(
    value: Option<&Value>,
    items: &[Selection<'a, String>],
    field_type: &str,
    ctx: &ProjectionContext<'_, 'a>,
) -> Value {
    match value {
        None | Some(Value::Null) => Value::Null,
        Some(Value::Array(list)) => Value::Array(
            list.iter()
                .map(|item| project_value(Some(item), items, field_type, ctx))
                .collect(),
        ),
        Some(Value::Object(source)) => {
            let object_type = source.get(TYPENAME_FIELD).and_then(Value::as_str);
            let mut projected = Map::with_capacity(items.len());
            project_selection_set(source, object_type, items, field_type, &mut projected, ctx);
            Value::Object(projected)
        }
        Some(scalar) => scalar.clone(),
    }
}

/// An object whose type isn't known matches every condition.
fn type_condition_applies(
    object_type: Option<&str>,
    type_condition: &str,
    schema_metadata: &SchemaMetadata,
) -> bool {
    match object_type {
        None => true,
        Some(object_type) => {
            schema_metadata.entity_satisfies_type_condition(object_type, type_condition)
        }
    }
}

fn should_include(directives: &[Directive<'_, String>], variables: Option<&Map<String, Value>>) -> bool {
    for directive in directives {
        let skip = match directive.name.as_str() {
            "skip" => true,
            "include" => false,
            _ => continue,
        };
        let condition = directive
            .arguments
            .iter()
            .find(|(name, _)| name == "if")
            .map(|(_, value)| match value {
                AstValue::Boolean(b) => *b,
                AstValue::Variable(variable_name) => variables
                    .and_then(|v| v.get(variable_name))
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                _ => false,
            })
            .unwrap_or(false);
        if condition == skip {
            return false;
        }
    }
    true
}
