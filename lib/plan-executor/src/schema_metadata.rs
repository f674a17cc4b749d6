use std::collections::{HashMap, HashSet};

use graphql_parser::schema::{Definition, Document, Type, TypeDefinition};

use crate::parsing::{parse_schema, SchemaParseError};

/// Type information the executor needs from the composed schema.
#[derive(Debug, Default, Clone)]
pub struct SchemaMetadata {
    /// Abstract type name to every concrete or abstract type that can stand in
    /// for it.
    pub possible_types: HashMap<String, HashSet<String>>,
    /// Type name to field name to the named type the field returns.
    pub type_fields: HashMap<String, HashMap<String, String>>,
    pub root_types: RootTypeNames,
}

#[derive(Debug, Clone)]
pub struct RootTypeNames {
    pub query: String,
    pub mutation: String,
    pub subscription: String,
}

impl Default for RootTypeNames {
    fn default() -> Self {
        RootTypeNames {
            query: "Query".to_string(),
            mutation: "Mutation".to_string(),
            subscription: "Subscription".to_string(),
        }
    }
}

impl SchemaMetadata {
    pub fn from_sdl(sdl: &str) -> Result<SchemaMetadata, SchemaParseError> {
        Ok(parse_schema(sdl)?.schema_metadata())
    }

    pub fn entity_satisfies_type_condition(&self, type_name: &str, type_condition: &str) -> bool {
        if type_name == type_condition {
            return true;
        }
        self.possible_types
            .get(type_condition)
            .is_some_and(|possible_types| possible_types.contains(type_name))
    }

    pub fn field_type(&self, parent_type: &str, field_name: &str) -> Option<&str> {
        self.type_fields
            .get(parent_type)
            .and_then(|fields| fields.get(field_name))
            .map(String::as_str)
    }
}

pub trait SchemaWithMetadata {
    fn schema_metadata(&self) -> SchemaMetadata;
}

impl<'a> SchemaWithMetadata for Document<'a, String> {
    fn schema_metadata(&self) -> SchemaMetadata {
        let mut first_possible_types: HashMap<String, Vec<String>> = HashMap::new();
        let mut type_fields: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut root_types = RootTypeNames::default();

        for definition in &self.definitions {
            match definition {
                Definition::SchemaDefinition(schema_definition) => {
                    if let Some(query) = &schema_definition.query {
                        root_types.query = query.to_string();
                    }
                    if let Some(mutation) = &schema_definition.mutation {
                        root_types.mutation = mutation.to_string();
                    }
                    if let Some(subscription) = &schema_definition.subscription {
                        root_types.subscription = subscription.to_string();
                    }
                }
                Definition::TypeDefinition(TypeDefinition::Object(object_type)) => {
                    let fields = type_fields.entry(object_type.name.to_string()).or_default();
                    for field in &object_type.fields {
                        fields.insert(field.name.to_string(), field.field_type.type_name());
                    }

                    for interface in &object_type.implements_interfaces {
                        first_possible_types
                            .entry(interface.to_string())
                            .or_default()
                            .push(object_type.name.to_string());
                    }
                }
                Definition::TypeDefinition(TypeDefinition::Interface(interface_type)) => {
                    let fields = type_fields
                        .entry(interface_type.name.to_string())
                        .or_default();
                    for field in &interface_type.fields {
                        fields.insert(field.name.to_string(), field.field_type.type_name());
                    }
                    for interface_name in &interface_type.implements_interfaces {
                        first_possible_types
                            .entry(interface_name.to_string())
                            .or_default()
                            .push(interface_type.name.to_string());
                    }
                }
                Definition::TypeDefinition(TypeDefinition::Union(union_type)) => {
                    first_possible_types
                        .entry(union_type.name.to_string())
                        .or_default()
                        .extend(union_type.types.iter().map(|member| member.to_string()));
                }
                _ => {}
            }
        }

        let mut possible_types: HashMap<String, HashSet<String>> = HashMap::new();
        for abstract_type in first_possible_types.keys() {
            let mut collected = HashSet::new();
            collect_possible_types(abstract_type, &first_possible_types, &mut collected);
            possible_types.insert(abstract_type.to_string(), collected);
        }

        SchemaMetadata {
            possible_types,
            type_fields,
            root_types,
        }
    }
}

// Interfaces may implement interfaces, so membership is followed transitively.
fn collect_possible_types(
    type_name: &str,
    first_possible_types: &HashMap<String, Vec<String>>,
    collected: &mut HashSet<String>,
) {
    if let Some(members) = first_possible_types.get(type_name) {
        for member in members {
            if collected.insert(member.to_string()) {
                collect_possible_types(member, first_possible_types, collected);
            }
        }
    }
}

trait TypeName {
    fn type_name(&self) -> String;
}

impl<'a> TypeName for Type<'a, String> {
    fn type_name(&self) -> String {
        match self {
            Type::NamedType(named_type) => named_type.to_string(),
            Type::NonNullType(non_null_type) => non_null_type.type_name(),
            Type::ListType(list_type) => list_type.type_name(),
        }
    }
}
