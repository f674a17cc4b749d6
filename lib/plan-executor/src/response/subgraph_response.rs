use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::response::graphql_error::GraphQLError;

/// What a subgraph answered. `data` is kept even when `errors` is present.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SubgraphResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQLError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl SubgraphResponse {
    pub fn from_data(data: Value) -> Self {
        SubgraphResponse {
            data: Some(data),
            ..Default::default()
        }
    }

    /// Takes the `_entities` list out of `data`, if the subgraph sent one.
    pub fn take_entities(&mut self) -> Option<Vec<Value>> {
        match self.data.as_mut()? {
            Value::Object(map) => match map.remove("_entities")? {
                Value::Array(entities) => Some(entities),
                _ => None,
            },
            _ => None,
        }
    }
}
