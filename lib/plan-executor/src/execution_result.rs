use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::response::graphql_error::GraphQLError;

/// The response envelope returned to the client.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Never an empty list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQLError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl ExecutionResult {
    pub fn new(
        data: Option<Value>,
        errors: Vec<GraphQLError>,
        extensions: Option<Map<String, Value>>,
    ) -> ExecutionResult {
        ExecutionResult {
            data,
            errors: (!errors.is_empty()).then_some(errors),
            extensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ExecutionResult;
    use serde_json::json;

    #[test]
    fn empty_errors_are_omitted() {
        let result = ExecutionResult::new(Some(json!({ "me": null })), vec![], None);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "data": { "me": null } })
        );
    }

    #[test]
    fn errors_are_serialized_when_present() {
        let result = ExecutionResult::new(Some(json!({})), vec!["boom".into()], None);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "data": {}, "errors": [{ "message": "boom" }] })
        );
    }
}
