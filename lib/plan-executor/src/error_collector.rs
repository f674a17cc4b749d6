use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::response::graphql_error::{GraphQLError, DEFAULT_ERROR_CODE};

/// Errors gathered while a plan runs. Shared by every branch of the plan.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Mutex<Vec<GraphQLError>>,
}

impl ErrorCollector {
    pub async fn push(&self, error: GraphQLError) {
        self.errors.lock().await.push(error);
    }

    pub async fn extend(&self, errors: impl IntoIterator<Item = GraphQLError>) {
        self.errors.lock().await.extend(errors);
    }

    pub fn into_inner(self) -> Vec<GraphQLError> {
        self.errors.into_inner()
    }
}

/// What a fetch sent, attached to every error it produces.
pub struct FetchErrorContext<'a> {
    pub service_name: &'a str,
    pub query: &'a str,
    pub variables: &'a Map<String, Value>,
}

impl FetchErrorContext<'_> {
    /// Adds `serviceName`, `query` and `variables` to the error's extensions.
    /// A `code` the service already set is kept.
    pub fn annotate(&self, mut error: GraphQLError, default_code: &str) -> GraphQLError {
        let extensions = error.extensions.get_or_insert_with(Map::new);
        if !extensions.get("code").is_some_and(Value::is_string) {
            extensions.insert("code".to_string(), Value::String(default_code.to_string()));
        }
        extensions.insert(
            "serviceName".to_string(),
            Value::String(self.service_name.to_string()),
        );
        extensions.insert("query".to_string(), Value::String(self.query.to_string()));
        extensions.insert(
            "variables".to_string(),
            Value::Object(self.variables.clone()),
        );
        error
    }

    pub fn annotate_all(&self, errors: Vec<GraphQLError>) -> Vec<GraphQLError> {
        errors
            .into_iter()
            .map(|error| self.annotate(error, DEFAULT_ERROR_CODE))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn keeps_insertion_order() {
        let collector = ErrorCollector::default();
        collector.push("first".into()).await;
        collector
            .extend(vec!["second".into(), "third".into()])
            .await;
        let messages: Vec<String> = collector
            .into_inner()
            .into_iter()
            .map(|e: GraphQLError| e.message)
            .collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn annotates_with_fetch_details() {
        let variables = json!({ "first": 2 }).as_object().cloned().unwrap();
        let context = FetchErrorContext {
            service_name: "reviews",
            query: "{ topReviews(first: $first) { body } }",
            variables: &variables,
        };
        let errors = context.annotate_all(vec![
            "plain".into(),
            serde_json::from_value(json!({
                "message": "denied",
                "extensions": { "code": "FORBIDDEN", "reason": "scope" }
            }))
            .unwrap(),
        ]);

        assert_eq!(errors[0].code(), Some("INTERNAL_SERVER_ERROR"));
        assert_eq!(errors[0].service_name(), Some("reviews"));
        assert_eq!(
            errors[0].extension("query"),
            Some(&json!("{ topReviews(first: $first) { body } }"))
        );
        assert_eq!(errors[0].extension("variables"), Some(&json!({ "first": 2 })));

        assert_eq!(errors[1].code(), Some("FORBIDDEN"));
        assert_eq!(errors[1].extension("reason"), Some(&json!("scope")));
    }
}
