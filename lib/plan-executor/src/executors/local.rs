use async_graphql::{PathSegment, Response, Schema, ServerError, Variables};
use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use crate::{
    executors::{
        common::{SubgraphExecutionRequest, SubgraphExecutor},
        error::SubgraphExecutorError,
    },
    response::{
        graphql_error::{GraphQLError, GraphQLErrorLocation, GraphQLErrorPathSegment},
        subgraph_response::SubgraphResponse,
    },
};

/// Runs requests against an in-process `async-graphql` schema.
pub struct LocalSubgraphExecutor<Schema> {
    pub subgraph_name: String,
    pub schema: Schema,
}

impl<Query, Mutation, Subscription> LocalSubgraphExecutor<Schema<Query, Mutation, Subscription>>
where
    Query: async_graphql::ObjectType + 'static,
    Mutation: async_graphql::ObjectType + 'static,
    Subscription: async_graphql::SubscriptionType + 'static,
{
    pub fn new(subgraph_name: impl Into<String>, schema: Schema<Query, Mutation, Subscription>) -> Self {
        LocalSubgraphExecutor {
            subgraph_name: subgraph_name.into(),
            schema,
        }
    }
}

#[async_trait]
impl<Query, Mutation, Subscription> SubgraphExecutor
    for LocalSubgraphExecutor<Schema<Query, Mutation, Subscription>>
where
    Query: async_graphql::ObjectType + 'static,
    Mutation: async_graphql::ObjectType + 'static,
    Subscription: async_graphql::SubscriptionType + 'static,
{
    #[instrument(level = "trace", skip_all, name = "local_subgraph_execute", fields(subgraph_name = %self.subgraph_name))]
    async fn execute<'a>(
        &self,
        execution_request: SubgraphExecutionRequest<'a>,
    ) -> Result<SubgraphResponse, SubgraphExecutorError> {
        let response = self.schema.execute(to_request(&execution_request)).await;
        into_subgraph_response(response).map_err(|e| {
            SubgraphExecutorError::ResponseParseFailure(self.subgraph_name.clone(), e.to_string())
        })
    }
}

fn to_request(execution_request: &SubgraphExecutionRequest) -> async_graphql::Request {
    let mut req = async_graphql::Request::new(execution_request.query);
    if let Some(variables) = execution_request.variables_with_representations() {
        req = req.variables(Variables::from_json(Value::Object(variables)));
    }
    if let Some(operation_name) = execution_request.operation_name {
        req = req.operation_name(operation_name);
    }
    req
}

impl From<&ServerError> for GraphQLError {
    fn from(error: &ServerError) -> Self {
        GraphQLError {
            message: error.message.to_string(),
            locations: (!error.locations.is_empty()).then(|| {
                error
                    .locations
                    .iter()
                    .map(|loc| GraphQLErrorLocation {
                        line: loc.line,
                        column: loc.column,
                    })
                    .collect()
            }),
            path: (!error.path.is_empty()).then(|| {
                error
                    .path
                    .iter()
                    .map(|s| match s {
                        PathSegment::Field(name) => GraphQLErrorPathSegment::Field(name.to_string()),
                        PathSegment::Index(index) => GraphQLErrorPathSegment::Index(*index),
                    })
                    .collect()
            }),
            extensions: error
                .extensions
                .as_ref()
                .and_then(|ext| match serde_json::to_value(ext) {
                    Ok(Value::Object(map)) if !map.is_empty() => Some(map),
                    _ => None,
                }),
        }
    }
}

fn into_subgraph_response(response: Response) -> Result<SubgraphResponse, serde_json::Error> {
    let data = match response.data.into_json()? {
        Value::Null => None,
        data => Some(data),
    };
    let errors = (!response.errors.is_empty())
        .then(|| response.errors.iter().map(GraphQLError::from).collect());
    let extensions = if response.extensions.is_empty() {
        None
    } else {
        let mut map = serde_json::Map::with_capacity(response.extensions.len());
        for (key, value) in response.extensions {
            map.insert(key, value.into_json()?);
        }
        Some(map)
    };

    Ok(SubgraphResponse {
        data,
        errors,
        extensions,
    })
}
