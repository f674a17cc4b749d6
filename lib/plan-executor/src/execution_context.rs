use graphql_parser::query;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::{
    error_collector::ErrorCollector, executors::map::SubgraphExecutorMap,
    response::graphql_error::GraphQLError, schema_metadata::SchemaMetadata,
};

/// Per-request input supplied by the caller.
#[derive(Debug, Default, Clone)]
pub struct RequestContext {
    pub variables: Option<Map<String, Value>>,
}

/// The client operation a plan was built for.
#[derive(Debug, Clone, Copy)]
pub struct OperationContext<'a> {
    pub schema_metadata: &'a SchemaMetadata,
    /// Used to shape the final response. Without it the merged tree is
    /// returned as is.
    pub document: Option<&'a query::Document<'a, String>>,
    pub operation_name: Option<&'a str>,
}

/// State shared by every node of one plan execution.
///
/// `data` and `errors` are locked only around synchronous reads and merges,
/// never while a subgraph call is in flight.
pub struct ExecutionContext<'a> {
    pub data: Mutex<Value>,
    pub errors: ErrorCollector,
    pub variables: Option<&'a Map<String, Value>>,
    pub schema_metadata: &'a SchemaMetadata,
    pub subgraph_executor_map: &'a SubgraphExecutorMap,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        subgraph_executor_map: &'a SubgraphExecutorMap,
        request_context: &'a RequestContext,
        schema_metadata: &'a SchemaMetadata,
    ) -> Self {
        ExecutionContext {
            data: Mutex::new(Value::Object(Map::new())),
            errors: ErrorCollector::default(),
            variables: request_context.variables.as_ref(),
            schema_metadata,
            subgraph_executor_map,
        }
    }

    /// Consumes the context, returning the merged tree and collected errors.
    pub fn finish(self) -> (Value, Vec<GraphQLError>) {
        (self.data.into_inner(), self.errors.into_inner())
    }
}
