use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{
    execute_query_plan,
    execution_context::{OperationContext, RequestContext},
    execution_result::ExecutionResult,
    executors::{
        common::{SubgraphExecutionRequest, SubgraphExecutor},
        error::SubgraphExecutorError,
        map::SubgraphExecutorMap,
    },
    parsing::parse_operation,
    plan::QueryPlan,
    response::subgraph_response::SubgraphResponse,
    schema_metadata::SchemaMetadata,
    ExposeQueryPlanMode,
};

mod fixtures;

pub const SUPERGRAPH_SDL: &str = r#"
    type Query {
        me: User
        topReviews(first: Int): [Review]
        topProducts: [Product]
    }

    interface Node {
        id: ID!
    }

    type User implements Node {
        id: ID!
        name: String
        username: String
    }

    type Bot implements Node {
        id: ID!
    }

    type Review {
        id: ID!
        body: String
        author: User
    }

    type Product {
        upc: String!
        name: String
    }
"#;

/// A request as a mock subgraph saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub query: String,
    pub variables: Option<Map<String, Value>>,
    pub representations: Option<Vec<Value>>,
}

pub type CallLog = Arc<Mutex<Vec<RecordedRequest>>>;

type Responder = dyn Fn(&SubgraphExecutionRequest<'_>) -> Result<SubgraphResponse, SubgraphExecutorError>
    + Send
    + Sync;

pub struct MockSubgraphExecutor {
    calls: CallLog,
    respond: Box<Responder>,
}

impl MockSubgraphExecutor {
    pub fn new<F>(respond: F) -> (Self, CallLog)
    where
        F: Fn(&SubgraphExecutionRequest<'_>) -> Result<SubgraphResponse, SubgraphExecutorError>
            + Send
            + Sync
            + 'static,
    {
        let calls = CallLog::default();
        (
            MockSubgraphExecutor {
                calls: calls.clone(),
                respond: Box::new(respond),
            },
            calls,
        )
    }

    /// A subgraph that always answers with `body`.
    pub fn responding(body: Value) -> (Self, CallLog) {
        Self::new(move |_| Ok(subgraph_response(body.clone())))
    }
}

#[async_trait]
impl SubgraphExecutor for MockSubgraphExecutor {
    async fn execute<'a>(
        &self,
        execution_request: SubgraphExecutionRequest<'a>,
    ) -> Result<SubgraphResponse, SubgraphExecutorError> {
        self.calls.lock().unwrap().push(RecordedRequest {
            query: execution_request.query.to_string(),
            variables: execution_request.variables.cloned(),
            representations: execution_request.representations.map(<[Value]>::to_vec),
        });
        (self.respond)(&execution_request)
    }
}

pub fn subgraph_response(body: Value) -> SubgraphResponse {
    serde_json::from_value(body).unwrap()
}

pub fn query_plan(plan: Value) -> QueryPlan {
    serde_json::from_value(plan).unwrap()
}

pub fn calls(log: &CallLog) -> Vec<RecordedRequest> {
    log.lock().unwrap().clone()
}

/// Runs `plan` the way a gateway would for `operation`.
pub async fn run(
    plan: &QueryPlan,
    subgraph_executor_map: &SubgraphExecutorMap,
    operation: Option<&str>,
    variables: Value,
    expose_query_plan: ExposeQueryPlanMode,
) -> ExecutionResult {
    let schema_metadata = SchemaMetadata::from_sdl(SUPERGRAPH_SDL).unwrap();
    let document = operation.map(|operation| parse_operation(operation).unwrap());
    let request_context = RequestContext {
        variables: variables.as_object().cloned(),
    };
    let operation_context = OperationContext {
        schema_metadata: &schema_metadata,
        document: document.as_ref(),
        operation_name: None,
    };
    execute_query_plan(
        plan,
        subgraph_executor_map,
        &request_context,
        &operation_context,
        expose_query_plan,
    )
    .await
}
