use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::{
    execution_context::{ExecutionContext, OperationContext, RequestContext},
    execution_result::ExecutionResult,
    executors::map::SubgraphExecutorMap,
    nodes::query_plan_node::ExecutableQueryPlanNode,
    plan::QueryPlan,
    projection::project_by_operation,
};

pub mod error_collector;
pub mod error_normalization;
pub mod execution_context;
pub mod execution_result;
pub mod executors;
pub mod nodes;
pub mod parsing;
pub mod plan;
pub mod projection;
pub mod representations;
pub mod response;
pub mod schema_metadata;
pub mod traverse_path;
pub mod variables;

#[cfg(test)]
mod tests;

pub const TYPENAME_FIELD: &str = "__typename";

/// Whether the plan is returned under `extensions.queryPlan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExposeQueryPlanMode {
    Yes,
    #[default]
    No,
    /// Return the plan without executing it.
    DryRun,
}

impl ExposeQueryPlanMode {
    fn exposes_plan(&self) -> bool {
        matches!(self, ExposeQueryPlanMode::Yes | ExposeQueryPlanMode::DryRun)
    }
}

impl From<bool> for ExposeQueryPlanMode {
    fn from(expose: bool) -> Self {
        if expose {
            ExposeQueryPlanMode::Yes
        } else {
            ExposeQueryPlanMode::No
        }
    }
}

/// Runs `query_plan` and assembles the client response.
///
/// Subgraph failures never make this fail: they are reported in `errors`
/// and the affected fields stay `null`.
#[instrument(level = "debug", skip_all, name = "execute_query_plan", fields(
    operation_name = ?operation_context.operation_name,
    expose_query_plan = ?expose_query_plan
))]
pub async fn execute_query_plan(
    query_plan: &QueryPlan,
    subgraph_executor_map: &SubgraphExecutorMap,
    request_context: &RequestContext,
    operation_context: &OperationContext<'_>,
    expose_query_plan: ExposeQueryPlanMode,
) -> ExecutionResult {
    let extensions = if expose_query_plan.exposes_plan() {
        query_plan_extensions(query_plan)
    } else {
        None
    };

    if expose_query_plan == ExposeQueryPlanMode::DryRun {
        debug!("dry run, skipping execution");
        return ExecutionResult::new(None, vec![], extensions);
    }

    let ctx = ExecutionContext::new(
        subgraph_executor_map,
        request_context,
        operation_context.schema_metadata,
    );
    query_plan.execute(&ctx).await;
    let (data, errors) = ctx.finish();
    debug!("plan executed with {} errors", errors.len());

    let data = match operation_context.document {
        Some(document) => project_by_operation(
            data,
            document,
            operation_context.operation_name,
            operation_context.schema_metadata,
            request_context.variables.as_ref(),
        ),
        None => data,
    };

    ExecutionResult::new(Some(data), errors, extensions)
}

fn query_plan_extensions(query_plan: &QueryPlan) -> Option<Map<String, Value>> {
    match serde_json::to_value(query_plan) {
        Ok(query_plan) => Some(Map::from_iter([("queryPlan".to_string(), query_plan)])),
        Err(e) => {
            warn!("Failed to serialize the query plan: {}", e);
            None
        }
    }
}
