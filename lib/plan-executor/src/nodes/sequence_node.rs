use futures::future::BoxFuture;
use tracing::instrument;

use crate::{
    execution_context::ExecutionContext,
    nodes::plan_node::ExecutablePlanNode,
    plan::{FlattenNodePathSegment, SequenceNode},
};

pub trait ExecutableSequenceNode {
    fn execute<'a>(
        &'a self,
        path: Vec<FlattenNodePathSegment>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, ()>;
}

impl ExecutableSequenceNode for SequenceNode {
    #[instrument(level = "debug", skip_all, name = "SequenceNode::execute", fields(
         nodes_count = %self.nodes.len(),
         path = ?path
     ))]
    fn execute<'a>(
        &'a self,
        path: Vec<FlattenNodePathSegment>,
        ctx: &'a ExecutionContext<'_>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            // Each child sees everything its predecessors merged.
            for node in &self.nodes {
                node.execute(path.clone(), ctx).await;
            }
        })
    }
}
