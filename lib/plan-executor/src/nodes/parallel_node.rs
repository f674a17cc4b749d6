use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tracing::instrument;

use crate::{
    execution_context::ExecutionContext,
    nodes::plan_node::ExecutablePlanNode,
    plan::{FlattenNodePathSegment, ParallelNode},
};

pub trait ExecutableParallelNode {
    fn execute<'a>(
        &'a self,
        path: Vec<FlattenNodePathSegment>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, ()>;
}

impl ExecutableParallelNode for ParallelNode {
    #[instrument(level = "debug", skip_all, name = "ParallelNode::execute", fields(
        nodes_count = %self.nodes.len(),
        path = ?path
     ))]
    fn execute<'a>(
        &'a self,
        path: Vec<FlattenNodePathSegment>,
        ctx: &'a ExecutionContext<'_>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let mut stream: FuturesUnordered<_> = self
                .nodes
                .iter()
                .map(|node| node.execute(path.clone(), ctx))
                .collect();
            while stream.next().await.is_some() {}
        })
    }
}
