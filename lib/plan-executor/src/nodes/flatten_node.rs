use futures::future::BoxFuture;
use tracing::instrument;

use crate::{
    execution_context::ExecutionContext,
    nodes::plan_node::ExecutablePlanNode,
    plan::{FlattenNode, FlattenNodePathSegment},
};

pub trait ExecutableFlattenNode {
    fn execute<'a>(
        &'a self,
        path: Vec<FlattenNodePathSegment>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, ()>;
}

impl ExecutableFlattenNode for FlattenNode {
    #[instrument(level = "debug", skip_all, name = "FlattenNode::execute", fields(
          path = ?self.path
      ))]
    fn execute<'a>(
        &'a self,
        path: Vec<FlattenNodePathSegment>,
        ctx: &'a ExecutionContext<'_>,
    ) -> BoxFuture<'a, ()> {
        let mut new_path = path;
        new_path.extend(self.path.iter().cloned());
        self.node.execute(new_path, ctx)
    }
}
