use futures::future::BoxFuture;

use crate::{
    execution_context::ExecutionContext,
    nodes::{
        fetch_node::ExecutableFetchNode, flatten_node::ExecutableFlattenNode,
        parallel_node::ExecutableParallelNode, sequence_node::ExecutableSequenceNode,
    },
    plan::{FlattenNodePathSegment, PlanNode},
};

/// A plan node that can run against the shared response tree.
///
/// `path` is the flatten path accumulated from the enclosing nodes, empty at
/// the root. Nodes never fail: problems end up in the context's errors.
pub trait ExecutablePlanNode {
    fn execute<'a>(
        &'a self,
        path: Vec<FlattenNodePathSegment>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, ()>;
}

impl ExecutablePlanNode for PlanNode {
    fn execute<'a>(
        &'a self,
        path: Vec<FlattenNodePathSegment>,
        ctx: &'a ExecutionContext<'_>,
    ) -> BoxFuture<'a, ()> {
        match self {
            PlanNode::Fetch(node) => node.execute(path, ctx),
            PlanNode::Flatten(node) => node.execute(path, ctx),
            PlanNode::Parallel(node) => node.execute(path, ctx),
            PlanNode::Sequence(node) => node.execute(path, ctx),
        }
    }
}
