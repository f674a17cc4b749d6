use futures::future::BoxFuture;

use crate::{
    execution_context::ExecutionContext, nodes::plan_node::ExecutablePlanNode, plan::QueryPlan,
};

pub trait ExecutableQueryPlanNode {
    fn execute<'a>(&'a self, ctx: &'a ExecutionContext<'_>) -> BoxFuture<'a, ()>;
}

impl ExecutableQueryPlanNode for QueryPlan {
    fn execute<'a>(&'a self, ctx: &'a ExecutionContext<'_>) -> BoxFuture<'a, ()> {
        match &self.node {
            Some(node) => node.execute(vec![], ctx),
            None => Box::pin(async {}),
        }
    }
}
