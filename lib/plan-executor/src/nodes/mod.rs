pub mod fetch_node;
pub mod flatten_node;
pub mod parallel_node;
pub mod plan_node;
pub mod query_plan_node;
pub mod sequence_node;
