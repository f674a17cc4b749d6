use std::hint::black_box;

use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, Criterion};
use federated_plan_executor::{
    execute_query_plan,
    execution_context::{OperationContext, RequestContext},
    executors::{
        common::{SubgraphExecutionRequest, SubgraphExecutor},
        error::SubgraphExecutorError,
        map::SubgraphExecutorMap,
    },
    parsing::parse_operation,
    plan::QueryPlan,
    response::{merge::deep_merge, subgraph_response::SubgraphResponse},
    schema_metadata::SchemaMetadata,
    ExposeQueryPlanMode,
};
use serde_json::{json, Value};
use tokio::runtime::Runtime;

const REVIEWS_COUNT: usize = 100;

struct ReviewsSubgraph;

#[async_trait]
impl SubgraphExecutor for ReviewsSubgraph {
    async fn execute<'a>(
        &self,
        _execution_request: SubgraphExecutionRequest<'a>,
    ) -> Result<SubgraphResponse, SubgraphExecutorError> {
        let reviews: Vec<Value> = (0..REVIEWS_COUNT)
            .map(|i| {
                json!({
                    "id": i.to_string(),
                    "body": format!("review {}", i),
                    "author": { "__typename": "User", "id": (i % 10).to_string() }
                })
            })
            .collect();
        Ok(SubgraphResponse::from_data(json!({ "topReviews": reviews })))
    }
}

struct AccountsSubgraph;

#[async_trait]
impl SubgraphExecutor for AccountsSubgraph {
    async fn execute<'a>(
        &self,
        execution_request: SubgraphExecutionRequest<'a>,
    ) -> Result<SubgraphResponse, SubgraphExecutorError> {
        let entities: Vec<Value> = execution_request
            .representations
            .unwrap_or_default()
            .iter()
            .map(|representation| json!({ "name": format!("user {}", representation["id"]) }))
            .collect();
        Ok(SubgraphResponse::from_data(json!({ "_entities": entities })))
    }
}

fn query_plan() -> QueryPlan {
    serde_json::from_value(json!({
        "kind": "QueryPlan",
        "node": {
            "kind": "Sequence",
            "nodes": [
                {
                    "kind": "Fetch",
                    "serviceName": "reviews",
                    "operation": "{topReviews{id body author{__typename id}}}"
                },
                {
                    "kind": "Flatten",
                    "path": ["topReviews", "@", "author"],
                    "node": {
                        "kind": "Fetch",
                        "serviceName": "accounts",
                        "operation": "query($representations:[_Any!]!){_entities(representations:$representations){...on User{name}}}",
                        "requires": [
                            {
                                "kind": "InlineFragment",
                                "typeCondition": "User",
                                "selections": [
                                    { "kind": "Field", "name": "__typename" },
                                    { "kind": "Field", "name": "id" }
                                ]
                            }
                        ]
                    }
                }
            ]
        }
    }))
    .expect("valid query plan")
}

fn query_plan_execution(c: &mut Criterion) {
    let rt = Runtime::new().expect("Failed to create Tokio runtime");
    let schema_metadata = SchemaMetadata::from_sdl(
        "type Query { topReviews: [Review] } type Review { id: ID! body: String author: User } type User { id: ID! name: String }",
    )
    .expect("valid schema");
    let document = parse_operation("{ topReviews { id body author { name } } }")
        .expect("valid operation");
    let query_plan = query_plan();
    let mut subgraph_executor_map = SubgraphExecutorMap::new();
    subgraph_executor_map.insert_boxed_arc("reviews".to_string(), ReviewsSubgraph.to_boxed_arc());
    subgraph_executor_map.insert_boxed_arc("accounts".to_string(), AccountsSubgraph.to_boxed_arc());
    let request_context = RequestContext::default();

    c.bench_function("query_plan_execution", |b| {
        b.to_async(&rt).iter(|| async {
            let operation_context = OperationContext {
                schema_metadata: black_box(&schema_metadata),
                document: Some(black_box(&document)),
                operation_name: None,
            };
            let result = execute_query_plan(
                black_box(&query_plan),
                black_box(&subgraph_executor_map),
                &request_context,
                &operation_context,
                ExposeQueryPlanMode::No,
            )
            .await;
            black_box(result)
        });
    });
}

fn deep_merge_entities(c: &mut Criterion) {
    let target: Value = json!({
        "topReviews": (0..REVIEWS_COUNT)
            .map(|i| json!({ "id": i.to_string(), "author": { "__typename": "User", "id": i.to_string() } }))
            .collect::<Vec<_>>()
    });
    let source: Value = json!({
        "topReviews": (0..REVIEWS_COUNT)
            .map(|i| json!({ "body": format!("review {}", i), "author": { "name": format!("user {}", i) } }))
            .collect::<Vec<_>>()
    });

    c.bench_function("deep_merge_entities", |b| {
        b.iter(|| {
            let mut target = black_box(target.clone());
            deep_merge(&mut target, black_box(source.clone()));
            black_box(target)
        });
    });
}

criterion_group!(benches, query_plan_execution, deep_merge_entities);
criterion_main!(benches);
