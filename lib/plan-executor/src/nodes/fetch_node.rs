use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::{
    error_collector::FetchErrorContext,
    error_normalization::{
        normalize_errors_for_representations, normalize_errors_for_root, static_prefix,
    },
    execution_context::ExecutionContext,
    executors::{common::SubgraphExecutionRequest, error::SubgraphExecutorError},
    plan::{FetchNode, FlattenNodePathSegment, Selection},
    representations::project_requires,
    response::{
        graphql_error::{GraphQLError, GraphQLErrorPathSegment, DEFAULT_ERROR_CODE},
        merge::deep_merge,
    },
    traverse_path::{resolve_locations, traverse_path, value_at_path_mut, ResponsePath},
    variables::variables_for_usages,
};

pub trait ExecutableFetchNode {
    fn variables(&self, ctx: &ExecutionContext) -> Map<String, Value>;
    fn representations(
        &self,
        requires: &[Selection],
        data: &Value,
        path: &[FlattenNodePathSegment],
        ctx: &ExecutionContext,
    ) -> (Vec<Value>, Vec<ResponsePath>);
    fn execute<'a>(
        &'a self,
        path: Vec<FlattenNodePathSegment>,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, ()>;
}

impl ExecutableFetchNode for FetchNode {
    fn variables(&self, ctx: &ExecutionContext) -> Map<String, Value> {
        variables_for_usages(self.variable_usages.as_deref(), ctx.variables)
    }

    /// Representations for every location `path` resolves to, in document
    /// order, together with the location each one came from.
    fn representations(
        &self,
        requires: &[Selection],
        data: &Value,
        path: &[FlattenNodePathSegment],
        ctx: &ExecutionContext,
    ) -> (Vec<Value>, Vec<ResponsePath>) {
        let mut representations = vec![];
        let mut locations = vec![];
        traverse_path(data, vec![], path, &mut |location, entity| {
            if let Some(representation) = project_requires(
                entity,
                requires,
                self.type_condition.as_deref(),
                ctx.schema_metadata,
            ) {
                representations.push(representation);
                locations.push(location);
            }
        });
        (representations, locations)
    }

    #[instrument(level = "debug", skip_all, name = "FetchNode::execute", fields(
        service_name = %self.service_name,
        path = ?path
    ))]
    fn execute<'a>(
        &'a self,
        path: Vec<FlattenNodePathSegment>,
        ctx: &'a ExecutionContext<'_>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if self.is_entity_fetch() {
                execute_for_entities(self, &path, ctx).await
            } else {
                execute_for_root(self, &path, ctx).await
            }
        })
    }
}

async fn execute_for_root(
    node: &FetchNode,
    path: &[FlattenNodePathSegment],
    ctx: &ExecutionContext<'_>,
) {
    let variables = node.variables(ctx);
    let error_context = FetchErrorContext {
        service_name: &node.service_name,
        query: &node.operation,
        variables: &variables,
    };
    let request = SubgraphExecutionRequest {
        query: &node.operation,
        operation_name: node.operation_name.as_deref(),
        variables: Some(&variables),
        representations: None,
    };
    let prefix = static_prefix(path);

    let response = match ctx
        .subgraph_executor_map
        .execute(&node.service_name, request)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            record_failure(ctx, &error_context, &prefix, e).await;
            return;
        }
    };

    if let Some(data) = response.data {
        let mut tree = ctx.data.lock().await;
        let locations = resolve_locations(&tree, path);
        if let Some((last, rest)) = locations.split_last() {
            for location in rest {
                if let Some(target) = value_at_path_mut(&mut tree, location) {
                    deep_merge(target, data.clone());
                }
            }
            if let Some(target) = value_at_path_mut(&mut tree, last) {
                deep_merge(target, data);
            }
        } else {
            debug!("no location to merge the response of {}", node.service_name);
        }
    }

    if let Some(errors) = response.errors {
        let errors = normalize_errors_for_root(&prefix, errors);
        ctx.errors.extend(error_context.annotate_all(errors)).await;
    }
}

async fn execute_for_entities(
    node: &FetchNode,
    path: &[FlattenNodePathSegment],
    ctx: &ExecutionContext<'_>,
) {
    let requires = node.requires.as_deref().unwrap_or_default();
    let (representations, locations) = {
        let tree = ctx.data.lock().await;
        node.representations(requires, &tree, path, ctx)
    };

    if representations.is_empty() {
        debug!(
            "no representations for {}, skipping the fetch",
            node.service_name
        );
        return;
    }

    let variables = node.variables(ctx);
    let error_context = FetchErrorContext {
        service_name: &node.service_name,
        query: &node.operation,
        variables: &variables,
    };
    let request = SubgraphExecutionRequest {
        query: &node.operation,
        operation_name: node.operation_name.as_deref(),
        variables: Some(&variables),
        representations: Some(&representations),
    };
    let prefix = static_prefix(path);

    let mut response = match ctx
        .subgraph_executor_map
        .execute(&node.service_name, request)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            record_failure(ctx, &error_context, &prefix, e).await;
            return;
        }
    };

    let has_service_errors = response.errors.as_ref().is_some_and(|e| !e.is_empty());
    match response.take_entities() {
        Some(entities) => {
            if entities.len() != locations.len() {
                warn!(
                    "{} returned {} entities for {} representations",
                    node.service_name,
                    entities.len(),
                    locations.len()
                );
                record_entities_mismatch(ctx, &error_context, &prefix, locations.len()).await;
            }
            let mut tree = ctx.data.lock().await;
            for (entity, location) in entities.into_iter().zip(locations.iter()) {
                if !entity.is_object() {
                    continue;
                }
                if let Some(target) = value_at_path_mut(&mut tree, location) {
                    deep_merge(target, entity);
                }
            }
        }
        // Service errors already account for the missing entities.
        None if has_service_errors => {}
        None => {
            warn!("{} returned no \"_entities\" list", node.service_name);
            record_entities_mismatch(ctx, &error_context, &prefix, locations.len()).await;
        }
    }

    if let Some(errors) = response.errors {
        let errors = normalize_errors_for_representations(&locations, &prefix, errors);
        ctx.errors.extend(error_context.annotate_all(errors)).await;
    }
}

async fn record_entities_mismatch(
    ctx: &ExecutionContext<'_>,
    error_context: &FetchErrorContext<'_>,
    prefix: &[GraphQLErrorPathSegment],
    expected: usize,
) {
    let mut graphql_error = GraphQLError::from(format!(
        "Expected \"_entities\" to contain {} elements",
        expected
    ));
    graphql_error.path = (!prefix.is_empty()).then(|| prefix.to_vec());
    ctx.errors
        .push(error_context.annotate(graphql_error, DEFAULT_ERROR_CODE))
        .await;
}

async fn record_failure(
    ctx: &ExecutionContext<'_>,
    error_context: &FetchErrorContext<'_>,
    prefix: &[GraphQLErrorPathSegment],
    error: SubgraphExecutorError,
) {
    warn!(
        "fetch from {} failed: {}",
        error_context.service_name, error
    );
    let mut graphql_error = GraphQLError::from(error.to_string());
    graphql_error.path = (!prefix.is_empty()).then(|| prefix.to_vec());
    ctx.errors
        .push(error_context.annotate(graphql_error, error.code()))
        .await;
}
