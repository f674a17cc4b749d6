use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper_util::{
    client::legacy::Client,
    rt::{TokioExecutor, TokioTimer},
};
use plan_executor_config::traffic_shaping::TrafficShapingConfig;
use tokio::sync::Semaphore;
use tracing::{instrument, warn};

use crate::{
    executors::{
        common::{SubgraphExecutionRequest, SubgraphExecutor, SubgraphExecutorBoxedArc},
        error::SubgraphExecutorError,
        http::HTTPSubgraphExecutor,
    },
    response::subgraph_response::SubgraphResponse,
};

/// Subgraph executors by service name.
#[derive(Default)]
pub struct SubgraphExecutorMap {
    inner: HashMap<String, SubgraphExecutorBoxedArc>,
}

impl SubgraphExecutorMap {
    pub fn new() -> Self {
        SubgraphExecutorMap {
            inner: HashMap::new(),
        }
    }

    /// Runs `execution_request` on the named subgraph. A name with no
    /// executor fails the same way an unreachable subgraph does.
    #[instrument(level = "trace", name = "subgraph_execute", skip_all, fields(subgraph_name = %subgraph_name))]
    pub async fn execute<'a>(
        &self,
        subgraph_name: &str,
        execution_request: SubgraphExecutionRequest<'a>,
    ) -> Result<SubgraphResponse, SubgraphExecutorError> {
        match self.inner.get(subgraph_name) {
            Some(executor) => executor.execute(execution_request).await,
            None => {
                warn!(
                    "Subgraph executor not found for subgraph: {}",
                    subgraph_name
                );
                Err(SubgraphExecutorError::SubgraphNotFound(
                    subgraph_name.to_string(),
                ))
            }
        }
    }

    pub fn insert_boxed_arc(&mut self, subgraph_name: String, boxed_arc: SubgraphExecutorBoxedArc) {
        self.inner.insert(subgraph_name, boxed_arc);
    }

    pub fn contains(&self, subgraph_name: &str) -> bool {
        self.inner.contains_key(subgraph_name)
    }

    /// Builds one HTTP executor per endpoint, all sharing a single connection
    /// pool. Each subgraph gets its own in-flight request limit.
    pub fn from_http_endpoint_map(
        subgraph_endpoint_map: HashMap<String, String>,
        config: &TrafficShapingConfig,
    ) -> Result<Self, SubgraphExecutorError> {
        let http_client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.max_connections_per_host)
            .build_http::<Full<Bytes>>();
        let http_client_arc = Arc::new(http_client);

        let mut inner = HashMap::with_capacity(subgraph_endpoint_map.len());
        for (subgraph_name, endpoint) in subgraph_endpoint_map {
            let endpoint_uri = endpoint.parse::<http::Uri>().map_err(|e| {
                SubgraphExecutorError::EndpointParseFailure(endpoint.clone(), e.to_string())
            })?;
            // A zero-permit semaphore would park every request forever.
            let semaphore = Arc::new(Semaphore::new(config.max_connections_per_host.max(1)));
            let executor = HTTPSubgraphExecutor::new(
                subgraph_name.clone(),
                endpoint_uri,
                http_client_arc.clone(),
                semaphore,
                config.request_timeout,
            );
            inner.insert(subgraph_name, executor.to_boxed_arc());
        }

        Ok(SubgraphExecutorMap { inner })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use plan_executor_config::traffic_shaping::TrafficShapingConfig;

    use super::SubgraphExecutorMap;
    use crate::executors::{common::SubgraphExecutionRequest, error::SubgraphExecutorError};

    #[tokio::test]
    async fn missing_subgraph_is_an_error() {
        let map = SubgraphExecutorMap::new();
        let result = map
            .execute(
                "inventory",
                SubgraphExecutionRequest {
                    query: "{ a }",
                    operation_name: None,
                    variables: None,
                    representations: None,
                },
            )
            .await;
        assert_eq!(
            result.unwrap_err(),
            SubgraphExecutorError::SubgraphNotFound("inventory".to_string())
        );
    }

    #[tokio::test]
    async fn builds_http_executors_from_endpoints() {
        let endpoints = HashMap::from([
            ("accounts".to_string(), "http://localhost:4001/graphql".to_string()),
            ("reviews".to_string(), "http://localhost:4002/graphql".to_string()),
        ]);
        let map = SubgraphExecutorMap::from_http_endpoint_map(endpoints, &TrafficShapingConfig::default())
            .unwrap();
        assert!(map.contains("accounts"));
        assert!(map.contains("reviews"));
        assert!(!map.contains("inventory"));
    }

    #[tokio::test]
    async fn rejects_invalid_endpoints() {
        let endpoints = HashMap::from([("accounts".to_string(), "not a uri".to_string())]);
        let result =
            SubgraphExecutorMap::from_http_endpoint_map(endpoints, &TrafficShapingConfig::default());
        assert!(matches!(
            result,
            Err(SubgraphExecutorError::EndpointParseFailure(_, _))
        ));
    }
}
