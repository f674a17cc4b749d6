use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode, Version};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use tracing::{debug, instrument, trace};

use crate::{
    executors::{
        common::{SubgraphExecutionRequest, SubgraphExecutor, REPRESENTATIONS_VARIABLE},
        error::SubgraphExecutorError,
    },
    response::subgraph_response::SubgraphResponse,
};

#[derive(Debug)]
pub struct HTTPSubgraphExecutor {
    pub subgraph_name: String,
    pub endpoint: http::Uri,
    pub http_client: Arc<Client<HttpConnector, Full<Bytes>>>,
    pub header_map: HeaderMap,
    pub semaphore: Arc<Semaphore>,
    pub timeout: Option<Duration>,
}

/// The JSON body of a GraphQL-over-HTTP request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_name: Option<&'a str>,
    #[serde(skip_serializing_if = "RequestVariables::is_empty")]
    variables: RequestVariables<'a>,
}

/// Request variables with the entity representations appended, written
/// without copying either.
struct RequestVariables<'a> {
    variables: Option<&'a Map<String, Value>>,
    representations: Option<&'a [Value]>,
}

impl RequestVariables<'_> {
    fn is_empty(&self) -> bool {
        self.variables.map_or(true, Map::is_empty) && self.representations.is_none()
    }
}

impl Serialize for RequestVariables<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(variables) = self.variables {
            for (name, value) in variables {
                map.serialize_entry(name, value)?;
            }
        }
        if let Some(representations) = self.representations {
            map.serialize_entry(REPRESENTATIONS_VARIABLE, representations)?;
        }
        map.end()
    }
}

impl HTTPSubgraphExecutor {
    pub fn new(
        subgraph_name: String,
        endpoint: http::Uri,
        http_client: Arc<Client<HttpConnector, Full<Bytes>>>,
        semaphore: Arc<Semaphore>,
        timeout: Option<Duration>,
    ) -> Self {
        let mut header_map = HeaderMap::new();
        header_map.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        header_map.insert(
            http::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );
        Self {
            subgraph_name,
            endpoint,
            http_client,
            header_map,
            semaphore,
            timeout,
        }
    }

    fn write_body(&self, execution_request: &SubgraphExecutionRequest) -> Result<Vec<u8>, SubgraphExecutorError> {
        let body = RequestBody {
            query: execution_request.query,
            operation_name: execution_request.operation_name,
            variables: RequestVariables {
                variables: execution_request.variables,
                representations: execution_request.representations,
            },
        };
        sonic_rs::to_vec(&body).map_err(|e| {
            SubgraphExecutorError::RequestSerializationFailure(
                self.subgraph_name.clone(),
                e.to_string(),
            )
        })
    }

    async fn _execute<'a>(
        &self,
        execution_request: SubgraphExecutionRequest<'a>,
    ) -> Result<SubgraphResponse, SubgraphExecutorError> {
        trace!("Executing HTTP request to subgraph at {}", self.endpoint);
        let body = self.write_body(&execution_request)?;

        let mut req = hyper::Request::builder()
            .method(http::Method::POST)
            .uri(&self.endpoint)
            .version(Version::HTTP_11)
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| {
                SubgraphExecutorError::RequestBuildFailure(self.subgraph_name.clone(), e.to_string())
            })?;

        *req.headers_mut() = self.header_map.clone();

        let res = self.http_client.request(req).await.map_err(|e| {
            SubgraphExecutorError::RequestFailure(self.subgraph_name.clone(), e.to_string())
        })?;

        let status = res.status();
        match status {
            StatusCode::UNAUTHORIZED => {
                return Err(SubgraphExecutorError::Unauthenticated(
                    self.subgraph_name.clone(),
                ))
            }
            StatusCode::FORBIDDEN => {
                return Err(SubgraphExecutorError::Forbidden(self.subgraph_name.clone()))
            }
            _ => {}
        }

        let bytes = res
            .into_body()
            .collect()
            .await
            .map_err(|e| {
                SubgraphExecutorError::RequestFailure(self.subgraph_name.clone(), e.to_string())
            })?
            .to_bytes();

        // Non-2xx responses still count when they carry a GraphQL body.
        sonic_rs::from_slice::<SubgraphResponse>(&bytes).map_err(|e| {
            debug!(
                "subgraph {} answered with status {} and an unreadable body",
                self.subgraph_name, status
            );
            if status.is_success() {
                SubgraphExecutorError::ResponseParseFailure(self.subgraph_name.clone(), e.to_string())
            } else {
                SubgraphExecutorError::RequestFailure(
                    self.subgraph_name.clone(),
                    format!("unexpected status {}", status),
                )
            }
        })
    }
}

#[async_trait]
impl SubgraphExecutor for HTTPSubgraphExecutor {
    #[instrument(level = "trace", skip_all, name = "http_subgraph_execute", fields(subgraph_name = %self.subgraph_name, endpoint = %self.endpoint))]
    async fn execute<'a>(
        &self,
        execution_request: SubgraphExecutionRequest<'a>,
    ) -> Result<SubgraphResponse, SubgraphExecutorError> {
        let _permit = self.semaphore.acquire().await.map_err(|e| {
            SubgraphExecutorError::RequestFailure(self.subgraph_name.clone(), e.to_string())
        })?;

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self._execute(execution_request))
                .await
                .map_err(|_| SubgraphExecutorError::RequestTimeout(timeout))?,
            None => self._execute(execution_request).await,
        }
    }
}
