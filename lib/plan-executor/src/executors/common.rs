use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{executors::error::SubgraphExecutorError, response::subgraph_response::SubgraphResponse};

#[async_trait]
pub trait SubgraphExecutor {
    async fn execute<'a>(
        &self,
        execution_request: SubgraphExecutionRequest<'a>,
    ) -> Result<SubgraphResponse, SubgraphExecutorError>;

    fn to_boxed_arc<'a>(self) -> Arc<Box<dyn SubgraphExecutor + Send + Sync + 'a>>
    where
        Self: Sized + Send + Sync + 'a,
    {
        Arc::new(Box::new(self))
    }
}

pub type SubgraphExecutorType = dyn crate::executors::common::SubgraphExecutor + Send + Sync;

pub type SubgraphExecutorBoxedArc = Arc<Box<SubgraphExecutorType>>;

/// A single request to a subgraph.
///
/// `representations` travels as the `representations` variable on the wire
/// but is kept apart so executors and error reporting can tell the two
/// apart.
#[derive(Debug, Clone, Copy)]
pub struct SubgraphExecutionRequest<'a> {
    pub query: &'a str,
    pub operation_name: Option<&'a str>,
    pub variables: Option<&'a Map<String, Value>>,
    pub representations: Option<&'a [Value]>,
}

pub const REPRESENTATIONS_VARIABLE: &str = "representations";

impl SubgraphExecutionRequest<'_> {
    /// Variables as a subgraph sees them, `representations` included.
    pub fn variables_with_representations(&self) -> Option<Map<String, Value>> {
        if self.variables.is_none() && self.representations.is_none() {
            return None;
        }
        let mut variables = self.variables.cloned().unwrap_or_default();
        if let Some(representations) = self.representations {
            variables.insert(
                REPRESENTATIONS_VARIABLE.to_string(),
                Value::Array(representations.to_vec()),
            );
        }
        Some(variables)
    }
}
