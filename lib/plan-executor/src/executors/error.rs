use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SubgraphExecutorError {
    #[error("Subgraph executor not found for subgraph: {0}")]
    SubgraphNotFound(String),
    #[error("Failed to parse endpoint \"{0}\" as URI: {1}")]
    EndpointParseFailure(String, String),
    #[error("Failed to build request to subgraph \"{0}\": {1}")]
    RequestBuildFailure(String, String),
    #[error("Failed to serialize request body for subgraph \"{0}\": {1}")]
    RequestSerializationFailure(String, String),
    #[error("Failed to send request to subgraph \"{0}\": {1}")]
    RequestFailure(String, String),
    #[error("Request timed out after {0:?}")]
    RequestTimeout(Duration),
    #[error("Subgraph \"{0}\" rejected the request as unauthenticated")]
    Unauthenticated(String),
    #[error("Subgraph \"{0}\" rejected the request as forbidden")]
    Forbidden(String),
    #[error("Failed to parse response from subgraph \"{0}\": {1}")]
    ResponseParseFailure(String, String),
}

impl SubgraphExecutorError {
    /// The `extensions.code` reported for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            SubgraphExecutorError::Unauthenticated(_) => "UNAUTHENTICATED",
            SubgraphExecutorError::Forbidden(_) => "FORBIDDEN",
            _ => crate::response::graphql_error::DEFAULT_ERROR_CODE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SubgraphExecutorError;
    use std::time::Duration;

    #[test]
    fn typed_failures_carry_their_code() {
        assert_eq!(
            SubgraphExecutorError::Unauthenticated("accounts".into()).code(),
            "UNAUTHENTICATED"
        );
        assert_eq!(SubgraphExecutorError::Forbidden("accounts".into()).code(), "FORBIDDEN");
        assert_eq!(
            SubgraphExecutorError::RequestTimeout(Duration::from_secs(1)).code(),
            "INTERNAL_SERVER_ERROR"
        );
        assert_eq!(
            SubgraphExecutorError::SubgraphNotFound("inventory".into()).to_string(),
            "Subgraph executor not found for subgraph: inventory"
        );
    }
}
