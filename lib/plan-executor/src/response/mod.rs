pub mod graphql_error;
pub mod merge;
pub mod subgraph_response;
