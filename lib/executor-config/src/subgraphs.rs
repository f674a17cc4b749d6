use std::collections::{BTreeMap, HashMap};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Subgraphs by service name.
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct SubgraphsConfig(BTreeMap<String, SubgraphConfig>);

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct SubgraphConfig {
    /// The GraphQL endpoint of the subgraph, e.g. `http://localhost:4001/graphql`.
    pub url: Url,
}

impl SubgraphsConfig {
    pub fn get(&self, service_name: &str) -> Option<&SubgraphConfig> {
        self.0.get(service_name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SubgraphConfig)> {
        self.0.iter()
    }

    /// Service name to endpoint, in the shape HTTP executors are built from.
    pub fn endpoint_map(&self) -> HashMap<String, String> {
        self.0
            .iter()
            .map(|(name, subgraph)| (name.clone(), subgraph.url.to_string()))
            .collect()
    }
}
