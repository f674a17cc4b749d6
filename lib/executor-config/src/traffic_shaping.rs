use std::time::Duration;

use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct TrafficShapingConfig {
    /// Limits the concurrent amount of requests/connections per host/subgraph.
    ///
    /// Must be at least 1.
    #[serde(
        default = "default_max_connections_per_host",
        deserialize_with = "deserialize_max_connections_per_host"
    )]
    #[schemars(range(min = 1))]
    pub max_connections_per_host: usize,

    /// Timeout for idle sockets being kept-alive.
    #[serde(
        default = "default_pool_idle_timeout",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub pool_idle_timeout: Duration,

    /// How long a single subgraph request may take before it is reported as failed.
    ///
    /// Requests are not timed out when this is not set.
    #[serde(
        default,
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "Option<String>")]
    pub request_timeout: Option<Duration>,
}

impl Default for TrafficShapingConfig {
    fn default() -> Self {
        Self {
            max_connections_per_host: default_max_connections_per_host(),
            pool_idle_timeout: default_pool_idle_timeout(),
            request_timeout: None,
        }
    }
}

fn default_max_connections_per_host() -> usize {
    100
}

fn default_pool_idle_timeout() -> Duration {
    Duration::from_secs(50)
}

fn deserialize_max_connections_per_host<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = usize::deserialize(deserializer)?;
    if value == 0 {
        return Err(de::Error::custom(
            "max_connections_per_host must be at least 1",
        ));
    }
    Ok(value)
}
