use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct QueryPlanConfig {
    /// Attach the executed query plan to the response under `extensions.queryPlan`.
    #[serde(default)]
    pub expose: bool,
}
