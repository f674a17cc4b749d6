pub mod log;
pub mod query_plan;
pub mod subgraphs;
pub mod traffic_shaping;

use config::{Config, Environment, File, FileFormat, FileSourceFile};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::PathBuf;
use tracing::debug;

use crate::{
    log::LoggingConfig, query_plan::QueryPlanConfig, subgraphs::SubgraphsConfig,
    traffic_shaping::TrafficShapingConfig,
};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExecutorConfig {
    /// The logger configuration.
    ///
    /// By default only important messages, warnings and errors are printed (`info` level).
    #[serde(default)]
    pub log: LoggingConfig,

    /// The subgraphs a query plan may fetch from, keyed by the service name used in the plan.
    #[serde(default)]
    pub subgraphs: SubgraphsConfig,

    /// Controls how requests are sent to subgraphs.
    #[serde(default)]
    pub traffic_shaping: TrafficShapingConfig,

    /// Query plan related options.
    #[serde(default)]
    pub query_plan: QueryPlanConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutorConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "executor.config.yaml",
    "executor.config.yml",
    "executor.config.json",
    "executor.config.json5",
];

/// Environment variables with this prefix override file values,
/// e.g. `PLAN_EXECUTOR__LOG__LEVEL=debug`.
pub const ENV_PREFIX: &str = "PLAN_EXECUTOR";

pub fn load_config(override_config_path: Option<String>) -> Result<ExecutorConfig, ExecutorConfigError> {
    let mut config = Config::builder();

    if let Some(path_str) = override_config_path {
        let path_buf = path_str
            .parse::<PathBuf>()
            .map_err(ExecutorConfigError::ConfigPathParseError)?;
        debug!("loading configuration from {}", path_buf.display());
        let as_file: File<FileSourceFile, _> = path_buf.into();
        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    config = config.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__"),
    );

    Ok(config.build()?.try_deserialize::<ExecutorConfig>()?)
}

pub fn parse_yaml_config(config_raw: &str) -> Result<ExecutorConfig, ExecutorConfigError> {
    Ok(Config::builder()
        .add_source(File::from_str(config_raw, FileFormat::Yaml))
        .build()?
        .try_deserialize::<ExecutorConfig>()?)
}
