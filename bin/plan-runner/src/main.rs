mod logger;

use std::{env, process::ExitCode};

use federated_plan_executor::{
    execute_query_plan,
    execution_context::{OperationContext, RequestContext},
    executors::{error::SubgraphExecutorError, map::SubgraphExecutorMap},
    parsing::{parse_operation, OperationParseError, SchemaParseError},
    plan::QueryPlan,
    schema_metadata::SchemaMetadata,
    ExposeQueryPlanMode,
};
use plan_executor_config::{load_config, ExecutorConfigError};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::logger::configure_logging;

const CONFIG_PATH_ENV: &str = "PLAN_EXECUTOR_CONFIG_FILE_PATH";

#[derive(Debug, thiserror::Error)]
enum RunnerError {
    #[error(
        "Usage: plan-runner <query_plan.json> [operation.graphql] [variables.json] \
         [--schema <schema.graphql>] [--operation-name <name>] [--dry-run]"
    )]
    Usage,
    #[error(transparent)]
    Config(#[from] ExecutorConfigError),
    #[error("Failed to read {0}: {1}")]
    Read(String, std::io::Error),
    #[error("Failed to parse the query plan: {0}")]
    QueryPlan(sonic_rs::Error),
    #[error("Failed to parse variables: {0}")]
    Variables(sonic_rs::Error),
    #[error(transparent)]
    Schema(#[from] SchemaParseError),
    #[error(transparent)]
    Operation(#[from] OperationParseError),
    #[error(transparent)]
    Executor(#[from] SubgraphExecutorError),
    #[error("Failed to serialize the result: {0}")]
    Output(sonic_rs::Error),
}

#[derive(Debug, Default, PartialEq)]
struct RunnerArgs {
    query_plan_path: String,
    operation_path: Option<String>,
    variables_path: Option<String>,
    schema_path: Option<String>,
    operation_name: Option<String>,
    dry_run: bool,
}

impl RunnerArgs {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<RunnerArgs, RunnerError> {
        let mut runner_args = RunnerArgs::default();
        let mut positional = vec![];
        let mut args = args.into_iter().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--schema" => runner_args.schema_path = Some(args.next().ok_or(RunnerError::Usage)?),
                "--operation-name" => {
                    runner_args.operation_name = Some(args.next().ok_or(RunnerError::Usage)?)
                }
                "--dry-run" => runner_args.dry_run = true,
                flag if flag.starts_with("--") => return Err(RunnerError::Usage),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        runner_args.query_plan_path = positional.next().ok_or(RunnerError::Usage)?;
        runner_args.operation_path = positional.next();
        runner_args.variables_path = positional.next();
        if positional.next().is_some() {
            return Err(RunnerError::Usage);
        }
        Ok(runner_args)
    }
}

fn read(path: &str) -> Result<String, RunnerError> {
    std::fs::read_to_string(path).map_err(|e| RunnerError::Read(path.to_string(), e))
}

async fn run() -> Result<(), RunnerError> {
    let args = RunnerArgs::parse(env::args())?;
    let config = load_config(env::var(CONFIG_PATH_ENV).ok())?;
    configure_logging(&config.log);

    let query_plan: QueryPlan =
        sonic_rs::from_str(&read(&args.query_plan_path)?).map_err(RunnerError::QueryPlan)?;
    let variables: Option<Map<String, Value>> = match args.variables_path.as_deref() {
        Some(path) => Some(sonic_rs::from_str(&read(path)?).map_err(RunnerError::Variables)?),
        None => None,
    };

    let schema_sdl = args.schema_path.as_deref().map(read).transpose()?;
    let schema_metadata = match schema_sdl.as_deref() {
        Some(sdl) => SchemaMetadata::from_sdl(sdl)?,
        None => SchemaMetadata::default(),
    };
    let operation = args.operation_path.as_deref().map(read).transpose()?;
    let document = operation.as_deref().map(parse_operation).transpose()?;
    if document.is_none() {
        warn!("No operation given, the response will not be projected");
    }

    if config.subgraphs.is_empty() {
        warn!("No subgraphs configured, every fetch will fail");
    }
    let subgraph_executor_map = SubgraphExecutorMap::from_http_endpoint_map(
        config.subgraphs.endpoint_map(),
        &config.traffic_shaping,
    )?;

    let expose_query_plan = if args.dry_run {
        ExposeQueryPlanMode::DryRun
    } else {
        config.query_plan.expose.into()
    };
    info!("executing query plan from {}", args.query_plan_path);

    let result = execute_query_plan(
        &query_plan,
        &subgraph_executor_map,
        &RequestContext { variables },
        &OperationContext {
            schema_metadata: &schema_metadata,
            document: document.as_ref(),
            operation_name: args.operation_name.as_deref(),
        },
        expose_query_plan,
    )
    .await;

    println!(
        "{}",
        sonic_rs::to_string_pretty(&result).map_err(RunnerError::Output)?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
