use super::exit_codes;
use crate::cli::args::RunArgs;
use sqlbench_core::config::{
    parse_csv_list, resolve_inference_lengths, resolve_instruction_sizes, BenchSettings,
    HostEnvironment, ModelInstructions, Secrets,
};
use sqlbench_core::dataset::{datasets_info, load_dataset, DatasetBucket};
use sqlbench_core::engine::orchestrator::Combination;
use sqlbench_core::engine::pool::{run_all, ClientFactory};
use sqlbench_core::errors::{as_config_error, ConfigError};
use sqlbench_core::prompt::validate_template;
use sqlbench_core::providers::{build_client, route};
use sqlbench_core::report::console;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Everything resolved before the first request goes out.
#[derive(Debug)]
pub struct RunPlan {
    pub settings: BenchSettings,
    pub combinations: Vec<Combination>,
    pub buckets: Vec<DatasetBucket>,
}

pub async fn cmd_run(args: RunArgs) -> anyhow::Result<i32> {
    let secrets = Secrets::from_env();
    let plan = match build_plan(&args, &secrets) {
        Ok(p) => p,
        Err(e) => {
            if let Some(cfg) = as_config_error(&e) {
                eprintln!("{}", cfg);
                return Ok(exit_codes::CONFIG_ERROR);
            }
            return Err(e);
        }
    };

    tracing::info!(
        event = "run_start",
        combinations = plan.combinations.len(),
        buckets = plan.buckets.len(),
        target_dir = %plan.settings.target_dir.display(),
        workers = plan.settings.workers,
    );

    let factory: ClientFactory = Arc::new(move |c: &Combination| {
        build_client(&c.model, &secrets).map_err(anyhow::Error::from)
    });

    let reports = run_all(
        plan.combinations,
        Arc::new(plan.buckets),
        Arc::new(plan.settings),
        factory,
    )
    .await?;

    console::print_run_summary(&reports);
    if reports.iter().all(|r| r.is_ok()) {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::RUN_FAILED)
    }
}

/// Resolves aliases, sizes, keys, template and dataset. Any problem here is a
/// `ConfigError` and nothing has been sent yet.
pub fn build_plan(args: &RunArgs, secrets: &Secrets) -> anyhow::Result<RunPlan> {
    let environment = HostEnvironment::parse(&args.environment)?;

    let aliases: Vec<String> = parse_csv_list(&args.models, "model alias")?;
    if aliases.is_empty() {
        return Err(ConfigError("no models given (--models)".into()).into());
    }

    let mapping = match &args.model_instructions {
        Some(p) => Some(ModelInstructions::load(p)?),
        None => None,
    };
    let inst_from_args: Vec<u32> = parse_csv_list(&args.inst, "instruction size")?;
    let inf_from_args: Vec<usize> = parse_csv_list(&args.inf_length, "inference length")?;
    let lengths = resolve_inference_lengths(&inf_from_args)?;
    if args.timeout_secs == 0 {
        return Err(ConfigError("--timeout-secs must be positive".into()).into());
    }

    let mut combinations: Vec<Combination> = Vec::new();
    let mut seen = HashSet::new();
    for alias in &aliases {
        let model = route::resolve_alias(alias)?;
        // fail on a missing key now rather than inside a task
        route::route_for(model, secrets)?;
        for instruction_size in resolve_instruction_sizes(alias, mapping.as_ref(), &inst_from_args)? {
            // two tasks on one run dir would interleave rows
            if !seen.insert((model, instruction_size)) {
                tracing::warn!(
                    event = "duplicate_combination",
                    model = %model,
                    instruction_size,
                );
                continue;
            }
            combinations.push(Combination {
                alias: alias.clone(),
                model: model.to_string(),
                instruction_size,
            });
        }
    }

    let prompt_template = match &args.prompt_template {
        Some(p) => {
            let t = std::fs::read_to_string(p).map_err(|e| {
                ConfigError(format!("failed to read prompt template {}: {}", p.display(), e))
            })?;
            validate_template(&t)?;
            Some(t)
        }
        None => None,
    };

    let records = load_dataset(&args.dataset)?;
    let buckets = datasets_info(&records, &lengths);

    Ok(RunPlan {
        settings: BenchSettings {
            environment,
            target_dir: args.target_dir.clone(),
            workers: args.workers.max(1),
            request_timeout: Duration::from_secs(args.timeout_secs),
            prompt_template,
        },
        combinations,
        buckets,
    })
}
