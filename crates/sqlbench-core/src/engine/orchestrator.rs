use crate::config::BenchSettings;
use crate::dataset::DatasetBucket;
use crate::engine::runner::QueryRunner;
use crate::model::{BucketSummary, RunConfig};
use crate::prompt::template_for;
use crate::providers::llm::ChatClient;
use crate::report::console;
use crate::storage::RunFiles;
use std::sync::Arc;
use std::time::Instant;

/// One (model, instruction size) pair; the unit of parallel fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub alias: String,
    pub model: String,
    pub instruction_size: u32,
}

impl Combination {
    /// `cl-34 (codellama/CodeLlama-34b-Instruct-hf) @ 5 instructions`
    pub fn label(&self) -> String {
        format!(
            "{} ({}) @ {} instructions",
            self.alias, self.model, self.instruction_size
        )
    }
}

/// Runs every dataset bucket of one combination, strictly in order, on one client.
pub async fn run_combination(
    combo: &Combination,
    buckets: &[DatasetBucket],
    settings: &BenchSettings,
    client: Arc<dyn ChatClient>,
) -> anyhow::Result<Vec<BucketSummary>> {
    let runner = QueryRunner {
        client,
        template: template_for(settings.prompt_template.as_deref(), combo.instruction_size),
        request_timeout: settings.request_timeout,
    };

    let mut summaries = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let run = RunConfig {
            environment: settings.environment.as_str().to_string(),
            model: combo.model.clone(),
            instruction_size: combo.instruction_size,
            dataset_length: bucket.dataset_length,
            target_dir: settings.target_dir.clone(),
        };
        let files = RunFiles::initialize(&run.run_dir())?;

        eprintln!(
            "Starting loop for {} - {} instructions - {} inferences",
            run.model, run.instruction_size, run.dataset_length
        );
        tracing::info!(
            event = "bucket_start",
            model = %run.model,
            instruction_size = run.instruction_size,
            dataset_length = run.dataset_length,
            dir = %files.dir.display(),
        );

        tracing::debug!(event = "bucket_combination", combination = %combo.label());
        let start = Instant::now();
        let mut summary = runner.run_queries(&bucket.queries, &files, &run).await?;
        files.write_gold(&bucket.gold)?;
        summary.elapsed = start.elapsed();

        eprintln!(
            "Time taken for {} records: {}",
            run.dataset_length,
            console::format_elapsed(summary.elapsed.as_secs_f64())
        );
        console::print_bucket_summary(&summary);
        summaries.push(summary);
    }
    Ok(summaries)
}
