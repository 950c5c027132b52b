use crate::config::BenchSettings;
use crate::dataset::DatasetBucket;
use crate::engine::orchestrator::{run_combination, Combination};
use crate::model::BucketSummary;
use crate::providers::llm::ChatClient;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Builds the client for one combination, inside that combination's task.
pub type ClientFactory =
    Arc<dyn Fn(&Combination) -> anyhow::Result<Arc<dyn ChatClient>> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CombinationReport {
    pub combination: Combination,
    pub result: Result<Vec<BucketSummary>, String>,
}

impl CombinationReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs each combination as its own task, at most `settings.workers` at once.
///
/// Tasks share only read-only inputs. A combination that errors or panics
/// shows up as a failed report; the others keep running. Reports come back in
/// input order.
pub async fn run_all(
    combos: Vec<Combination>,
    buckets: Arc<Vec<DatasetBucket>>,
    settings: Arc<BenchSettings>,
    factory: ClientFactory,
) -> anyhow::Result<Vec<CombinationReport>> {
    let sem = Arc::new(Semaphore::new(settings.workers.max(1)));
    let mut handles = Vec::with_capacity(combos.len());

    for combo in combos.iter().cloned() {
        let permit = sem.clone().acquire_owned().await?;
        let buckets = buckets.clone();
        let settings = settings.clone();
        let factory = factory.clone();
        let h = tokio::spawn(async move {
            let _permit = permit;
            tracing::info!(event = "combination_start", combination = %combo.label());
            let client = factory(&combo)?;
            run_combination(&combo, &buckets, &settings, client).await
        });
        handles.push(h);
    }

    let mut reports = Vec::with_capacity(handles.len());
    for (combo, h) in combos.into_iter().zip(handles) {
        let result = match h.await {
            Ok(Ok(summaries)) => Ok(summaries),
            Ok(Err(e)) => Err(format!("task error: {:#}", e)),
            Err(e) => Err(format!("join error: {}", e)),
        };
        if let Err(msg) = &result {
            tracing::error!(
                event = "combination_failed",
                combination = %combo.label(),
                error = %msg,
            );
        }
        reports.push(CombinationReport {
            combination: combo,
            result,
        });
    }
    Ok(reports)
}
