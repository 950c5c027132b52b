use crate::extract::sql_match;
use crate::model::{
    BucketSummary, ChatCompletion, ChatMessage, LogRecord, MetricsRow, OutcomeStatus, OutputRow,
    Query, QueryOutcome, RunConfig, Severity,
};
use crate::prompt::render_system;
use crate::providers::llm::ChatClient;
use crate::storage::RunFiles;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

pub const MSG_NO_SQL: &str = "No SQL Output detected";
pub const MSG_SQL_OK: &str = "SQL Response successful";

/// Sends queries one at a time to a single client and classifies each answer.
#[derive(Clone)]
pub struct QueryRunner {
    pub client: Arc<dyn ChatClient>,
    /// System prompt template with `[context]` / `[question]` slots.
    pub template: String,
    pub request_timeout: Duration,
}

pub fn build_request(template: &str, query: &Query) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(render_system(template, &query.context)),
        ChatMessage::user(query.question.clone()),
    ]
}

impl QueryRunner {
    /// Runs every query in order, persisting each outcome before the next call.
    ///
    /// Query-level failures become error rows; only file-system errors are
    /// returned.
    pub async fn run_queries(
        &self,
        queries: &[Query],
        files: &RunFiles,
        run: &RunConfig,
    ) -> anyhow::Result<BucketSummary> {
        let mut summary = BucketSummary {
            dataset_length: run.dataset_length,
            ..Default::default()
        };
        for query in queries {
            let outcome = self.execute_query(query, run).await;
            files.persist(&outcome)?;
            summary.record(outcome.status);
        }
        Ok(summary)
    }

    pub async fn execute_query(&self, query: &Query, run: &RunConfig) -> QueryOutcome {
        let request = build_request(&self.template, query);
        let mut log = LogRecord::new(run, request.clone());

        let start = Instant::now();
        let result = self.call_model(&request).await;
        let elapsed = start.elapsed();

        let mut outcome = match result {
            Ok(completion) => classify(completion, elapsed, &query.hardness, log),
            Err(e) => {
                let msg = format!("{:#}", e);
                eprintln!("exception: {}", msg);
                tracing::error!(
                    event = "query_failed",
                    model = %run.model,
                    instruction_size = run.instruction_size,
                    dataset_length = run.dataset_length,
                    error = %msg,
                );
                log.severity = Severity::Error;
                log.message = msg.clone();
                log.error = Some(msg.clone());
                QueryOutcome {
                    status: OutcomeStatus::Error,
                    output: OutputRow::error(&msg),
                    metrics: MetricsRow::zeroed(&query.hardness),
                    log,
                }
            }
        };
        outcome.log.timestamp = chrono::Utc::now().to_rfc3339();
        outcome
    }

    async fn call_model(&self, messages: &[ChatMessage]) -> anyhow::Result<ChatCompletion> {
        let fut = self.client.complete(messages);
        match timeout(self.request_timeout, fut).await {
            Ok(resp) => resp,
            Err(_) => anyhow::bail!(
                "request timed out after {}s",
                self.request_timeout.as_secs()
            ),
        }
    }
}

fn classify(
    completion: ChatCompletion,
    elapsed: Duration,
    hardness: &str,
    mut log: LogRecord,
) -> QueryOutcome {
    log.response = Some(completion.raw.clone());

    match sql_match(&completion.content) {
        None => {
            log.severity = Severity::Warn;
            log.message = MSG_NO_SQL.to_string();
            tracing::debug!(event = "no_sql", model = %log.model);
            QueryOutcome {
                status: OutcomeStatus::NoSql,
                output: OutputRow::no_sql(),
                metrics: MetricsRow {
                    response_time: None,
                    prompt_tokens: completion.prompt_tokens,
                    completion_tokens: completion.completion_tokens,
                    hardness: hardness.to_string(),
                },
                log,
            }
        }
        Some(sql) => {
            log.is_sql = 1;
            log.message = MSG_SQL_OK.to_string();
            log.sql_response = Some(sql.clone());
            QueryOutcome {
                status: OutcomeStatus::Sql,
                output: OutputRow(sql),
                metrics: MetricsRow {
                    response_time: Some(elapsed),
                    prompt_tokens: completion.prompt_tokens,
                    completion_tokens: completion.completion_tokens,
                    hardness: hardness.to_string(),
                },
                log,
            }
        }
    }
}
