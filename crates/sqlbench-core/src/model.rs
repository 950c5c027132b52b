use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// One benchmark item: schema context, natural-language question, difficulty label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub context: String,
    pub question: String,
    pub hardness: String,
}

/// Expected answer for a dataset record, written to the gold file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldEntry {
    pub query: String,
    pub db_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub environment: String,
    pub model: String,
    pub instruction_size: u32,
    pub dataset_length: usize,
    pub target_dir: PathBuf,
}

impl RunConfig {
    /// `{target}/{environment}/{model}/{n}_Instructions/{len}_Inferences`
    ///
    /// Model ids containing `/` (e.g. `codellama/CodeLlama-34b-Instruct-hf`)
    /// nest one directory deeper, same as the id reads.
    pub fn run_dir(&self) -> PathBuf {
        self.target_dir
            .join(&self.environment)
            .join(&self.model)
            .join(format!("{}_Instructions", self.instruction_size))
            .join(format!("{}_Inferences", self.dataset_length))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub content: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Provider payload as received, logged verbatim.
    #[serde(default)]
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub message: String,
    pub environment: String,
    pub model: String,
    pub instruction_size: u32,
    pub dataset_length: usize,
    pub severity: Severity,
    pub is_sql: u8,
    pub request: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LogRecord {
    pub fn new(run: &RunConfig, request: Vec<ChatMessage>) -> Self {
        Self {
            timestamp: String::new(),
            message: String::new(),
            environment: run.environment.clone(),
            model: run.model.clone(),
            instruction_size: run.instruction_size,
            dataset_length: run.dataset_length,
            severity: Severity::Info,
            is_sql: 0,
            request,
            response: None,
            sql_response: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsRow {
    /// `None` is written as the `0` sentinel.
    pub response_time: Option<Duration>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub hardness: String,
}

impl MetricsRow {
    pub fn zeroed(hardness: &str) -> Self {
        Self {
            response_time: None,
            prompt_tokens: 0,
            completion_tokens: 0,
            hardness: hardness.to_string(),
        }
    }

    pub fn to_line(&self) -> String {
        let time = match self.response_time {
            Some(d) => format!("{:.6}", d.as_secs_f64()),
            None => "0".to_string(),
        };
        format!(
            "{},{},{},{}\n",
            time, self.prompt_tokens, self.completion_tokens, self.hardness
        )
    }
}

pub const NO_SQL_FALLBACK: &str = "I don't know";
pub const ERROR_PREFIX: &str = "An error occurred: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow(pub String);

impl OutputRow {
    pub fn no_sql() -> Self {
        Self(NO_SQL_FALLBACK.to_string())
    }

    pub fn error(message: &str) -> Self {
        Self(format!("{}{}", ERROR_PREFIX, message))
    }

    pub fn to_block(&self) -> String {
        format!("{}\n\n", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Sql,
    NoSql,
    Error,
}

/// Everything one query produces; persisted as a unit before the next query runs.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub status: OutcomeStatus,
    pub output: OutputRow,
    pub metrics: MetricsRow,
    pub log: LogRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketSummary {
    pub dataset_length: usize,
    pub sql: usize,
    pub no_sql: usize,
    pub errors: usize,
    pub elapsed: Duration,
}

impl BucketSummary {
    pub fn total(&self) -> usize {
        self.sql + self.no_sql + self.errors
    }

    pub fn record(&mut self, status: OutcomeStatus) {
        match status {
            OutcomeStatus::Sql => self.sql += 1,
            OutcomeStatus::NoSql => self.no_sql += 1,
            OutcomeStatus::Error => self.errors += 1,
        }
    }
}
