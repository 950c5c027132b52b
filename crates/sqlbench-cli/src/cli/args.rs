use clap::{Parser, Subcommand};
use sqlbench_core::config::{DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sqlbench",
    version,
    about = "Text-to-SQL benchmark runner for hosted LLM endpoints"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the benchmark for every (model, instruction size) combination
    Run(RunArgs),
    /// List supported model aliases
    Models(ModelsArgs),
    Version,
}

#[derive(Parser, Clone, Debug)]
pub struct RunArgs {
    /// output root; runs land in <target-dir>/<environment>/<model>/<n>_Instructions/<len>_Inferences
    #[arg(long, env = "SQLBENCH_TARGET_DIR", default_value = "results")]
    pub target_dir: PathBuf,

    /// dataset file (JSON array of {db_id, context, question, query, hardness})
    #[arg(long)]
    pub dataset: PathBuf,

    /// comma-separated model aliases, e.g. "cl-34,gpt-4"
    #[arg(long)]
    pub models: String,

    /// comma-separated instruction sizes (default: 1,5,10)
    #[arg(long, default_value = "")]
    pub inst: String,

    /// comma-separated dataset sizes (default: 10,50,100)
    #[arg(long, default_value = "")]
    pub inf_length: String,

    /// YAML mapping of model alias -> instruction sizes; overrides --inst
    #[arg(long)]
    pub model_instructions: Option<PathBuf>,

    /// custom system prompt template ([context], [question], {instructions})
    #[arg(long)]
    pub prompt_template: Option<PathBuf>,

    /// combinations running at once
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// hosting environment tag (anyscale)
    #[arg(long, default_value = "anyscale")]
    pub environment: String,
}

#[derive(Parser, Clone, Debug)]
pub struct ModelsArgs {
    /// output format: text|json
    #[arg(long, default_value = "text")]
    pub format: String,
}
