use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::args::Cli;
use cli::commands::{dispatch, exit_codes};

const DEFAULT_LOG_LEVEL: &str = "info";

fn log_level(from_env: Option<String>) -> String {
    from_env
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

fn init_logging() {
    let level = log_level(std::env::var("SQLBENCH_LOG").ok());
    let filter =
        EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging();
    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::RUN_FAILED
        }
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::log_level;

    #[test]
    fn log_level_defaults_to_info() {
        assert_eq!(log_level(None), "info");
        assert_eq!(log_level(Some(" ".into())), "info");
        assert_eq!(log_level(Some("sqlbench_core=debug".into())), "sqlbench_core=debug");
    }
}
