use super::args::*;
use sqlbench_core::providers::route::{provider_for, MODEL_CATALOG};

pub mod run;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const RUN_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run::cmd_run(args).await,
        Command::Models(args) => cmd_models(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_models(args: ModelsArgs) -> anyhow::Result<i32> {
    match args.format.as_str() {
        "json" => {
            let rows: Vec<serde_json::Value> = MODEL_CATALOG
                .iter()
                .map(|(alias, id)| {
                    let p = provider_for(id);
                    serde_json::json!({
                        "alias": alias,
                        "model": id,
                        "provider": p.as_str(),
                        "base_url": p.base_url(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        "text" => {
            for (alias, id) in MODEL_CATALOG {
                let p = provider_for(id);
                println!("{:<10} {:<40} {} ({})", alias, id, p.as_str(), p.base_url());
            }
        }
        other => {
            eprintln!("config error: unknown format '{}' (text|json)", other);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    }
    Ok(exit_codes::OK)
}
