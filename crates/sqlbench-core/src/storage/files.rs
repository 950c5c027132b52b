use crate::model::{GoldEntry, LogRecord, MetricsRow, OutputRow, QueryOutcome};
use anyhow::Context;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const OUTPUT_FILE: &str = "output.sql";
pub const METRICS_FILE: &str = "metrics.csv";
pub const LOG_FILE: &str = "log.jsonl";
pub const GOLD_FILE: &str = "gold.sql";

/// The files of one run bucket. Every write opens, appends and closes, so
/// the files reflect progress up to the last finished query.
#[derive(Debug, Clone)]
pub struct RunFiles {
    pub dir: PathBuf,
    pub output: PathBuf,
    pub metrics: PathBuf,
    pub log: PathBuf,
}

impl RunFiles {
    /// Creates `dir` and truncates (or creates) the output, metrics and log files.
    pub fn initialize(dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create run dir {}", dir.display()))?;
        let files = Self {
            dir: dir.to_path_buf(),
            output: dir.join(OUTPUT_FILE),
            metrics: dir.join(METRICS_FILE),
            log: dir.join(LOG_FILE),
        };
        for p in [&files.output, &files.metrics, &files.log] {
            fs::write(p, "").with_context(|| format!("failed to truncate {}", p.display()))?;
        }
        Ok(files)
    }

    pub fn append_log(&self, record: &LogRecord) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        append(&self.log, &line)
    }

    /// Output and metrics rows are always written as a pair.
    pub fn write_rows(&self, output: &OutputRow, metrics: &MetricsRow) -> anyhow::Result<()> {
        append(&self.output, &output.to_block())?;
        append(&self.metrics, &metrics.to_line())
    }

    pub fn persist(&self, outcome: &QueryOutcome) -> anyhow::Result<()> {
        self.append_log(&outcome.log)?;
        self.write_rows(&outcome.output, &outcome.metrics)
    }

    /// Writes `gold.sql` next to the outputs: one `query<TAB>db_id` line per entry.
    pub fn write_gold(&self, gold: &[GoldEntry]) -> anyhow::Result<PathBuf> {
        let path = self.dir.join(GOLD_FILE);
        let mut body = String::new();
        for g in gold {
            // Scorers read one statement per line.
            let query = g.query.split_whitespace().collect::<Vec<_>>().join(" ");
            body.push_str(&format!("{}\t{}\n", query, g.db_id));
        }
        fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

fn append(path: &Path, text: &str) -> anyhow::Result<()> {
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    f.write_all(text.as_bytes())
        .with_context(|| format!("failed to append to {}", path.display()))?;
    Ok(())
}
