use crate::errors::ConfigError;
use crate::model::{GoldEntry, Query};
use serde::Deserialize;
use std::path::Path;

/// One record of the benchmark dataset file (a JSON array of these).
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetRecord {
    pub db_id: String,
    /// Schema text (e.g. `CREATE TABLE` statements) shown to the model.
    pub context: String,
    pub question: String,
    /// Gold SQL.
    pub query: String,
    #[serde(default = "default_hardness")]
    pub hardness: String,
}

fn default_hardness() -> String {
    "unknown".into()
}

#[derive(Debug, Clone)]
pub struct DatasetBucket {
    pub dataset_length: usize,
    pub queries: Vec<Query>,
    pub gold: Vec<GoldEntry>,
}

pub fn load_dataset(path: &Path) -> Result<Vec<DatasetRecord>, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read dataset {}: {}", path.display(), e)))?;
    let records: Vec<DatasetRecord> = serde_json::from_str(&raw)
        .map_err(|e| ConfigError(format!("failed to parse dataset {}: {}", path.display(), e)))?;
    if records.is_empty() {
        return Err(ConfigError(format!("dataset {} is empty", path.display())));
    }
    Ok(records)
}

/// One bucket per requested length, each holding the first `length` records.
///
/// The bucket keeps the requested length as its label even when the dataset
/// is shorter, so output paths match what was asked for.
pub fn datasets_info(records: &[DatasetRecord], lengths: &[usize]) -> Vec<DatasetBucket> {
    lengths
        .iter()
        .map(|&dataset_length| {
            if dataset_length > records.len() {
                tracing::warn!(
                    event = "dataset_clamped",
                    requested = dataset_length,
                    available = records.len(),
                    "dataset has fewer records than requested"
                );
            }
            let slice = &records[..dataset_length.min(records.len())];
            DatasetBucket {
                dataset_length,
                queries: slice
                    .iter()
                    .map(|r| Query {
                        context: r.context.clone(),
                        question: r.question.clone(),
                        hardness: r.hardness.clone(),
                    })
                    .collect(),
                gold: slice
                    .iter()
                    .map(|r| GoldEntry {
                        query: r.query.clone(),
                        db_id: r.db_id.clone(),
                    })
                    .collect(),
            }
        })
        .collect()
}
