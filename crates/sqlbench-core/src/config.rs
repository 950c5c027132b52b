use crate::errors::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const OPENAI_KEY_VAR: &str = "OPENAI_KEY";
pub const ANYSCALE_KEY_VAR: &str = "ANY_SCALE_API_KEY";

pub const DEFAULT_INSTRUCTION_SIZES: &[u32] = &[1, 5, 10];
pub const DEFAULT_INFERENCE_LENGTHS: &[usize] = &[10, 50, 100];
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Hosting environment tag; first path segment under the target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostEnvironment {
    #[default]
    Anyscale,
}

impl HostEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostEnvironment::Anyscale => "anyscale",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anyscale" => Ok(HostEnvironment::Anyscale),
            other => Err(ConfigError(format!("unknown environment '{}'", other))),
        }
    }
}

/// Provider API keys, read once at startup.
///
/// Keys stay optional here; `require_*` turns a missing key into a
/// `ConfigError` only for providers the selected models actually use.
#[derive(Clone, Default)]
pub struct Secrets {
    pub openai_key: Option<String>,
    pub anyscale_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("openai_key", &self.openai_key.as_ref().map(|_| "<set>"))
            .field("anyscale_key", &self.anyscale_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            openai_key: non_empty_var(OPENAI_KEY_VAR),
            anyscale_key: non_empty_var(ANYSCALE_KEY_VAR),
        }
    }

    pub fn require_openai(&self) -> Result<&str, ConfigError> {
        self.openai_key
            .as_deref()
            .ok_or_else(|| ConfigError(format!("environment variable {} is not set", OPENAI_KEY_VAR)))
    }

    pub fn require_anyscale(&self) -> Result<&str, ConfigError> {
        self.anyscale_key.as_deref().ok_or_else(|| {
            ConfigError(format!(
                "environment variable {} is not set",
                ANYSCALE_KEY_VAR
            ))
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Settings shared by every combination of one invocation.
#[derive(Debug, Clone)]
pub struct BenchSettings {
    pub environment: HostEnvironment,
    pub target_dir: PathBuf,
    pub workers: usize,
    pub request_timeout: Duration,
    /// Replaces the built-in template when set.
    pub prompt_template: Option<String>,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            environment: HostEnvironment::default(),
            target_dir: PathBuf::from("results"),
            workers: DEFAULT_WORKERS,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            prompt_template: None,
        }
    }
}

/// Parses `"1,5,10"` into sizes; empty input yields an empty list.
pub fn parse_csv_list<T: std::str::FromStr>(raw: &str, what: &str) -> Result<Vec<T>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| ConfigError(format!("invalid {} '{}'", what, s)))
        })
        .collect()
}

/// Per-model instruction sizes, keyed by model alias.
///
/// ```yaml
/// cl-70: [1, 5]
/// gpt-4: [10]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ModelInstructions(pub BTreeMap<String, Vec<u32>>);

impl ModelInstructions {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConfigError(format!(
                "failed to read model instructions {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(raw)
            .map_err(|e| ConfigError(format!("failed to parse model instructions YAML: {}", e)))
    }

    pub fn sizes_for(&self, alias: &str) -> Result<Vec<u32>, ConfigError> {
        self.0.get(alias).cloned().ok_or_else(|| {
            ConfigError(format!(
                "model instructions file has no entry for '{}'",
                alias
            ))
        })
    }
}

/// Picks instruction sizes: mapping file first, then `--inst`, then defaults.
pub fn resolve_instruction_sizes(
    alias: &str,
    mapping: Option<&ModelInstructions>,
    from_args: &[u32],
) -> Result<Vec<u32>, ConfigError> {
    if let Some(m) = mapping {
        return m.sizes_for(alias);
    }
    if !from_args.is_empty() {
        return Ok(from_args.to_vec());
    }
    Ok(DEFAULT_INSTRUCTION_SIZES.to_vec())
}

pub fn resolve_inference_lengths(from_args: &[usize]) -> Result<Vec<usize>, ConfigError> {
    let lengths = if from_args.is_empty() {
        DEFAULT_INFERENCE_LENGTHS.to_vec()
    } else {
        from_args.to_vec()
    };
    if lengths.iter().any(|&n| n == 0) {
        return Err(ConfigError("inference lengths must be positive".into()));
    }
    Ok(lengths)
}
