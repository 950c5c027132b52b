use std::fmt;

/// Startup-time configuration failure (unknown alias, missing key, bad dataset).
///
/// The CLI maps this to exit code 2; it never occurs once queries are running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Returns the `ConfigError` at the root of an anyhow chain, if any.
pub fn as_config_error(err: &anyhow::Error) -> Option<&ConfigError> {
    err.chain().find_map(|e| e.downcast_ref::<ConfigError>())
}
