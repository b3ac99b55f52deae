//! Session configuration.
//!
//! There is no config file; callers build a [`Config`] in code (usually from
//! [`Config::default`]) and hand it to [`Session::with_config`](crate::session::Session::with_config).

use crate::datum::DEFAULT_FLOAT_PRECISION;

/// Top-level configuration carried by a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Result set formatting.
    pub output: OutputConfig,
}

/// Result set formatting options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Text placed between columns of a row.
    pub column_separator: String,
    /// Decimals printed for FLOATS before trailing zeros are trimmed.
    pub float_precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            column_separator: " | ".to_string(),
            float_precision: DEFAULT_FLOAT_PRECISION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output.column_separator, " | ");
        assert_eq!(config.output.float_precision, 2);
    }
}
